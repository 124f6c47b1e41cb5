//! Files service façade (`/v3/files`).
//!
//! Paths are relative to the system root directory. A leading `/` on a
//! caller-supplied path is dropped, and each component becomes its own
//! encoded URL segment.

use serde::{Deserialize, Serialize};
use serde_json::json;

use protocol::{Acknowledge, ApiCall, CallInvoker, ClientError, IdentityContext, Resource, ResourceList};

use crate::common;

const OPS: &str = "/v3/files/ops";
const PERMISSIONS: &str = "/v3/files/permissions";

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub path: String,
    /// `file`, `dir` or `symbolic_link`.
    #[serde(rename = "type", default)]
    pub file_type: Option<String>,
    #[serde(default)]
    pub size: Option<i64>,
    #[serde(default)]
    pub last_modified: Option<String>,
    #[serde(default)]
    pub native_permissions: Option<String>,
}

/// `READ` or `MODIFY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FilePermissionLevel {
    Read,
    Modify,
}

/// Permission of one user on one path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePermission {
    #[serde(default)]
    pub tenant: Option<String>,
    pub username: String,
    pub system_id: String,
    pub path: String,
    pub permission: FilePermissionLevel,
}

/// Paging of directory listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListFilesOptions {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub recurse: bool,
}

/// Client for the Files service.
#[derive(Debug, Clone)]
pub struct FilesClient {
    invoker: CallInvoker,
}

impl FilesClient {
    pub fn new(invoker: CallInvoker) -> Self {
        Self { invoker }
    }

    pub async fn health(&self, identity: &IdentityContext) -> Result<Option<String>, ClientError> {
        common::status_check(&self.invoker, identity, "healthCheck", "/v3/files/healthcheck".to_owned()).await
    }

    pub async fn ready(&self, identity: &IdentityContext) -> Result<Option<String>, ClientError> {
        common::status_check(&self.invoker, identity, "readyCheck", "/v3/files/readycheck".to_owned()).await
    }

    pub async fn list_files(
        &self,
        identity: &IdentityContext,
        system_id: &str,
        path: &str,
        options: ListFilesOptions,
    ) -> Result<Vec<FileInfo>, ClientError> {
        let call = on_path(ApiCall::get("listFiles", OPS), system_id, path)
            .query_opt("limit", options.limit)
            .query_opt("offset", options.offset)
            .query_opt("recurse", options.recurse.then_some(true));
        self.invoker.call::<ResourceList<FileInfo>>(&call, identity).await
    }

    pub async fn mkdir(&self, identity: &IdentityContext, system_id: &str, path: &str) -> Result<(), ClientError> {
        let call = ApiCall::post("mkdir", OPS).segment(system_id).json_value(json!({ "path": path }));
        self.invoker.call::<Acknowledge>(&call, identity).await
    }

    pub async fn delete(&self, identity: &IdentityContext, system_id: &str, path: &str) -> Result<(), ClientError> {
        let call = on_path(ApiCall::delete("delete", OPS), system_id, path);
        self.invoker.call::<Acknowledge>(&call, identity).await
    }

    pub async fn move_path(
        &self,
        identity: &IdentityContext,
        system_id: &str,
        path: &str,
        new_path: &str,
    ) -> Result<(), ClientError> {
        let call = on_path(ApiCall::put("moveCopy", OPS), system_id, path)
            .json_value(json!({ "operation": "MOVE", "newPath": new_path }));
        self.invoker.call::<Acknowledge>(&call, identity).await
    }

    pub async fn get_permissions(
        &self,
        identity: &IdentityContext,
        system_id: &str,
        path: &str,
        username: Option<&str>,
    ) -> Result<Option<FilePermission>, ClientError> {
        let call = on_path(ApiCall::get("getPermissions", PERMISSIONS), system_id, path).query_opt("username", username);
        self.invoker.call::<Resource<FilePermission>>(&call, identity).await
    }

    pub async fn grant_permission(
        &self,
        identity: &IdentityContext,
        system_id: &str,
        path: &str,
        username: &str,
        permission: FilePermissionLevel,
    ) -> Result<Option<FilePermission>, ClientError> {
        let call = on_path(ApiCall::post("grantPermissions", PERMISSIONS), system_id, path)
            .json(&json!({ "username": username, "permission": permission }))?;
        self.invoker.call::<Resource<FilePermission>>(&call, identity).await
    }

    pub async fn revoke_permission(
        &self,
        identity: &IdentityContext,
        system_id: &str,
        path: &str,
        username: &str,
    ) -> Result<(), ClientError> {
        let call = on_path(ApiCall::delete("deletePermissions", PERMISSIONS), system_id, path).query("username", username);
        self.invoker.call::<Acknowledge>(&call, identity).await
    }
}

fn on_path(call: ApiCall, system_id: &str, path: &str) -> ApiCall {
    call.segment(system_id).sub_path(path)
}
