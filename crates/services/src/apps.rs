//! Applications service façade (`/v3/apps`).
//!
//! Apps are versioned: most calls address `{app_id}/{version}`, and
//! [`AppsClient::get_latest_app`] resolves the most recent version
//! server-side.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use protocol::{
    ApiCall, CallInvoker, ClientError, IdentityContext, NameList, Resource, ResourceList,
    ResourceUrl, Timestamp,
};

use crate::common::{self, ListOptions, ReqPerms};

const BASE: &str = "/v3/apps";
const PERMS: &str = "/v3/apps/perms";

/// An application definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct App {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// `SINGLE` or `MULTIPLE`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Canonical JSON string of the free-form notes.
    #[serde(
        default,
        with = "protocol::notes::as_json_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<Timestamp>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl App {
    pub fn new(id: impl Into<String>, version: impl Into<String>, container_image: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
            container_image: Some(container_image.into()),
            ..Self::default()
        }
    }
}

/// Client for the Applications service.
#[derive(Debug, Clone)]
pub struct AppsClient {
    invoker: CallInvoker,
}

impl AppsClient {
    pub fn new(invoker: CallInvoker) -> Self {
        Self { invoker }
    }

    pub async fn health(&self, identity: &IdentityContext) -> Result<Option<String>, ClientError> {
        common::status_check(&self.invoker, identity, "healthCheck", format!("{BASE}/healthcheck")).await
    }

    pub async fn ready(&self, identity: &IdentityContext) -> Result<Option<String>, ClientError> {
        common::status_check(&self.invoker, identity, "readyCheck", format!("{BASE}/readycheck")).await
    }

    pub async fn create_app(&self, identity: &IdentityContext, app: &App) -> Result<Option<String>, ClientError> {
        let call = ApiCall::post("createAppVersion", BASE).json(app)?;
        self.invoker.call::<ResourceUrl>(&call, identity).await
    }

    pub async fn get_app(
        &self,
        identity: &IdentityContext,
        app_id: &str,
        version: &str,
    ) -> Result<Option<App>, ClientError> {
        let call = ApiCall::get("getApp", BASE).segment(app_id).segment(version);
        self.invoker.call::<Resource<App>>(&call, identity).await
    }

    pub async fn get_latest_app(&self, identity: &IdentityContext, app_id: &str) -> Result<Option<App>, ClientError> {
        let call = ApiCall::get("getAppLatestVersion", BASE).segment(app_id);
        self.invoker.call::<Resource<App>>(&call, identity).await
    }

    pub async fn get_apps(&self, identity: &IdentityContext, options: &ListOptions) -> Result<Vec<App>, ClientError> {
        let call = options.apply(ApiCall::get("getApps", BASE));
        self.invoker.call::<ResourceList<App>>(&call, identity).await
    }

    pub async fn enable_app(&self, identity: &IdentityContext, app_id: &str) -> Result<i64, ClientError> {
        self.action(identity, "enableApp", app_id, "enable").await
    }

    pub async fn disable_app(&self, identity: &IdentityContext, app_id: &str) -> Result<i64, ClientError> {
        self.action(identity, "disableApp", app_id, "disable").await
    }

    pub async fn delete_app(&self, identity: &IdentityContext, app_id: &str) -> Result<i64, ClientError> {
        self.action(identity, "deleteApp", app_id, "delete").await
    }

    pub async fn undelete_app(&self, identity: &IdentityContext, app_id: &str) -> Result<i64, ClientError> {
        self.action(identity, "undeleteApp", app_id, "undelete").await
    }

    pub async fn change_app_owner(
        &self,
        identity: &IdentityContext,
        app_id: &str,
        new_owner: &str,
    ) -> Result<i64, ClientError> {
        let call = ApiCall::post("changeAppOwner", BASE)
            .segment(app_id)
            .segment("changeOwner")
            .segment(new_owner);
        common::change(&self.invoker, identity, call).await
    }

    pub async fn grant_user_perms(
        &self,
        identity: &IdentityContext,
        app_id: &str,
        user: &str,
        perms: &ReqPerms,
    ) -> Result<i64, ClientError> {
        let call = perms_call(ApiCall::post("grantUserPerms", PERMS), app_id, user).json(perms)?;
        common::change(&self.invoker, identity, call).await
    }

    pub async fn revoke_user_perms(
        &self,
        identity: &IdentityContext,
        app_id: &str,
        user: &str,
        perms: &ReqPerms,
    ) -> Result<i64, ClientError> {
        let call = perms_call(ApiCall::post("revokeUserPerms", PERMS), app_id, user)
            .segment("revoke")
            .json(perms)?;
        common::change(&self.invoker, identity, call).await
    }

    pub async fn get_user_perms(
        &self,
        identity: &IdentityContext,
        app_id: &str,
        user: &str,
    ) -> Result<Vec<String>, ClientError> {
        let call = perms_call(ApiCall::get("getUserPerms", PERMS), app_id, user);
        self.invoker.call::<NameList>(&call, identity).await
    }

    async fn action(
        &self,
        identity: &IdentityContext,
        operation: &'static str,
        app_id: &str,
        verb: &str,
    ) -> Result<i64, ClientError> {
        let call = ApiCall::post(operation, BASE).segment(app_id).segment(verb);
        common::change(&self.invoker, identity, call).await
    }
}

fn perms_call(call: ApiCall, app_id: &str, user: &str) -> ApiCall {
    call.segment(app_id).segment("user").segment(user)
}
