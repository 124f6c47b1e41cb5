//! Systems service façade (`/v3/systems`).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use protocol::{
    ApiCall, CallInvoker, ClientError, IdentityContext, NameList, Resource, ResourceList,
    ResourceUrl, Timestamp,
};

use crate::common::{self, ListOptions, ReqPerms};

const BASE: &str = "/v3/systems";
const PERMS: &str = "/v3/systems/perms";

/// A storage or execution system definition.
///
/// Attributes this crate does not model are kept in `extra` so that a
/// fetched system can be re-submitted without loss.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TapisSystem {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `LINUX`, `S3`, `IRODS`, `GLOBUS`, ...
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_authn_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_exec: Option<bool>,
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

impl TapisSystem {
    pub fn new(id: impl Into<String>, system_type: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            system_type: Some(system_type.into()),
            host: Some(host.into()),
            ..Self::default()
        }
    }
}

/// Client for the Systems service.
#[derive(Debug, Clone)]
pub struct SystemsClient {
    invoker: CallInvoker,
}

impl SystemsClient {
    pub fn new(invoker: CallInvoker) -> Self {
        Self { invoker }
    }

    pub async fn health(&self, identity: &IdentityContext) -> Result<Option<String>, ClientError> {
        common::status_check(&self.invoker, identity, "checkHealth", format!("{BASE}/healthcheck")).await
    }

    pub async fn ready(&self, identity: &IdentityContext) -> Result<Option<String>, ClientError> {
        common::status_check(&self.invoker, identity, "ready", format!("{BASE}/readycheck")).await
    }

    /// Creates a system and returns the URL of the new resource.
    pub async fn create_system(
        &self,
        identity: &IdentityContext,
        system: &TapisSystem,
        skip_credential_check: bool,
    ) -> Result<Option<String>, ClientError> {
        let call = ApiCall::post("createSystem", BASE)
            .query("skipCredentialCheck", skip_credential_check)
            .json(system)?;
        self.invoker.call::<ResourceUrl>(&call, identity).await
    }

    /// Fetches one system. A missing system is a 404 [`ClientError`].
    pub async fn get_system(
        &self,
        identity: &IdentityContext,
        system_id: &str,
    ) -> Result<Option<TapisSystem>, ClientError> {
        let call = ApiCall::get("getSystem", BASE).segment(system_id);
        self.invoker.call::<Resource<TapisSystem>>(&call, identity).await
    }

    pub async fn get_systems(
        &self,
        identity: &IdentityContext,
        options: &ListOptions,
    ) -> Result<Vec<TapisSystem>, ClientError> {
        let call = options.apply(ApiCall::get("getSystems", BASE));
        self.invoker.call::<ResourceList<TapisSystem>>(&call, identity).await
    }

    pub async fn enable_system(&self, identity: &IdentityContext, system_id: &str) -> Result<i64, ClientError> {
        self.action(identity, "enableSystem", system_id, "enable").await
    }

    pub async fn disable_system(&self, identity: &IdentityContext, system_id: &str) -> Result<i64, ClientError> {
        self.action(identity, "disableSystem", system_id, "disable").await
    }

    pub async fn delete_system(&self, identity: &IdentityContext, system_id: &str) -> Result<i64, ClientError> {
        self.action(identity, "deleteSystem", system_id, "delete").await
    }

    pub async fn undelete_system(&self, identity: &IdentityContext, system_id: &str) -> Result<i64, ClientError> {
        self.action(identity, "undeleteSystem", system_id, "undelete").await
    }

    pub async fn change_system_owner(
        &self,
        identity: &IdentityContext,
        system_id: &str,
        new_owner: &str,
    ) -> Result<i64, ClientError> {
        let call = ApiCall::post("changeSystemOwner", BASE)
            .segment(system_id)
            .segment("changeOwner")
            .segment(new_owner);
        common::change(&self.invoker, identity, call).await
    }

    pub async fn grant_user_perms(
        &self,
        identity: &IdentityContext,
        system_id: &str,
        user: &str,
        perms: &ReqPerms,
    ) -> Result<i64, ClientError> {
        let call = perms_call(ApiCall::post("grantUserPerms", PERMS), system_id, user).json(perms)?;
        common::change(&self.invoker, identity, call).await
    }

    pub async fn revoke_user_perms(
        &self,
        identity: &IdentityContext,
        system_id: &str,
        user: &str,
        perms: &ReqPerms,
    ) -> Result<i64, ClientError> {
        let call = perms_call(ApiCall::post("revokeUserPerms", PERMS), system_id, user)
            .segment("revoke")
            .json(perms)?;
        common::change(&self.invoker, identity, call).await
    }

    pub async fn get_user_perms(
        &self,
        identity: &IdentityContext,
        system_id: &str,
        user: &str,
    ) -> Result<Vec<String>, ClientError> {
        let call = perms_call(ApiCall::get("getUserPerms", PERMS), system_id, user);
        self.invoker.call::<NameList>(&call, identity).await
    }

    async fn action(
        &self,
        identity: &IdentityContext,
        operation: &'static str,
        system_id: &str,
        verb: &str,
    ) -> Result<i64, ClientError> {
        let call = ApiCall::post(operation, BASE).segment(system_id).segment(verb);
        common::change(&self.invoker, identity, call).await
    }
}

fn perms_call(call: ApiCall, system_id: &str, user: &str) -> ApiCall {
    call.segment(system_id).segment("user").segment(user)
}
