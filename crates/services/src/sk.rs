//! Security Kernel façade (`/v3/security`).
//!
//! Roles and permissions are tenant-scoped; every call names the tenant it
//! applies to, which may differ from the caller's own when a service acts
//! on behalf of a user.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use protocol::{ApiCall, Authorized, CallInvoker, ClientError, IdentityContext, NameList, Resource, ResourceUrl};

use crate::common;

const BASE: &str = "/v3/security";
const SECRETS: &str = "/v3/security/vault/secret";

/// Body of role creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReqCreateRole {
    pub role_tenant: String,
    pub role_name: String,
    pub description: String,
}

/// Body of role grant and revoke.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReqUserRole {
    pub tenant: String,
    pub user: String,
    pub role_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct ReqUser<'a> {
    tenant: &'a str,
    user: &'a str,
}

/// Which secret store a secret lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretType {
    System,
    DbCred,
    JwtSigning,
    User,
    Service,
}

impl SecretType {
    fn as_path(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::DbCred => "dbcred",
            Self::JwtSigning => "jwtsigning",
            Self::User => "user",
            Self::Service => "service",
        }
    }
}

/// Addresses one secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretRef {
    pub secret_type: SecretType,
    pub secret_name: String,
    pub tenant: String,
    pub user: String,
}

/// Version metadata of a secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkSecretMetadata {
    #[serde(default)]
    pub created_time: Option<String>,
    #[serde(default)]
    pub version: Option<i32>,
    #[serde(default)]
    pub destroyed: Option<bool>,
}

/// A secret and its metadata.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkSecret {
    #[serde(default)]
    pub secret_map: BTreeMap<String, String>,
    #[serde(default)]
    pub metadata: Option<SkSecretMetadata>,
}

impl std::fmt::Debug for SkSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkSecret")
            .field("keys", &self.secret_map.keys().collect::<Vec<_>>())
            .field("metadata", &self.metadata)
            .finish()
    }
}

/// Client for the Security Kernel.
#[derive(Debug, Clone)]
pub struct SkClient {
    invoker: CallInvoker,
}

impl SkClient {
    pub fn new(invoker: CallInvoker) -> Self {
        Self { invoker }
    }

    pub async fn health(&self, identity: &IdentityContext) -> Result<Option<String>, ClientError> {
        common::status_check(&self.invoker, identity, "checkHealth", format!("{BASE}/healthcheck")).await
    }

    pub async fn ready(&self, identity: &IdentityContext) -> Result<Option<String>, ClientError> {
        common::status_check(&self.invoker, identity, "ready", format!("{BASE}/readycheck")).await
    }

    pub async fn get_role_names(&self, identity: &IdentityContext, tenant: &str) -> Result<Vec<String>, ClientError> {
        let call = ApiCall::get("getRoleNames", format!("{BASE}/role")).query("tenant", tenant);
        self.invoker.call::<NameList>(&call, identity).await
    }

    pub async fn get_user_roles(
        &self,
        identity: &IdentityContext,
        tenant: &str,
        user: &str,
    ) -> Result<Vec<String>, ClientError> {
        let call = ApiCall::get("getUserRoles", format!("{BASE}/user/roles"))
            .segment(user)
            .query("tenant", tenant);
        self.invoker.call::<NameList>(&call, identity).await
    }

    /// Permissions held by `user`, optionally filtered to those implied by
    /// `implies`.
    pub async fn get_user_perms(
        &self,
        identity: &IdentityContext,
        tenant: &str,
        user: &str,
        implies: Option<&str>,
    ) -> Result<Vec<String>, ClientError> {
        let call = ApiCall::get("getUserPerms", format!("{BASE}/user/perms"))
            .segment(user)
            .query("tenant", tenant)
            .query_opt("implies", implies);
        self.invoker.call::<NameList>(&call, identity).await
    }

    pub async fn create_role(&self, identity: &IdentityContext, request: &ReqCreateRole) -> Result<Option<String>, ClientError> {
        let call = ApiCall::post("createRole", format!("{BASE}/role")).json(request)?;
        self.invoker.call::<ResourceUrl>(&call, identity).await
    }

    pub async fn grant_user_role(&self, identity: &IdentityContext, request: &ReqUserRole) -> Result<i64, ClientError> {
        let call = ApiCall::post("grantRole", format!("{BASE}/user/grantRole")).json(request)?;
        common::change(&self.invoker, identity, call).await
    }

    pub async fn revoke_user_role(&self, identity: &IdentityContext, request: &ReqUserRole) -> Result<i64, ClientError> {
        let call = ApiCall::post("revokeUserRole", format!("{BASE}/user/revokeRole")).json(request)?;
        common::change(&self.invoker, identity, call).await
    }

    pub async fn delete_role(&self, identity: &IdentityContext, tenant: &str, role_name: &str) -> Result<i64, ClientError> {
        let call = ApiCall::delete("deleteRoleByName", format!("{BASE}/role"))
            .segment(role_name)
            .query("tenant", tenant);
        common::change(&self.invoker, identity, call).await
    }

    /// `None` when the service answered without a verdict.
    pub async fn is_admin(&self, identity: &IdentityContext, tenant: &str, user: &str) -> Result<Option<bool>, ClientError> {
        let call = ApiCall::post("hasAdminRole", format!("{BASE}/user/isAdmin")).json(&ReqUser { tenant, user })?;
        self.invoker.call::<Authorized>(&call, identity).await
    }

    pub async fn read_secret(&self, identity: &IdentityContext, secret: &SecretRef) -> Result<Option<SkSecret>, ClientError> {
        let call = secret_call(ApiCall::get("readSecret", SECRETS), secret)
            .query("tenant", &secret.tenant)
            .query("user", &secret.user);
        self.invoker.call::<Resource<SkSecret>>(&call, identity).await
    }

    pub async fn write_secret(
        &self,
        identity: &IdentityContext,
        secret: &SecretRef,
        data: &BTreeMap<String, String>,
    ) -> Result<Option<SkSecretMetadata>, ClientError> {
        #[derive(Serialize)]
        struct ReqWriteSecret<'a> {
            tenant: &'a str,
            user: &'a str,
            data: &'a BTreeMap<String, String>,
        }
        let call = secret_call(ApiCall::post("writeSecret", SECRETS), secret).json(&ReqWriteSecret {
            tenant: &secret.tenant,
            user: &secret.user,
            data,
        })?;
        self.invoker.call::<Resource<SkSecretMetadata>>(&call, identity).await
    }
}

fn secret_call(call: ApiCall, secret: &SecretRef) -> ApiCall {
    call.segment(secret.secret_type.as_path())
        .segment(secret.secret_name.as_str())
}
