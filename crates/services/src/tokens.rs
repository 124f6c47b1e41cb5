//! Tokens service façade (`/v3/tokens`).
//!
//! Snake_case on the wire. Token strings are redacted from `Debug` output.

use serde::{Deserialize, Serialize};

use protocol::{Acknowledge, ApiCall, CallInvoker, ClientError, IdentityContext, Resource};

use crate::common;

const BASE: &str = "/v3/tokens";

/// `user` or `service`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    User,
    Service,
}

/// Body of token generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTokenRequest {
    pub token_tenant_id: String,
    pub token_username: String,
    pub account_type: AccountType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_site_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token_ttl: Option<i64>,
    #[serde(default)]
    pub generate_refresh_token: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token_ttl: Option<i64>,
}

impl CreateTokenRequest {
    pub fn new(tenant_id: impl Into<String>, username: impl Into<String>, account_type: AccountType) -> Self {
        Self {
            token_tenant_id: tenant_id.into(),
            token_username: username.into(),
            account_type,
            target_site_id: None,
            access_token_ttl: None,
            generate_refresh_token: false,
            refresh_token_ttl: None,
        }
    }
}

/// One signed token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub jti: Option<String>,
}

impl std::fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenGrant")
            .field("access_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field("jti", &self.jti)
            .finish()
    }
}

/// Result of create and refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: TokenGrant,
    #[serde(default)]
    pub refresh_token: Option<TokenGrant>,
}

#[derive(Serialize)]
struct RefreshTokenRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Serialize)]
struct RevokeTokenRequest<'a> {
    token: &'a str,
}

/// Client for the Tokens service.
#[derive(Debug, Clone)]
pub struct TokensClient {
    invoker: CallInvoker,
}

impl TokensClient {
    pub fn new(invoker: CallInvoker) -> Self {
        Self { invoker }
    }

    pub async fn health(&self, identity: &IdentityContext) -> Result<Option<String>, ClientError> {
        common::status_check(&self.invoker, identity, "healthcheck", format!("{BASE}/healthcheck")).await
    }

    pub async fn create_token(
        &self,
        identity: &IdentityContext,
        request: &CreateTokenRequest,
    ) -> Result<Option<TokenResponse>, ClientError> {
        let call = ApiCall::post("create_token", BASE).json(request)?;
        self.invoker.call::<Resource<TokenResponse>>(&call, identity).await
    }

    pub async fn refresh_token(
        &self,
        identity: &IdentityContext,
        refresh_token: &str,
    ) -> Result<Option<TokenResponse>, ClientError> {
        let call = ApiCall::put("refresh_token", BASE).json(&RefreshTokenRequest { refresh_token })?;
        self.invoker.call::<Resource<TokenResponse>>(&call, identity).await
    }

    pub async fn revoke_token(&self, identity: &IdentityContext, token: &str) -> Result<(), ClientError> {
        let call = ApiCall::post("revoke_token", format!("{BASE}/revoke")).json(&RevokeTokenRequest { token })?;
        self.invoker.call::<Acknowledge>(&call, identity).await
    }
}
