//! Globus proxy façade (`/v3/globus-proxy`).
//!
//! The proxy speaks snake_case and carries the caller's Globus tokens as
//! query parameters on every file operation, in addition to the Tapis
//! identity headers.

use serde::{Deserialize, Serialize};

use protocol::{Acknowledge, ApiCall, CallInvoker, ClientError, IdentityContext, Resource, ResourceList};

const BASE: &str = "/v3/globus-proxy";
const OPS: &str = "/v3/globus-proxy/ops";

/// Authorization URL and session for the Globus native-app flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthInfo {
    pub url: String,
    pub session_id: String,
}

/// Globus access and refresh tokens.
///
/// `check_tokens` may hand back refreshed values, which replace the ones
/// the caller holds.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
}

impl std::fmt::Debug for AuthTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthTokens")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// One entry of a Globus endpoint listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobusFileInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(rename = "type", default)]
    pub file_type: Option<String>,
    #[serde(default)]
    pub size: Option<i64>,
    #[serde(default)]
    pub last_modified: Option<String>,
}

/// Client for the Globus proxy.
#[derive(Debug, Clone)]
pub struct GlobusProxyClient {
    invoker: CallInvoker,
}

impl GlobusProxyClient {
    pub fn new(invoker: CallInvoker) -> Self {
        Self { invoker }
    }

    pub async fn get_auth_info(
        &self,
        identity: &IdentityContext,
        client_id: &str,
    ) -> Result<Option<AuthInfo>, ClientError> {
        let call = ApiCall::get("getAuthInfo", format!("{BASE}/auth/url")).segment(client_id);
        self.invoker.call::<Resource<AuthInfo>>(&call, identity).await
    }

    /// Exchanges an authorization code for tokens.
    pub async fn get_tokens(
        &self,
        identity: &IdentityContext,
        client_id: &str,
        session_id: &str,
        auth_code: &str,
    ) -> Result<Option<AuthTokens>, ClientError> {
        let call = ApiCall::get("getTokens", format!("{BASE}/auth/tokens"))
            .segment(client_id)
            .segment(session_id)
            .segment(auth_code);
        self.invoker.call::<Resource<AuthTokens>>(&call, identity).await
    }

    pub async fn check_tokens(
        &self,
        identity: &IdentityContext,
        client_id: &str,
        endpoint_id: &str,
        tokens: &AuthTokens,
    ) -> Result<Option<AuthTokens>, ClientError> {
        let call = with_tokens(
            ApiCall::get("checkTokens", format!("{BASE}/auth/check_tokens"))
                .segment(client_id)
                .segment(endpoint_id),
            tokens,
        );
        self.invoker.call::<Resource<AuthTokens>>(&call, identity).await
    }

    pub async fn list_files(
        &self,
        identity: &IdentityContext,
        client_id: &str,
        endpoint_id: &str,
        path: &str,
        tokens: &AuthTokens,
    ) -> Result<Vec<GlobusFileInfo>, ClientError> {
        let call = with_tokens(on_path(ApiCall::get("listFiles", OPS), client_id, endpoint_id, path), tokens);
        self.invoker.call::<ResourceList<GlobusFileInfo>>(&call, identity).await
    }

    pub async fn make_dir(
        &self,
        identity: &IdentityContext,
        client_id: &str,
        endpoint_id: &str,
        path: &str,
        tokens: &AuthTokens,
    ) -> Result<(), ClientError> {
        let call = with_tokens(on_path(ApiCall::post("makeDir", OPS), client_id, endpoint_id, path), tokens);
        self.invoker.call::<Acknowledge>(&call, identity).await
    }

    pub async fn delete_path(
        &self,
        identity: &IdentityContext,
        client_id: &str,
        endpoint_id: &str,
        path: &str,
        tokens: &AuthTokens,
    ) -> Result<(), ClientError> {
        let call = with_tokens(on_path(ApiCall::delete("deletePath", OPS), client_id, endpoint_id, path), tokens)
            .query("recurse", true);
        self.invoker.call::<Acknowledge>(&call, identity).await
    }
}

fn on_path(call: ApiCall, client_id: &str, endpoint_id: &str, path: &str) -> ApiCall {
    call.segment(client_id).segment(endpoint_id).sub_path(path)
}

fn with_tokens(call: ApiCall, tokens: &AuthTokens) -> ApiCall {
    call.query("access_token", &tokens.access_token)
        .query("refresh_token", &tokens.refresh_token)
}
