//! Tenants and sites façade (`/v3/tenants`, `/v3/sites`).
//!
//! This service speaks snake_case.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use protocol::{ApiCall, CallInvoker, ClientError, IdentityContext, Resource, ResourceList};

use crate::common;

const TENANTS: &str = "/v3/tenants";
const SITES: &str = "/v3/sites";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    #[serde(default)]
    pub tenant_id: String,
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub site_id: Option<String>,
    #[serde(default)]
    pub token_service: Option<String>,
    #[serde(default)]
    pub security_kernel: Option<String>,
    #[serde(default)]
    pub authenticator: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    /// `draft`, `active` or `inactive`.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub public_key: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    #[serde(default)]
    pub site_id: String,
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub primary: Option<bool>,
    #[serde(default)]
    pub tenant_base_url_template: Option<String>,
    #[serde(default)]
    pub site_admin_tenant_id: Option<String>,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Client for the Tenants service.
#[derive(Debug, Clone)]
pub struct TenantsClient {
    invoker: CallInvoker,
}

impl TenantsClient {
    pub fn new(invoker: CallInvoker) -> Self {
        Self { invoker }
    }

    pub async fn health(&self, identity: &IdentityContext) -> Result<Option<String>, ClientError> {
        common::status_check(&self.invoker, identity, "healthcheck", format!("{TENANTS}/healthcheck")).await
    }

    pub async fn get_tenant(&self, identity: &IdentityContext, tenant_id: &str) -> Result<Option<Tenant>, ClientError> {
        let call = ApiCall::get("get_tenant", TENANTS).segment(tenant_id);
        self.invoker.call::<Resource<Tenant>>(&call, identity).await
    }

    pub async fn list_tenants(&self, identity: &IdentityContext) -> Result<Vec<Tenant>, ClientError> {
        let call = ApiCall::get("list_tenants", TENANTS);
        self.invoker.call::<ResourceList<Tenant>>(&call, identity).await
    }

    pub async fn get_site(&self, identity: &IdentityContext, site_id: &str) -> Result<Option<Site>, ClientError> {
        let call = ApiCall::get("get_site", SITES).segment(site_id);
        self.invoker.call::<Resource<Site>>(&call, identity).await
    }

    pub async fn list_sites(&self, identity: &IdentityContext) -> Result<Vec<Site>, ClientError> {
        let call = ApiCall::get("list_sites", SITES);
        self.invoker.call::<ResourceList<Site>>(&call, identity).await
    }
}
