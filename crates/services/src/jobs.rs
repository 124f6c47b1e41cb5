//! Jobs service façade (`/v3/jobs`).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use protocol::{Acknowledge, ApiCall, CallInvoker, ClientError, IdentityContext, Resource, ResourceList, Timestamp};

use crate::common::{self, ListOptions};

const BASE: &str = "/v3/jobs";

/// Body of a job submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReqSubmitJob {
    pub name: String,
    pub app_id: String,
    pub app_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exec_system_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ReqSubmitJob {
    pub fn new(name: impl Into<String>, app_id: impl Into<String>, app_version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            app_id: app_id.into(),
            app_version: app_version.into(),
            ..Self::default()
        }
    }
}

/// A submitted job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub app_id: Option<String>,
    #[serde(default)]
    pub app_version: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub last_message: Option<String>,
    #[serde(default)]
    pub created: Option<Timestamp>,
    #[serde(default)]
    pub ended: Option<Timestamp>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Result of the status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatus {
    pub status: String,
}

/// Summary row of the job listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListItem {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub app_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created: Option<Timestamp>,
}

/// Client for the Jobs service.
#[derive(Debug, Clone)]
pub struct JobsClient {
    invoker: CallInvoker,
}

impl JobsClient {
    pub fn new(invoker: CallInvoker) -> Self {
        Self { invoker }
    }

    pub async fn health(&self, identity: &IdentityContext) -> Result<Option<String>, ClientError> {
        common::status_check(&self.invoker, identity, "checkHealth", format!("{BASE}/healthcheck")).await
    }

    pub async fn ready(&self, identity: &IdentityContext) -> Result<Option<String>, ClientError> {
        common::status_check(&self.invoker, identity, "ready", format!("{BASE}/readycheck")).await
    }

    pub async fn submit_job(&self, identity: &IdentityContext, request: &ReqSubmitJob) -> Result<Option<Job>, ClientError> {
        let call = ApiCall::post("submitJob", format!("{BASE}/submit")).json(request)?;
        self.invoker.call::<Resource<Job>>(&call, identity).await
    }

    pub async fn get_job(&self, identity: &IdentityContext, job_uuid: &str) -> Result<Option<Job>, ClientError> {
        let call = ApiCall::get("getJob", BASE).segment(job_uuid);
        self.invoker.call::<Resource<Job>>(&call, identity).await
    }

    pub async fn get_job_status(
        &self,
        identity: &IdentityContext,
        job_uuid: &str,
    ) -> Result<Option<JobStatus>, ClientError> {
        let call = ApiCall::get("getJobStatus", BASE).segment(job_uuid).segment("status");
        self.invoker.call::<Resource<JobStatus>>(&call, identity).await
    }

    pub async fn get_job_list(
        &self,
        identity: &IdentityContext,
        options: &ListOptions,
    ) -> Result<Vec<JobListItem>, ClientError> {
        let call = options.apply(ApiCall::get("getJobList", format!("{BASE}/list")));
        self.invoker.call::<ResourceList<JobListItem>>(&call, identity).await
    }

    pub async fn cancel_job(&self, identity: &IdentityContext, job_uuid: &str) -> Result<(), ClientError> {
        let call = ApiCall::post("cancelJob", BASE).segment(job_uuid).segment("cancel");
        self.invoker.call::<Acknowledge>(&call, identity).await
    }
}
