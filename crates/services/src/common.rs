//! Pieces shared by several façades: list options, permission request
//! bodies, and the status-check / change-count call shapes.

use serde::{Deserialize, Serialize};
use tracing::debug;

use protocol::{ApiCall, CallInvoker, ChangeCount, ClientError, IdentityContext, StatusCheck, UNKNOWN_CHANGE_COUNT};

/// Query options accepted by list and search endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Search expression, e.g. `(owner.eq.alice)~(enabled.eq.true)`.
    pub search: Option<String>,
    /// Maximum number of items.
    pub limit: Option<i32>,
    /// Number of items to skip.
    pub skip: Option<i32>,
    /// Sort key, optionally suffixed with `(asc)` / `(desc)`.
    pub order_by: Option<String>,
    /// Comma-separated attribute selection, e.g. `id,owner`.
    pub select: Option<String>,
    /// Include soft-deleted resources.
    pub show_deleted: bool,
}

impl ListOptions {
    pub fn search(search: impl Into<String>) -> Self {
        Self {
            search: Some(search.into()),
            ..Self::default()
        }
    }

    pub fn with_limit(mut self, limit: i32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }

    pub fn with_select(mut self, select: impl Into<String>) -> Self {
        self.select = Some(select.into());
        self
    }

    pub fn showing_deleted(mut self) -> Self {
        self.show_deleted = true;
        self
    }

    /// Adds the present options to `call` as query parameters.
    pub fn apply(&self, call: ApiCall) -> ApiCall {
        let call = call
            .query_opt("search", self.search.as_deref())
            .query_opt("limit", self.limit)
            .query_opt("skip", self.skip)
            .query_opt("orderBy", self.order_by.as_deref())
            .query_opt("select", self.select.as_deref());
        if self.show_deleted {
            call.query("showDeleted", true)
        } else {
            call
        }
    }
}

/// Body of grant/revoke permission calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReqPerms {
    pub permissions: Vec<String>,
}

impl ReqPerms {
    pub fn new<I, S>(permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            permissions: permissions.into_iter().map(Into::into).collect(),
        }
    }
}

/// Health or readiness check under `base`.
pub(crate) async fn status_check(
    invoker: &CallInvoker,
    identity: &IdentityContext,
    operation: &'static str,
    path: String,
) -> Result<Option<String>, ClientError> {
    invoker
        .call::<StatusCheck>(&ApiCall::get(operation, path), identity)
        .await
}

/// Change-count call; an unknown outcome is logged but not an error.
pub(crate) async fn change(
    invoker: &CallInvoker,
    identity: &IdentityContext,
    call: ApiCall,
) -> Result<i64, ClientError> {
    let changes = invoker.call::<ChangeCount>(&call, identity).await?;
    if changes == UNKNOWN_CHANGE_COUNT {
        debug!(operation = call.operation(), "no change count in response");
    }
    Ok(changes)
}
