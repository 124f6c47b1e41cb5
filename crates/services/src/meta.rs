//! Meta (document store) façade (`/v3/meta`).
//!
//! Documents are schemaless, so they surface as [`serde_json::Value`].

use serde_json::Value;

use protocol::{ApiCall, CallInvoker, ClientError, IdentityContext, NameList, Resource, ResourceUrl};

use crate::common;

const BASE: &str = "/v3/meta";

/// Client for the Meta service.
#[derive(Debug, Clone)]
pub struct MetaClient {
    invoker: CallInvoker,
}

impl MetaClient {
    pub fn new(invoker: CallInvoker) -> Self {
        Self { invoker }
    }

    pub async fn health(&self, identity: &IdentityContext) -> Result<Option<String>, ClientError> {
        common::status_check(&self.invoker, identity, "healthcheck", format!("{BASE}/healthcheck")).await
    }

    pub async fn list_db_names(&self, identity: &IdentityContext) -> Result<Vec<String>, ClientError> {
        let call = ApiCall::get("listDBNames", format!("{BASE}/"));
        self.invoker.call::<NameList>(&call, identity).await
    }

    pub async fn list_collection_names(&self, identity: &IdentityContext, db: &str) -> Result<Vec<String>, ClientError> {
        let call = ApiCall::get("listCollectionNames", BASE).segment(db);
        self.invoker.call::<NameList>(&call, identity).await
    }

    pub async fn get_document(
        &self,
        identity: &IdentityContext,
        db: &str,
        collection: &str,
        doc_id: &str,
    ) -> Result<Option<Value>, ClientError> {
        let call = ApiCall::get("getDocument", BASE)
            .segment(db)
            .segment(collection)
            .segment(doc_id);
        self.invoker.call::<Resource<Value>>(&call, identity).await
    }

    /// Inserts `document` and returns the URL of the new document.
    pub async fn create_document(
        &self,
        identity: &IdentityContext,
        db: &str,
        collection: &str,
        document: Value,
    ) -> Result<Option<String>, ClientError> {
        let call = ApiCall::post("createDocument", BASE)
            .segment(db)
            .segment(collection)
            .json_value(document);
        self.invoker.call::<ResourceUrl>(&call, identity).await
    }
}
