//! Request descriptor for one endpoint invocation.
//!
//! An [`ApiCall`] stands in for a generated per-endpoint stub method: it names
//! the operation and carries the already-built method, path, query, and body.
//! Identity is not part of the call; it is supplied separately
//! to [`crate::CallInvoker::invoke`].

use serde::Serialize;
use serde_json::Value;

use crate::errors::{ClientError, TransportError};

/// HTTP method of an [`ApiCall`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// Upper-case method name as sent on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One endpoint invocation with its request parameters already built.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiCall {
    operation: &'static str,
    method: HttpMethod,
    base_path: String,
    segments: Vec<String>,
    query: Vec<(String, String)>,
    body: Option<Value>,
}

impl ApiCall {
    /// Creates a call. `path` is a fixed route relative to the transport's
    /// base URL, starting with `/`. Caller-supplied values never go here;
    /// they are appended with [`ApiCall::segment`].
    pub fn new(operation: &'static str, method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            operation,
            method,
            base_path: path.into(),
            segments: Vec::new(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(operation: &'static str, path: impl Into<String>) -> Self {
        Self::new(operation, HttpMethod::Get, path)
    }

    pub fn post(operation: &'static str, path: impl Into<String>) -> Self {
        Self::new(operation, HttpMethod::Post, path)
    }

    pub fn put(operation: &'static str, path: impl Into<String>) -> Self {
        Self::new(operation, HttpMethod::Put, path)
    }

    pub fn patch(operation: &'static str, path: impl Into<String>) -> Self {
        Self::new(operation, HttpMethod::Patch, path)
    }

    pub fn delete(operation: &'static str, path: impl Into<String>) -> Self {
        Self::new(operation, HttpMethod::Delete, path)
    }

    /// Appends one path segment. The transport percent-encodes it as a
    /// unit, so `/`, `?` and `#` inside `value` stay part of the segment.
    pub fn segment(mut self, value: impl Into<String>) -> Self {
        self.segments.push(value.into());
        self
    }

    /// Appends a caller-supplied relative path (e.g. a file path), one
    /// segment per `/`-separated component. A leading `/` is ignored.
    pub fn sub_path(mut self, path: &str) -> Self {
        self.segments
            .extend(path.trim_start_matches('/').split('/').map(str::to_owned));
        self
    }

    /// Appends a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Appends a query parameter only when `value` is present.
    pub fn query_opt<V: ToString>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    /// Serialises `body` as the JSON request body.
    ///
    /// A serialisation failure is normalised here, before anything is sent.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ClientError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ClientError::normalize(TransportError::Encode(e)))?;
        self.body = Some(value);
        Ok(self)
    }

    /// Sets an already-built JSON request body.
    pub fn json_value(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Stub operation name (e.g. `"getSystem"`), used for logging.
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// The fixed route the call was created with.
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Raw, unencoded segments appended after [`ApiCall::base_path`].
    pub fn path_segments(&self) -> &[String] {
        &self.segments
    }

    /// Route and segments joined with `/`, unencoded. For logs and tests.
    pub fn path(&self) -> String {
        let mut path = self.base_path.clone();
        for segment in &self.segments {
            if !path.ends_with('/') {
                path.push('/');
            }
            path.push_str(segment);
        }
        path
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }
}
