//! The transport port.
//!
//! Infrastructure crates implement [`ServiceTransport`] to perform the actual
//! HTTP exchange. This crate sees only the trait.

use async_trait::async_trait;

use crate::call::ApiCall;
use crate::errors::TransportError;
use crate::identity::HeaderPair;

/// A response that arrived, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs exactly one request/response cycle.
///
/// ## Contract
///
/// - Every response that arrives is returned as `Ok`, including non-2xx
///   statuses; classifying the status is the invoker's job.
/// - `Err` is reserved for exchanges that produced no response (connect,
///   timeout, local request construction).
/// - `headers` must be applied to this request only. Implementations must
///   not retain them or install them as client-wide defaults.
/// - No retries.
#[async_trait]
pub trait ServiceTransport: Send + Sync {
    async fn execute(
        &self,
        call: &ApiCall,
        headers: &[HeaderPair],
    ) -> Result<TransportResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_range_is_2xx() {
        assert!(TransportResponse::new(200, "").is_success());
        assert!(TransportResponse::new(204, "").is_success());
        assert!(!TransportResponse::new(199, "").is_success());
        assert!(!TransportResponse::new(301, "").is_success());
        assert!(!TransportResponse::new(404, "").is_success());
    }
}
