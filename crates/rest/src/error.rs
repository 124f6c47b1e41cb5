//! Configuration and construction errors for the REST transport.
//!
//! Per-call failures are not reported here: they are mapped to
//! [`protocol::TransportError`] and normalised by the invoker.

use thiserror::Error;

/// Reasons a [`crate::RestConfig`] or [`crate::RestTransport`] cannot be built.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No base URL was configured.
    #[error("base URL is required (set TAPIS_BASE_URL)")]
    MissingBaseUrl,

    /// The base URL did not parse or is not `http`/`https`.
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl {
        /// The rejected value.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A timeout value was not a positive whole number of seconds.
    #[error("invalid timeout '{0}': expected a positive number of seconds")]
    InvalidTimeout(String),

    /// An extra header collides with an identity header, which must only be
    /// supplied per call.
    #[error("header '{0}' is reserved for per-call identity")]
    ReservedHeader(String),

    /// An extra header name or value is not valid HTTP.
    #[error("invalid header '{0}'")]
    InvalidHeader(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client construction failed: {0}")]
    Client(#[from] reqwest::Error),
}
