//! Tapis REST transport adapter.
//!
//! Implements the [`protocol::ServiceTransport`] trait over `reqwest`: URL
//! construction from a configured tenant base URL, per-request identity
//! headers, JSON bodies, and mapping of `reqwest` failures onto
//! [`protocol::TransportError`].
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Connection pooling, TLS, and timeouts live here and in
//! `reqwest`. The [`protocol`] crate sees only [`protocol::ServiceTransport`];
//! façades see only [`protocol::CallInvoker`].
//!
//! ## Identity isolation
//!
//! The shared `reqwest::Client` is built with configuration-level headers
//! only (`Accept`, `User-Agent`, configured extras). Identity headers are
//! added to each request from the call's [`protocol::IdentityContext`], and
//! [`RestConfig`] refuses extra headers that would collide with them.
//!
//! ## Configuration
//!
//! ```text
//! TAPIS_BASE_URL       tenant base URL (required)
//! TAPIS_TIMEOUT_SECS   whole-request timeout in seconds (optional)
//! TAPIS_USER_AGENT     User-Agent override (optional)
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod headers;

pub use client::RestTransport;
pub use config::RestConfig;
pub use error::ConfigError;
