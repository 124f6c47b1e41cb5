//! Core protocol shared by every Tapis service façade.
//!
//! Every backend call follows the same shape: attach the caller's identity
//! headers, perform one request/response cycle, unwrap the
//! `{status, message, version, result}` envelope on success, and normalise
//! every failure into a single [`ClientError`]. This crate owns that shape;
//! the façades in the `services` crate only choose paths, DTOs, and a
//! result policy per operation.
//!
//! ## Architectural Layer
//!
//! **Protocol + port definitions.** This crate has no I/O dependencies. The
//! HTTP exchange is behind [`ServiceTransport`]; the `rest` crate supplies
//! the `reqwest` implementation.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identity`] | [`IdentityContext`] and the `X-Tapis-*` header keys |
//! | [`call`] | [`ApiCall`] request descriptor |
//! | [`transport`] | [`ServiceTransport`] port |
//! | [`invoker`] | [`CallInvoker`]: one round trip, classified and normalised |
//! | [`envelope`] | [`ResponseEnvelope`] and typed unwrapping |
//! | [`errors`] | [`TransportError`], [`ClientError`] and the normaliser |
//! | [`policy`] | Per-category absent-result conventions |
//! | [`notes`] | Canonical JSON string form of `notes` fields |
//! | [`identifiers`] | Newtype identifiers (`UserName`, `TenantId`, `CallId`, …) |
//! | [`types`] | Action-result wrappers and [`Timestamp`] |

pub mod call;
pub mod envelope;
pub mod errors;
pub mod identifiers;
pub mod identity;
pub mod invoker;
pub mod notes;
pub mod policy;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod transport;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use call::{ApiCall, HttpMethod};
pub use envelope::ResponseEnvelope;
pub use errors::{ClientError, ErrorDetail, TransportError, ERROR_STATUS, TRANSPORT_ERROR_CODE};
pub use identifiers::{BearerToken, CallId, TenantId, UserName};
pub use identity::{
    is_identity_header, HeaderPair, IdentityContext, IdentityError, OnBehalfOf, HEADER_TENANT,
    HEADER_TOKEN, HEADER_USER, IDENTITY_HEADERS,
};
pub use invoker::CallInvoker;
pub use policy::{
    Acknowledge, Authorized, ChangeCount, NameList, Resource, ResourceList, ResourceUrl,
    ResultPolicy, StatusCheck, UNKNOWN_CHANGE_COUNT,
};
pub use transport::{ServiceTransport, TransportResponse};
pub use types::{ResultAuthorized, ResultChangeCount, ResultNameArray, ResultResourceUrl, Timestamp};

/// Result alias for façade calls.
pub type Result<T, E = ClientError> = std::result::Result<T, E>;
