//! Transport failures and the single normalised client error.
//!
//! [`TransportError`] describes *how* a call failed at the transport level:
//! with an HTTP status and raw body, or with no HTTP context at all.
//! [`ClientError`] is the one error type every façade method returns; it is
//! built only by [`ClientError::normalize`], which applies the envelope-or-raw
//! body fallback so a non-JSON error page can never cause a second failure
//! while the first is being reported.

use serde_json::Value;
use thiserror::Error;

use crate::envelope::ResponseEnvelope;

/// Display message used when a failure carries no non-blank message.
pub const ERROR_STATUS: &str = "error";

/// [`ClientError::code`] for failures that never produced an HTTP response.
pub const TRANSPORT_ERROR_CODE: i32 = -1;

// ---------------------------------------------------------------------------
// Transport-level failures
// ---------------------------------------------------------------------------

/// A failure observed while performing one request/response cycle.
///
/// Only [`TransportError::Status`] carries HTTP context. Every other variant
/// means no usable response arrived, or the client failed locally before or
/// after the exchange.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The server answered with a non-2xx status.
    #[error("HTTP {status}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body, possibly empty and possibly not JSON.
        body: String,
    },

    /// DNS resolution, connect, TLS, or connection reset failure.
    #[error("connection failed: {0}")]
    Connect(String),

    /// Connect or read timeout enforced by the transport.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The request body could not be serialised; nothing was sent.
    #[error("request serialization failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// A 2xx body, or its `result`, could not be decoded into the expected type.
    #[error("response deserialization failed: {0}")]
    Decode(#[source] serde_json::Error),

    /// URL or header construction failed locally.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl TransportError {
    /// Returns the HTTP status and raw body, if this failure carries HTTP context.
    pub fn http_context(&self) -> Option<(u16, &str)> {
        match self {
            Self::Status { status, body } => Some((*status, body.as_str())),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Normalised client error
// ---------------------------------------------------------------------------

/// Structured detail of a [`ClientError`].
///
/// The two variants correspond to the two failure origins. Callers that only
/// need dispatch fields should prefer the accessors on [`ClientError`].
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorDetail {
    /// The server answered with a non-2xx status.
    Server {
        /// HTTP status code.
        code: u16,
        /// Envelope `status`, when the body parsed as an envelope.
        status: Option<String>,
        /// Envelope `message`, or the raw body when it was not an envelope.
        tapis_message: Option<String>,
        /// Envelope `version`, when the body parsed as an envelope.
        version: Option<String>,
        /// Envelope `result`, when the body parsed as an envelope.
        result: Option<Value>,
    },
    /// No HTTP response was available.
    Transport {
        /// Message of the underlying failure.
        tapis_message: String,
    },
}

impl ErrorDetail {
    fn tapis_message(&self) -> Option<&str> {
        match self {
            Self::Server { tapis_message, .. } => tapis_message.as_deref(),
            Self::Transport { tapis_message } => Some(tapis_message.as_str()),
        }
    }
}

/// The single error type surfaced by every façade call.
///
/// Immutable once built. The original [`TransportError`] is preserved as the
/// error source.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ClientError {
    message: String,
    detail: ErrorDetail,
    #[source]
    cause: TransportError,
}

impl ClientError {
    /// Converts a transport failure into the normalised client error.
    ///
    /// 1. With HTTP context, the body is parsed as an envelope. On success the
    ///    envelope fields are copied; otherwise the raw body becomes the
    ///    message verbatim (or the failure's own text if the body is blank).
    /// 2. Without HTTP context, the code is [`TRANSPORT_ERROR_CODE`] and the
    ///    message is the failure's own text.
    /// 3. The display message is the service message if non-blank, else
    ///    [`ERROR_STATUS`].
    pub fn normalize(cause: TransportError) -> Self {
        let detail = match cause.http_context() {
            Some((code, body)) => server_detail(code, body, &cause),
            None => ErrorDetail::Transport {
                tapis_message: cause.to_string(),
            },
        };
        let message = display_message(detail.tapis_message());
        Self {
            message,
            detail,
            cause,
        }
    }

    /// HTTP status for server failures, [`TRANSPORT_ERROR_CODE`] otherwise.
    pub fn code(&self) -> i32 {
        match &self.detail {
            ErrorDetail::Server { code, .. } => i32::from(*code),
            ErrorDetail::Transport { .. } => TRANSPORT_ERROR_CODE,
        }
    }

    /// Envelope `status` of the failing response, if it was an envelope.
    pub fn status(&self) -> Option<&str> {
        match &self.detail {
            ErrorDetail::Server { status, .. } => status.as_deref(),
            ErrorDetail::Transport { .. } => None,
        }
    }

    /// The service-supplied message, raw body text, or transport message.
    pub fn tapis_message(&self) -> Option<&str> {
        self.detail.tapis_message()
    }

    /// Envelope `version` of the failing response, if it was an envelope.
    pub fn version(&self) -> Option<&str> {
        match &self.detail {
            ErrorDetail::Server { version, .. } => version.as_deref(),
            ErrorDetail::Transport { .. } => None,
        }
    }

    /// Envelope `result` of the failing response, if any.
    pub fn result(&self) -> Option<&Value> {
        match &self.detail {
            ErrorDetail::Server { result, .. } => result.as_ref(),
            ErrorDetail::Transport { .. } => None,
        }
    }

    /// The display message: the service message if non-blank, else [`ERROR_STATUS`].
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The structured detail for exhaustive matching.
    pub fn detail(&self) -> &ErrorDetail {
        &self.detail
    }

    /// The transport failure this error was normalised from.
    pub fn cause(&self) -> &TransportError {
        &self.cause
    }

    /// Returns `true` when the server answered 404.
    pub fn is_not_found(&self) -> bool {
        self.code() == 404
    }
}

impl From<TransportError> for ClientError {
    fn from(cause: TransportError) -> Self {
        Self::normalize(cause)
    }
}

fn server_detail(code: u16, body: &str, cause: &TransportError) -> ErrorDetail {
    if body.trim().is_empty() {
        return ErrorDetail::Server {
            code,
            status: None,
            tapis_message: Some(cause.to_string()),
            version: None,
            result: None,
        };
    }

    // Any JSON object decodes into the all-optional envelope; only one that
    // names a status or message counts as envelope-shaped.
    let envelope = serde_json::from_str::<ResponseEnvelope>(body)
        .ok()
        .filter(|e| e.status.is_some() || e.message.is_some());
    match envelope {
        Some(envelope) => ErrorDetail::Server {
            code,
            status: envelope.status,
            tapis_message: envelope.message,
            version: envelope.version,
            result: envelope.result,
        },
        // Not an envelope: proxies and load balancers answer with plain text,
        // HTML or their own JSON.
        None => ErrorDetail::Server {
            code,
            status: None,
            tapis_message: Some(body.to_owned()),
            version: None,
            result: None,
        },
    }
}

fn display_message(tapis_message: Option<&str>) -> String {
    match tapis_message {
        Some(message) if !message.trim().is_empty() => message.to_owned(),
        _ => ERROR_STATUS.to_owned(),
    }
}
