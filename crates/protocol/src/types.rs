//! Shared value types carried inside envelope `result` payloads.
//!
//! The envelope layer treats `result` as opaque; the types here are the small
//! wrapper objects that action endpoints return (`{"changes": N}`,
//! `{"names": [...]}`, `{"url": "..."}`, `{"isAuthorized": bool}`) plus the
//! timestamp type used by resource DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Action-endpoint result wrappers
// ---------------------------------------------------------------------------

/// `result` of grant/revoke/enable/disable/delete/undelete/change-owner calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultChangeCount {
    /// Number of records changed. May be absent on some service builds.
    #[serde(default)]
    pub changes: Option<i64>,
}

/// `result` of calls that return a list of names (roles, permissions, DBs).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultNameArray {
    /// The names, in server order.
    #[serde(default)]
    pub names: Option<Vec<String>>,
}

/// `result` of create calls: the URL of the new resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultResourceUrl {
    /// Absolute URL of the created resource.
    #[serde(default)]
    pub url: Option<String>,
}

/// `result` of authorisation checks (e.g. SK `isAdmin`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultAuthorized {
    /// Whether the subject is authorised.
    #[serde(rename = "isAuthorized", default)]
    pub is_authorized: Option<bool>,
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp as reported by a service (`created`, `updated`).
///
/// Decoded from RFC 3339 and displayed the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// The instant as a `chrono` value, for date arithmetic.
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
