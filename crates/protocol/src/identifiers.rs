//! Newtype identifiers for the identity and correlation values that travel
//! with every call.
//!
//! Each value that has an identity is a distinct newtype wrapping a primitive.
//! This prevents accidentally interchanging, for example, an impersonated
//! [`UserName`] with a [`TenantId`] even though both are strings on the wire.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is blank.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.trim().is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id! {
    /// An end-user name asserted by a service through the `X-Tapis-User` header.
    UserName
}

string_id! {
    /// A tenant identifier (e.g. `"dev"`, `"tacc"`) asserted through the
    /// `X-Tapis-Tenant` header.
    TenantId
}

// ---------------------------------------------------------------------------
// Bearer token
// ---------------------------------------------------------------------------

/// An opaque bearer token sent under the `X-Tapis-Token` header.
///
/// `Debug` never prints the token itself, so identities can appear in spans
/// and error reports safely.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BearerToken(String);

impl BearerToken {
    /// Creates a token, returning `None` if the value is blank.
    ///
    /// Surrounding whitespace is trimmed.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let v = value.into();
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_owned()))
        }
    }

    /// Returns the raw token text for placing on the wire.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BearerToken(<redacted, {} bytes>)", self.0.len())
    }
}

// ---------------------------------------------------------------------------
// Call correlation
// ---------------------------------------------------------------------------

/// Identifies a single request/response cycle.
///
/// Generated fresh by the invoker for every call and recorded on the
/// `service_call` span so all log lines for one round trip can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallId(Uuid);

impl CallId {
    /// Generates a new random call identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for CallId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_identifiers_are_rejected() {
        assert!(UserName::new("").is_none());
        assert!(TenantId::new("   ").is_none());
        assert_eq!(UserName::new("testuser2").map(|u| u.to_string()), Some("testuser2".to_owned()));
    }

    #[test]
    fn bearer_token_debug_is_redacted() {
        let token = BearerToken::new(" secret.jwt.value ").expect("token");
        assert_eq!(token.expose(), "secret.jwt.value");
        let debug = format!("{token:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("redacted"));
    }

    #[test]
    fn call_ids_are_unique() {
        assert_ne!(CallId::new_random(), CallId::new_random());
    }
}
