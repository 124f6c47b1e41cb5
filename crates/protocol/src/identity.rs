//! Per-call identity material and the headers it produces.
//!
//! An [`IdentityContext`] is an immutable value threaded explicitly into
//! every call. It is never stored on a shared client, so a user identity and
//! a service identity can be used concurrently in one process.
//!
//! End-user identities cannot carry impersonation headers: servers reject a
//! plain user token combined with `X-Tapis-User` / `X-Tapis-Tenant`, and
//! [`IdentityContext::on_behalf_of`] refuses to build one.

use thiserror::Error;

use crate::identifiers::{BearerToken, TenantId, UserName};

/// Header carrying the bearer token.
pub const HEADER_TOKEN: &str = "X-Tapis-Token";
/// Header naming the impersonated end user.
pub const HEADER_USER: &str = "X-Tapis-User";
/// Header naming the impersonated end user's tenant.
pub const HEADER_TENANT: &str = "X-Tapis-Tenant";

/// All header keys owned by the identity carrier.
pub const IDENTITY_HEADERS: [&str; 3] = [HEADER_TOKEN, HEADER_USER, HEADER_TENANT];

/// A header name/value pair attached to one outgoing request.
pub type HeaderPair = (&'static str, String);

/// Reasons an [`IdentityContext`] cannot be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// The bearer token was empty or whitespace.
    #[error("bearer token must not be blank")]
    BlankToken,
    /// The impersonated user name was empty or whitespace.
    #[error("on-behalf-of user must not be blank")]
    BlankUser,
    /// The impersonated tenant was empty or whitespace.
    #[error("on-behalf-of tenant must not be blank")]
    BlankTenant,
    /// Impersonation was requested for an end-user token.
    #[error("an end-user token cannot be combined with on-behalf-of headers")]
    UserImpersonation,
}

/// The end user a service is acting for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OnBehalfOf {
    /// Impersonated user.
    pub user: UserName,
    /// Tenant of the impersonated user.
    pub tenant: TenantId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Principal {
    User,
    Service { on_behalf_of: Option<OnBehalfOf> },
}

/// Authentication material for one logical caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityContext {
    token: BearerToken,
    principal: Principal,
}

impl IdentityContext {
    /// An end user calling with their own token.
    pub fn user(token: impl Into<String>) -> Result<Self, IdentityError> {
        Ok(Self {
            token: BearerToken::new(token).ok_or(IdentityError::BlankToken)?,
            principal: Principal::User,
        })
    }

    /// A backend service calling as itself.
    pub fn service(token: impl Into<String>) -> Result<Self, IdentityError> {
        Ok(Self {
            token: BearerToken::new(token).ok_or(IdentityError::BlankToken)?,
            principal: Principal::Service { on_behalf_of: None },
        })
    }

    /// A backend service acting for `user` in `tenant`.
    pub fn service_on_behalf_of(
        token: impl Into<String>,
        user: impl Into<String>,
        tenant: impl Into<String>,
    ) -> Result<Self, IdentityError> {
        Self::service(token)?.on_behalf_of(user, tenant)
    }

    /// Returns a copy of this service identity impersonating another user.
    ///
    /// Fails with [`IdentityError::UserImpersonation`] for end-user identities.
    pub fn on_behalf_of(
        &self,
        user: impl Into<String>,
        tenant: impl Into<String>,
    ) -> Result<Self, IdentityError> {
        if self.principal == Principal::User {
            return Err(IdentityError::UserImpersonation);
        }
        let on_behalf_of = OnBehalfOf {
            user: UserName::new(user).ok_or(IdentityError::BlankUser)?,
            tenant: TenantId::new(tenant).ok_or(IdentityError::BlankTenant)?,
        };
        Ok(Self {
            token: self.token.clone(),
            principal: Principal::Service {
                on_behalf_of: Some(on_behalf_of),
            },
        })
    }

    /// The bearer token.
    pub fn token(&self) -> &BearerToken {
        &self.token
    }

    /// The impersonated user and tenant, if any.
    pub fn impersonation(&self) -> Option<&OnBehalfOf> {
        match &self.principal {
            Principal::Service { on_behalf_of } => on_behalf_of.as_ref(),
            Principal::User => None,
        }
    }

    /// Returns `true` for service identities.
    pub fn is_service(&self) -> bool {
        matches!(self.principal, Principal::Service { .. })
    }

    /// Headers to attach to one outgoing request.
    pub fn headers(&self) -> Vec<HeaderPair> {
        let mut headers = vec![(HEADER_TOKEN, self.token.expose().to_owned())];
        if let Some(obo) = self.impersonation() {
            headers.push((HEADER_USER, obo.user.as_str().to_owned()));
            headers.push((HEADER_TENANT, obo.tenant.as_str().to_owned()));
        }
        headers
    }
}

/// Returns `true` if `name` is one of the identity header keys (case-insensitive).
pub fn is_identity_header(name: &str) -> bool {
    IDENTITY_HEADERS
        .iter()
        .any(|key| key.eq_ignore_ascii_case(name.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_identity_sends_only_token() {
        let identity = IdentityContext::user("user-jwt").expect("identity");
        assert_eq!(identity.headers(), vec![(HEADER_TOKEN, "user-jwt".to_owned())]);
        assert!(!identity.is_service());
        assert!(identity.impersonation().is_none());
    }

    #[test]
    fn service_identity_sends_impersonation_headers() {
        let identity =
            IdentityContext::service_on_behalf_of("svc-jwt", "testuser2", "dev").expect("identity");
        assert_eq!(
            identity.headers(),
            vec![
                (HEADER_TOKEN, "svc-jwt".to_owned()),
                (HEADER_USER, "testuser2".to_owned()),
                (HEADER_TENANT, "dev".to_owned()),
            ]
        );
    }

    #[test]
    fn user_token_cannot_impersonate() {
        let identity = IdentityContext::user("user-jwt").expect("identity");
        assert_eq!(
            identity.on_behalf_of("someone", "dev"),
            Err(IdentityError::UserImpersonation)
        );
    }

    #[test]
    fn on_behalf_of_does_not_mutate_original() {
        let service = IdentityContext::service("svc-jwt").expect("identity");
        let acting = service.on_behalf_of("alice", "dev").expect("identity");
        assert!(service.impersonation().is_none());
        assert_eq!(acting.impersonation().map(|o| o.user.as_str()), Some("alice"));
    }

    #[test]
    fn blank_values_are_rejected() {
        assert_eq!(IdentityContext::user(" "), Err(IdentityError::BlankToken));
        assert_eq!(
            IdentityContext::service_on_behalf_of("svc", "", "dev"),
            Err(IdentityError::BlankUser)
        );
        assert_eq!(
            IdentityContext::service_on_behalf_of("svc", "alice", ""),
            Err(IdentityError::BlankTenant)
        );
    }

    #[test]
    fn identity_header_match_is_case_insensitive() {
        assert!(is_identity_header("x-tapis-token"));
        assert!(is_identity_header("X-TAPIS-TENANT"));
        assert!(!is_identity_header("x-tapis-tracking-id"));
    }
}
