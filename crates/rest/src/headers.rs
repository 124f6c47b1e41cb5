//! Client-level default headers and per-request identity headers.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, USER_AGENT};

use protocol::{HeaderPair, TransportError};

use crate::config::RestConfig;
use crate::error::ConfigError;

pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Headers shared by every request from one transport.
///
/// Contains no identity material; [`RestConfig::validate`] has already
/// rejected extra headers that collide with identity keys.
pub fn default_headers(config: &RestConfig) -> Result<HeaderMap, ConfigError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(CONTENT_TYPE_JSON));
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(config.user_agent.trim())
            .map_err(|_| ConfigError::InvalidHeader(USER_AGENT.to_string()))?,
    );

    for (key, value) in &config.extra_headers {
        let name = HeaderName::from_bytes(key.trim().to_ascii_lowercase().as_bytes())
            .map_err(|_| ConfigError::InvalidHeader(key.clone()))?;
        let value = HeaderValue::from_str(value.trim())
            .map_err(|_| ConfigError::InvalidHeader(key.clone()))?;
        headers.insert(name, value);
    }

    Ok(headers)
}

/// Headers for one call, built from the caller's identity pairs.
///
/// Identity values are marked sensitive so they are never printed by
/// `reqwest`'s debug output.
pub fn call_headers(pairs: &[HeaderPair]) -> Result<HeaderMap, TransportError> {
    let mut headers = HeaderMap::with_capacity(pairs.len());
    for (key, value) in pairs {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|_| TransportError::InvalidRequest(format!("invalid header key: {key}")))?;
        let mut value = HeaderValue::from_str(value)
            .map_err(|_| TransportError::InvalidRequest(format!("invalid header value for {key}")))?;
        value.set_sensitive(true);
        headers.insert(name, value);
    }
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::{IdentityContext, HEADER_TENANT, HEADER_TOKEN, HEADER_USER};

    #[test]
    fn default_headers_have_accept_and_user_agent_only_plus_extras() {
        let config = RestConfig::new("https://host")
            .with_user_agent("tapis-cli/1.0")
            .insert_header("X-Tapis-Tracking-ID", "run-7");
        let headers = default_headers(&config).expect("headers");

        assert_eq!(headers.get(ACCEPT).expect("accept"), CONTENT_TYPE_JSON);
        assert_eq!(headers.get(USER_AGENT).expect("user agent"), "tapis-cli/1.0");
        assert_eq!(headers.get("x-tapis-tracking-id").expect("extra"), "run-7");
        assert!(headers.get(HEADER_TOKEN).is_none());
    }

    #[test]
    fn call_headers_carry_identity_and_are_sensitive() {
        let identity = IdentityContext::service_on_behalf_of("svc", "alice", "dev").expect("identity");
        let headers = call_headers(&identity.headers()).expect("headers");

        assert_eq!(headers.len(), 3);
        assert_eq!(headers.get(HEADER_TOKEN).expect("token"), "svc");
        assert_eq!(headers.get(HEADER_USER).expect("user"), "alice");
        assert_eq!(headers.get(HEADER_TENANT).expect("tenant"), "dev");
        assert!(headers.get(HEADER_TOKEN).expect("token").is_sensitive());
    }

    #[test]
    fn control_characters_in_values_are_rejected() {
        let pairs = vec![(HEADER_TOKEN, "bad\nvalue".to_owned())];
        assert!(matches!(call_headers(&pairs), Err(TransportError::InvalidRequest(_))));
    }
}
