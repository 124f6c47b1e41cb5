//! Transport configuration, from code or from `TAPIS_*` environment variables.

use std::collections::BTreeMap;
use std::time::Duration;

use protocol::is_identity_header;
use reqwest::Url;

use crate::error::ConfigError;

/// Environment variable holding the tenant base URL.
pub const ENV_BASE_URL: &str = "TAPIS_BASE_URL";
/// Environment variable holding the whole-request timeout in seconds.
pub const ENV_TIMEOUT_SECS: &str = "TAPIS_TIMEOUT_SECS";
/// Environment variable overriding the `User-Agent` header.
pub const ENV_USER_AGENT: &str = "TAPIS_USER_AGENT";

/// Default `User-Agent` sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!("tapis-client-rs/", env!("CARGO_PKG_VERSION"));

/// Transport configuration for Tapis REST requests.
///
/// Holds only process-wide settings. Identity headers are never part of the
/// configuration; they travel with each call.
#[derive(Debug, Clone)]
pub struct RestConfig {
    /// Tenant base URL, e.g. `https://dev.develop.tapis.io`.
    pub base_url: String,
    /// Optional whole-request timeout.
    pub timeout: Option<Duration>,
    /// Optional connect timeout.
    pub connect_timeout: Option<Duration>,
    /// `User-Agent` header value.
    pub user_agent: String,
    /// Additional non-identity headers sent with every request.
    pub extra_headers: BTreeMap<String, String>,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout: None,
            connect_timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            extra_headers: BTreeMap::new(),
        }
    }
}

impl RestConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Reads [`ENV_BASE_URL`], [`ENV_TIMEOUT_SECS`] and [`ENV_USER_AGENT`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(ENV_BASE_URL)
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::MissingBaseUrl)?;
        let mut config = Self::new(base_url.trim());

        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| ConfigError::InvalidTimeout(raw.clone()))?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        if let Some(agent) = lookup(ENV_USER_AGENT).filter(|value| !value.trim().is_empty()) {
            config = config.with_user_agent(agent.trim());
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn insert_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.insert(key.into(), value.into());
        self
    }

    /// Parses the base URL and checks the extra headers.
    ///
    /// Extra headers may not use any identity header key.
    pub fn validate(&self) -> Result<Url, ConfigError> {
        if let Some(key) = self.extra_headers.keys().find(|key| is_identity_header(key)) {
            return Err(ConfigError::ReservedHeader(key.clone()));
        }
        parse_base_url(&self.base_url)
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::MissingBaseUrl);
    }
    let url = Url::parse(trimmed).map_err(|e| ConfigError::InvalidBaseUrl {
        url: trimmed.to_owned(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidBaseUrl {
            url: trimmed.to_owned(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(ConfigError::InvalidBaseUrl {
            url: trimmed.to_owned(),
            reason: "query and fragment are not allowed".to_owned(),
        });
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_http_and_https() {
        assert!(RestConfig::new("https://dev.develop.tapis.io").validate().is_ok());
        assert!(RestConfig::new("http://127.0.0.1:8080/").validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_urls() {
        assert!(matches!(RestConfig::new("").validate(), Err(ConfigError::MissingBaseUrl)));
        assert!(matches!(
            RestConfig::new("ftp://host").validate(),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            RestConfig::new("not a url").validate(),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            RestConfig::new("https://host?x=1").validate(),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn identity_headers_cannot_be_configured() {
        let config = RestConfig::new("https://host").insert_header("x-tapis-token", "leak");
        assert!(matches!(config.validate(), Err(ConfigError::ReservedHeader(key)) if key == "x-tapis-token"));
    }
}
