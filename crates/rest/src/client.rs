//! The `reqwest`-backed [`ServiceTransport`] implementation.

use async_trait::async_trait;
use reqwest::{Client, Method, Url};
use tracing::{debug, trace, warn};

use protocol::{ApiCall, CallInvoker, HeaderPair, HttpMethod, ServiceTransport, TransportError, TransportResponse};

use crate::config::RestConfig;
use crate::error::ConfigError;
use crate::headers::{call_headers, default_headers};

/// [`ServiceTransport`] over a shared `reqwest` client.
///
/// The underlying client carries only configuration-level default headers;
/// identity headers are attached to each request individually, so one
/// transport can serve many identities at once.
#[derive(Debug, Clone)]
pub struct RestTransport {
    http: Client,
    config: RestConfig,
    base_url: Url,
}

impl RestTransport {
    pub fn new(config: RestConfig) -> Result<Self, ConfigError> {
        let base_url = config.validate()?;
        let mut builder = Client::builder().default_headers(default_headers(&config)?);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        let http = builder.build()?;
        Ok(Self {
            http,
            config,
            base_url,
        })
    }

    /// Builds a [`CallInvoker`] backed by a new transport.
    pub fn invoker(config: RestConfig) -> Result<CallInvoker, ConfigError> {
        Ok(CallInvoker::from_transport(Self::new(config)?))
    }

    pub fn config(&self) -> &RestConfig {
        &self.config
    }

    /// Absolute URL for `call`, without its query string.
    ///
    /// Appended segments are percent-encoded one by one; `.` and `..` are
    /// refused rather than resolved.
    pub fn endpoint(&self, call: &ApiCall) -> Result<Url, TransportError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let route = call.base_path();
        let joined = if route.starts_with('/') {
            format!("{base}{route}")
        } else {
            format!("{base}/{route}")
        };
        let mut url = Url::parse(&joined)
            .map_err(|e| TransportError::InvalidRequest(format!("invalid endpoint '{joined}': {e}")))?;

        let segments = call.path_segments();
        if let Some(dot) = segments.iter().find(|s| matches!(s.as_str(), "." | "..")) {
            return Err(TransportError::InvalidRequest(format!(
                "path segment '{dot}' is not allowed"
            )));
        }
        if !segments.is_empty() {
            url.path_segments_mut()
                .map_err(|()| TransportError::InvalidRequest(format!("invalid endpoint '{joined}'")))?
                .pop_if_empty()
                .extend(segments);
        }
        Ok(url)
    }

    /// Builds the request for `call` with this call's identity headers.
    pub fn build_request(
        &self,
        call: &ApiCall,
        headers: &[HeaderPair],
    ) -> Result<reqwest::RequestBuilder, TransportError> {
        let mut request = self
            .http
            .request(method(call.method()), self.endpoint(call)?)
            .headers(call_headers(headers)?);
        if !call.query_pairs().is_empty() {
            request = request.query(call.query_pairs());
        }
        if let Some(body) = call.body() {
            request = request.json(body);
        }
        Ok(request)
    }
}

#[async_trait]
impl ServiceTransport for RestTransport {
    async fn execute(
        &self,
        call: &ApiCall,
        headers: &[HeaderPair],
    ) -> Result<TransportResponse, TransportError> {
        let request = self.build_request(call, headers)?;
        trace!(operation = call.operation(), "sending request");

        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let success = response.status().is_success();
        let body = match response.text().await {
            Ok(body) => body,
            // The status line already arrived; a failed body read keeps it.
            Err(error) if !success => {
                warn!(operation = call.operation(), status, %error, "failed to read error body");
                String::new()
            }
            Err(error) => return Err(map_reqwest_error(error)),
        };
        debug!(operation = call.operation(), status, body_len = body.len(), "response received");

        Ok(TransportResponse { status, body })
    }
}

fn method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

fn map_reqwest_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout(error.to_string())
    } else if error.is_builder() {
        TransportError::InvalidRequest(error.to_string())
    } else {
        TransportError::Connect(error.to_string())
    }
}
