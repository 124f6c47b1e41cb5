//! In-memory [`ServiceTransport`] for tests.
//!
//! Available inside this crate's unit tests and, through the `testing`
//! feature, to other crates' test suites. Replies are served in the order they
//! were scripted; once the script is exhausted the optional responder answers,
//! and without one the call fails with a connect error.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::call::ApiCall;
use crate::envelope::ResponseEnvelope;
use crate::errors::TransportError;
use crate::identity::HeaderPair;
use crate::transport::{ServiceTransport, TransportResponse};

type Responder =
    Box<dyn Fn(&ApiCall, &[HeaderPair]) -> Result<TransportResponse, TransportError> + Send + Sync>;

/// One call as the transport saw it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub call: ApiCall,
    pub headers: Vec<HeaderPair>,
}

impl RecordedCall {
    /// Value of header `name`, if it was sent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Scripted transport that records every call it receives.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
    recorded: Mutex<Vec<RecordedCall>>,
    responder: Option<Responder>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport that answers every call with a success envelope whose
    /// `result` maps each received header name to its value.
    pub fn echo_identity() -> Self {
        Self::new().with_responder(|_, headers| {
            let seen: Map<String, Value> = headers
                .iter()
                .map(|(key, value)| ((*key).to_owned(), Value::String(value.clone())))
                .collect();
            Ok(TransportResponse::new(200, envelope_body(Value::Object(seen))))
        })
    }

    /// Queues a response with `status` and raw `body`.
    pub fn respond(self, status: u16, body: impl Into<String>) -> Self {
        self.respond_with(TransportResponse::new(status, body))
    }

    pub fn respond_with(self, response: TransportResponse) -> Self {
        self.push(Ok(response));
        self
    }

    /// Queues a transport failure.
    pub fn fail(self, error: TransportError) -> Self {
        self.push(Err(error));
        self
    }

    /// Answers calls after the script runs out.
    pub fn with_responder<F>(mut self, responder: F) -> Self
    where
        F: Fn(&ApiCall, &[HeaderPair]) -> Result<TransportResponse, TransportError> + Send + Sync + 'static,
    {
        self.responder = Some(Box::new(responder));
        self
    }

    /// Calls received so far, in arrival order.
    pub fn recorded(&self) -> Vec<RecordedCall> {
        self.recorded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn push(&self, reply: Result<TransportResponse, TransportError>) {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(reply);
    }
}

#[async_trait]
impl ServiceTransport for ScriptedTransport {
    async fn execute(
        &self,
        call: &ApiCall,
        headers: &[HeaderPair],
    ) -> Result<TransportResponse, TransportError> {
        self.recorded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedCall {
                call: call.clone(),
                headers: headers.to_vec(),
            });

        let scripted = self
            .replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        match (scripted, &self.responder) {
            (Some(reply), _) => reply,
            (None, Some(responder)) => responder(call, headers),
            (None, None) => Err(TransportError::Connect(format!(
                "no scripted reply for {}",
                call.operation()
            ))),
        }
    }
}

/// Serialised `"success"` envelope around `result`.
pub fn envelope_body(result: Value) -> String {
    let result = if result.is_null() { None } else { Some(result) };
    serde_json::to_string(&ResponseEnvelope::success("ok", "1.0.0", result))
        .unwrap_or_else(|_| String::from("{}"))
}

/// Serialised `"error"` envelope with `message`.
pub fn error_body(message: &str) -> String {
    let envelope = ResponseEnvelope {
        status: Some("error".to_owned()),
        message: Some(message.to_owned()),
        version: Some("1.0.0".to_owned()),
        result: None,
    };
    serde_json::to_string(&envelope).unwrap_or_else(|_| String::from("{}"))
}
