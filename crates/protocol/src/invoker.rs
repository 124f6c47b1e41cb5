//! The call invoker: one request/response cycle, classified and normalised.
//!
//! ```text
//! ApiCall + IdentityContext
//!     │  headers built per call
//!     ▼
//! ServiceTransport::execute ──Err──────────────► ClientError (code -1)
//!     │ Ok(TransportResponse)
//!     ├─ non-2xx ──► TransportError::Status ───► ClientError (code = status)
//!     ▼ 2xx
//! ResponseEnvelope::from_body ──Err(Decode)────► ClientError (code -1)
//!     │ Option<ResponseEnvelope>
//!     ▼
//! ResultPolicy::apply ─────────────────────────► façade return value
//! ```

use std::sync::Arc;

use tracing::{debug, info_span, warn, Instrument};

use crate::call::ApiCall;
use crate::envelope::ResponseEnvelope;
use crate::errors::{ClientError, TransportError};
use crate::identifiers::CallId;
use crate::identity::IdentityContext;
use crate::policy::ResultPolicy;
use crate::transport::ServiceTransport;

/// Shared entry point for every façade call.
///
/// Cheap to clone; clones share the transport. The invoker holds no identity,
/// so one instance may serve any number of identities concurrently.
#[derive(Clone)]
pub struct CallInvoker {
    transport: Arc<dyn ServiceTransport>,
}

impl std::fmt::Debug for CallInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallInvoker").finish_non_exhaustive()
    }
}

impl CallInvoker {
    pub fn new(transport: Arc<dyn ServiceTransport>) -> Self {
        Self { transport }
    }

    /// Wraps a concrete transport.
    pub fn from_transport<T: ServiceTransport + 'static>(transport: T) -> Self {
        Self::new(Arc::new(transport))
    }

    /// Performs one request/response cycle and returns the envelope.
    ///
    /// `Ok(None)` means the call succeeded with an empty body. Every failure
    /// is returned as a [`ClientError`]; no retries are attempted.
    pub async fn invoke(
        &self,
        call: &ApiCall,
        identity: &IdentityContext,
    ) -> Result<Option<ResponseEnvelope>, ClientError> {
        let call_id = CallId::new_random();
        let span = info_span!(
            "service_call",
            operation = call.operation(),
            method = call.method().as_str(),
            path = %call.path(),
            %call_id,
            impersonating = identity.impersonation().is_some(),
        );

        async move {
            let headers = identity.headers();
            let response = self
                .transport
                .execute(call, &headers)
                .await
                .map_err(failed)?;

            if !response.is_success() {
                return Err(failed(TransportError::Status {
                    status: response.status,
                    body: response.body,
                }));
            }

            let envelope = ResponseEnvelope::from_body(&response.body).map_err(failed)?;
            debug!(
                http_status = response.status,
                envelope_status = envelope.as_ref().and_then(|e| e.status.as_deref()),
                has_result = envelope.as_ref().and_then(ResponseEnvelope::result).is_some(),
                "call succeeded"
            );
            Ok(envelope)
        }
        .instrument(span)
        .await
    }

    /// Performs one call and applies the result policy `P`.
    pub async fn call<P: ResultPolicy>(
        &self,
        call: &ApiCall,
        identity: &IdentityContext,
    ) -> Result<P::Output, ClientError> {
        let envelope = self.invoke(call, identity).await?;
        P::apply(envelope)
    }
}

fn failed(cause: TransportError) -> ClientError {
    let error = ClientError::normalize(cause);
    warn!(code = error.code(), message = error.message(), "call failed");
    error
}
