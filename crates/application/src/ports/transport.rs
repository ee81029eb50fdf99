//! Transport port

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

use reelpass_domain::{AuthError, Endpoint};
use serde_json::Value;
use thiserror::Error;

/// Query parameters for a call, in stable order.
pub type Parameters = BTreeMap<String, String>;

/// Errors that can occur while talking to the service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request timed out.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout {
        /// The configured timeout.
        timeout_ms: u64,
    },

    /// Could not connect to the server.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The request URL could not be built.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The server answered with an error status and a non-JSON body.
    #[error("HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// The response body is not JSON.
    #[error("invalid response body: {0}")]
    InvalidBody(String),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl From<TransportError> for AuthError {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::InvalidBody(message) => Self::Parse { message },
            other => Self::transport(other),
        }
    }
}

/// Port for calling the remote service.
///
/// Implementations perform one request per call and never retry.
pub trait Transport: Send + Sync {
    /// Call `endpoint` with `parameters` and return the parsed JSON body.
    ///
    /// # Errors
    ///
    /// Returns a `TransportError` if the request cannot be completed or the
    /// body is not JSON.
    fn call<'a>(
        &'a self,
        endpoint: Endpoint,
        parameters: &'a Parameters,
    ) -> Pin<Box<dyn Future<Output = Result<Value, TransportError>> + Send + 'a>>;
}
