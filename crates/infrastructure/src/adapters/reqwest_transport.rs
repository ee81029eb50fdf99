//! Transport implementation using reqwest.
//!
//! This adapter implements the `Transport` port against TheMovieDB REST API.
//! Every call is a GET with the parameters and the API key in the query
//! string, and the body is parsed as JSON.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reelpass_application::ports::{Parameters, Transport, TransportError};
use reelpass_domain::{AuthSettings, Endpoint};
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::debug;

/// Query parameter carrying the API key.
const API_KEY_PARAM: &str = "api_key";

/// Longest error body kept in `TransportError::Status`.
const MAX_ERROR_BODY: usize = 512;

/// Transport implementation using reqwest.
pub struct ReqwestTransport {
    client: Client,
    api_base_url: String,
    api_key: String,
    timeout_ms: u64,
}

impl ReqwestTransport {
    /// Creates a new transport from validated settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn new(settings: &AuthSettings) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(concat!("reelpass/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Ok(Self::with_client(client, settings))
    }

    /// Creates a new transport around a custom reqwest client.
    #[must_use]
    pub fn with_client(client: Client, settings: &AuthSettings) -> Self {
        Self {
            client,
            api_base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            timeout_ms: settings.timeout_ms,
        }
    }

    /// Builds the full request URL for `endpoint`.
    fn endpoint_url(&self, endpoint: Endpoint, parameters: &Parameters) -> Result<Url, TransportError> {
        let raw = format!("{}{}", self.api_base_url, endpoint.path());
        let mut url = Url::parse(&raw).map_err(|e| TransportError::InvalidUrl(format!("{e}: {raw}")))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair(API_KEY_PARAM, &self.api_key);
            for (name, value) in parameters {
                query.append_pair(name, value);
            }
        }
        Ok(url)
    }

    /// Maps reqwest errors to `TransportError`.
    ///
    /// The request URL is stripped first: its query holds the API key and,
    /// for login validation, the password.
    fn map_error(error: reqwest::Error, timeout_ms: u64) -> TransportError {
        if error.is_timeout() {
            return TransportError::Timeout { timeout_ms };
        }

        let host = error
            .url()
            .and_then(|u| u.host_str().map(ToString::to_string))
            .unwrap_or_else(|| "unknown".to_string());
        let error = error.without_url();

        if error.is_connect() {
            return TransportError::ConnectionFailed(format!("{host}: {error}"));
        }

        if error.is_builder() {
            return TransportError::InvalidUrl(error.to_string());
        }

        TransportError::Other(error.to_string())
    }

    /// Interprets a response body according to its HTTP status.
    ///
    /// Error statuses whose body carries an integer `status_code` are passed
    /// through so the service's own code and message reach the caller. Any
    /// other error body becomes `TransportError::Status`.
    fn interpret(status: u16, body: &[u8]) -> Result<Value, TransportError> {
        let parsed = serde_json::from_slice::<Value>(body);
        if (200..300).contains(&status) {
            return parsed.map_err(|e| TransportError::InvalidBody(e.to_string()));
        }
        match parsed {
            Ok(value) if value.get("status_code").is_some_and(Value::is_i64) => Ok(value),
            _ => {
                let text = String::from_utf8_lossy(body);
                let body = text.chars().take(MAX_ERROR_BODY).collect();
                Err(TransportError::Status { status, body })
            }
        }
    }
}

impl Transport for ReqwestTransport {
    fn call<'a>(
        &'a self,
        endpoint: Endpoint,
        parameters: &'a Parameters,
    ) -> Pin<Box<dyn Future<Output = Result<Value, TransportError>> + Send + 'a>> {
        Box::pin(async move {
            let url = self.endpoint_url(endpoint, parameters)?;
            debug!(endpoint = endpoint.name(), "sending request");

            let response = self
                .client
                .get(url)
                .header("Accept", "application/json")
                .send()
                .await
                .map_err(|e| Self::map_error(e, self.timeout_ms))?;

            let status = response.status().as_u16();
            let body = response
                .bytes()
                .await
                .map_err(|e| {
                    TransportError::Other(format!("Failed to read body: {}", e.without_url()))
                })?;

            debug!(endpoint = endpoint.name(), status, bytes = body.len(), "response received");
            Self::interpret(status, &body)
        })
    }
}
