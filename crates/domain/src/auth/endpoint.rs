//! Service endpoints and their response schemas.
//!
//! Every response is a JSON object. A nonzero `status_code` marks a
//! service-side failure and comes with a `status_message`; otherwise the
//! endpoint-specific field carries the payload.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::types::{AuthError, RequestToken, SessionId, UserId};

/// Remote calls used by the login handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Issue a new request token.
    RequestTokenNew,
    /// Approve a request token with username and password.
    ValidateWithLogin,
    /// Exchange an approved request token for a session.
    SessionNew,
    /// Fetch the account behind a session.
    Account,
}

impl Endpoint {
    /// Path relative to the API base URL.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::RequestTokenNew => "/authentication/token/new",
            Self::ValidateWithLogin => "/authentication/token/validate_with_login",
            Self::SessionNew => "/authentication/session/new",
            Self::Account => "/account",
        }
    }

    /// Short name used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::RequestTokenNew => "token/new",
            Self::ValidateWithLogin => "token/validate_with_login",
            Self::SessionNew => "session/new",
            Self::Account => "account",
        }
    }

    /// Decode a `RequestTokenNew` response.
    ///
    /// # Errors
    ///
    /// `Parse`, `Remote` or `MissingField` depending on the body shape.
    pub fn decode_request_token(body: &Value) -> Result<RequestToken, AuthError> {
        let response: TokenResponse = decode(body)?;
        non_empty(response.request_token, "request_token").map(RequestToken::new)
    }

    /// Decode a `ValidateWithLogin` response; only the status matters.
    ///
    /// # Errors
    ///
    /// `Parse` or `Remote` depending on the body shape.
    pub fn decode_validation(body: &Value) -> Result<(), AuthError> {
        check_status(body)
    }

    /// Decode a `SessionNew` response.
    ///
    /// # Errors
    ///
    /// `Parse`, `Remote` or `MissingField` depending on the body shape.
    pub fn decode_session(body: &Value) -> Result<SessionId, AuthError> {
        let response: SessionResponse = decode(body)?;
        non_empty(response.session_id, "session_id").map(SessionId::new)
    }

    /// Decode an `Account` response.
    ///
    /// # Errors
    ///
    /// `Parse`, `Remote` or `MissingField` depending on the body shape.
    pub fn decode_account(body: &Value) -> Result<UserId, AuthError> {
        let response: AccountResponse = decode(body)?;
        response
            .id
            .map(UserId)
            .ok_or(AuthError::MissingField { field: "id" })
    }
}

#[derive(Debug, Deserialize)]
struct StatusEnvelope {
    #[serde(default)]
    status_code: Option<i64>,
    #[serde(default)]
    status_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    request_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    #[serde(default)]
    session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AccountResponse {
    #[serde(default)]
    id: Option<i64>,
}

fn check_status(body: &Value) -> Result<(), AuthError> {
    if !body.is_object() {
        return Err(AuthError::parse(format!(
            "expected a JSON object, got {}",
            kind_of(body)
        )));
    }
    let envelope: StatusEnvelope = serde_json::from_value(body.clone()).map_err(AuthError::parse)?;
    match envelope.status_code {
        Some(code) if code != 0 => Err(AuthError::Remote {
            code,
            message: envelope
                .status_message
                .unwrap_or_else(|| format!("Unknown error with code {code}")),
        }),
        _ => Ok(()),
    }
}

fn decode<T: DeserializeOwned>(body: &Value) -> Result<T, AuthError> {
    check_status(body)?;
    serde_json::from_value(body.clone()).map_err(AuthError::parse)
}

fn non_empty(value: Option<String>, field: &'static str) -> Result<String, AuthError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(AuthError::MissingField { field })
}

const fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
