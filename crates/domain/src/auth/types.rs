//! Credential, token and result types for one login attempt.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{DomainError, DomainResult};

/// Username and password supplied by the caller for one attempt.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Create credentials, rejecting an empty username or password.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::EmptyCredentials` if either value is blank.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> DomainResult<Self> {
        let username = username.into();
        let password = password.into();
        if username.trim().is_empty() || password.trim().is_empty() {
            return Err(DomainError::EmptyCredentials);
        }
        Ok(Self { username, password })
    }

    /// The account username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The account password.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Characters of a secret kept in log previews.
const PREVIEW_CHARS: usize = 4;

fn preview(value: &str) -> String {
    let head: String = value.chars().take(PREVIEW_CHARS).collect();
    format!("{head}...")
}

/// Short-lived token issued by the service, exchanged for a session once approved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestToken(String);

impl RequestToken {
    /// Wrap a raw token string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First few characters, safe for logs.
    #[must_use]
    pub fn preview(&self) -> String {
        preview(&self.0)
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Authenticated session credential handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Wrap a raw session id.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw session id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First few characters, safe for logs.
    #[must_use]
    pub fn preview(&self) -> String {
        preview(&self.0)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Numeric account identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How the human (or a programmatic stand-in) resolved the approval step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalOutcome {
    /// The request token was approved.
    Approved,
    /// Approval was refused, cancelled or failed.
    Cancelled,
}

/// Failures a login attempt can end with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Network or I/O failure reported by the transport.
    #[error("transport error: {message}")]
    Transport {
        /// Error description.
        message: String,
    },
    /// The response body could not be interpreted.
    #[error("malformed response: {message}")]
    Parse {
        /// Error description.
        message: String,
    },
    /// The service answered with a nonzero status code.
    #[error("service error {code}: {message}")]
    Remote {
        /// Service status code.
        code: i64,
        /// Service status message.
        message: String,
    },
    /// A required field is absent from an otherwise well-formed response.
    #[error("missing field `{field}` in response")]
    MissingField {
        /// Name of the absent field.
        field: &'static str,
    },
    /// The human rejected or cancelled the approval.
    #[error("authorization declined")]
    AuthorizationDeclined,
}

impl AuthError {
    /// Build a transport error from any displayable cause.
    pub fn transport(cause: impl fmt::Display) -> Self {
        Self::Transport {
            message: cause.to_string(),
        }
    }

    /// Build a parse error from any displayable cause.
    pub fn parse(cause: impl fmt::Display) -> Self {
        Self::Parse {
            message: cause.to_string(),
        }
    }
}

/// Terminal outcome of one login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowResult {
    /// A session was established.
    Success {
        /// The new session.
        session_id: SessionId,
        /// The account id, when the account lookup returned one.
        user_id: Option<UserId>,
    },
    /// The attempt failed.
    Failure {
        /// Why it failed.
        reason: AuthError,
    },
}

impl FlowResult {
    /// Returns true for `Success`.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The session id on success.
    #[must_use]
    pub const fn session_id(&self) -> Option<&SessionId> {
        match self {
            Self::Success { session_id, .. } => Some(session_id),
            Self::Failure { .. } => None,
        }
    }

    /// The account id on success, if resolved.
    #[must_use]
    pub const fn user_id(&self) -> Option<UserId> {
        match self {
            Self::Success { user_id, .. } => *user_id,
            Self::Failure { .. } => None,
        }
    }

    /// The failure reason, if any.
    #[must_use]
    pub const fn reason(&self) -> Option<&AuthError> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { reason } => Some(reason),
        }
    }
}

impl From<AuthError> for FlowResult {
    fn from(reason: AuthError) -> Self {
        Self::Failure { reason }
    }
}
