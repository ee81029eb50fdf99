//! Service settings for the login handshake.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::auth::AuthorizationPage;
use crate::error::{DomainError, DomainResult};

/// Default REST API root.
pub const DEFAULT_API_BASE_URL: &str = "https://api.themoviedb.org/3";

/// Default page where a human approves a request token.
pub const DEFAULT_AUTHORIZATION_BASE_URL: &str = "https://www.themoviedb.org/authenticate/";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Where and how to reach the service.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// REST API root; endpoint paths are appended to it.
    pub api_base_url: String,
    /// Approval page root; the request token is appended to it.
    pub authorization_base_url: String,
    /// API key sent with every call.
    pub api_key: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            authorization_base_url: DEFAULT_AUTHORIZATION_BASE_URL.to_string(),
            api_key: String::new(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("api_base_url", &self.api_base_url)
            .field("authorization_base_url", &self.authorization_base_url)
            .field("api_key", &if self.api_key.is_empty() { "" } else { "<redacted>" })
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl AuthSettings {
    /// Create settings with the default URLs and the given API key.
    #[must_use]
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Parse the approval page root.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidUrl` if the URL is unusable.
    pub fn authorization_page(&self) -> DomainResult<AuthorizationPage> {
        AuthorizationPage::parse(&self.authorization_base_url)
    }

    /// Check that both URLs parse and an API key is present.
    ///
    /// # Errors
    ///
    /// Returns `InvalidUrl` or `MissingSetting` for the first problem found.
    pub fn validate(&self) -> DomainResult<()> {
        let url = &self.api_base_url;
        let parsed = Url::parse(url).map_err(|e| DomainError::InvalidUrl(format!("{e}: {url}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(DomainError::InvalidUrl(format!(
                "URL must start with http:// or https://: {url}"
            )));
        }
        self.authorization_page()?;
        if self.api_key.trim().is_empty() {
            return Err(DomainError::MissingSetting("api_key"));
        }
        if self.timeout_ms == 0 {
            return Err(DomainError::MissingSetting("timeout_ms"));
        }
        Ok(())
    }
}
