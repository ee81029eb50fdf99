//! Approval page URLs.

use url::Url;

use super::types::RequestToken;
use crate::error::{DomainError, DomainResult};

/// Root of the page where a human approves a request token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationPage {
    base: Url,
}

impl AuthorizationPage {
    /// Parse and check the page root.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidUrl` unless `base` is an http(s) URL that can carry a path.
    pub fn parse(base: &str) -> DomainResult<Self> {
        let url = Url::parse(base).map_err(|e| DomainError::InvalidUrl(format!("{e}: {base}")))?;
        if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
            return Err(DomainError::InvalidUrl(format!(
                "not an http(s) page URL: {base}"
            )));
        }
        Ok(Self { base: url })
    }

    /// URL for approving `token`; the token becomes the last path segment.
    #[must_use]
    pub fn url_for(&self, token: &RequestToken) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(token.as_str());
        }
        url
    }

    /// The page root.
    #[must_use]
    pub const fn base(&self) -> &Url {
        &self.base
    }
}
