//! Username/password approval of request tokens.
//!
//! Instead of sending a human to the approval page, this approver validates
//! the request token directly with the attempt's credentials.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use reelpass_application::ports::{ApprovalRequest, Approver, Parameters, Transport};
use reelpass_domain::{ApprovalOutcome, AuthError, Endpoint};
use tracing::{info, warn};

/// Approver that validates the token with username and password.
pub struct LoginApprover<T: Transport> {
    transport: Arc<T>,
}

impl<T: Transport> LoginApprover<T> {
    /// Create an approver that calls the service through `transport`.
    #[must_use]
    pub const fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }

    async fn validate(&self, request: ApprovalRequest<'_>) -> Result<(), AuthError> {
        let parameters = Parameters::from([
            (
                "request_token".to_string(),
                request.request_token.as_str().to_string(),
            ),
            (
                "username".to_string(),
                request.credentials.username().to_string(),
            ),
            (
                "password".to_string(),
                request.credentials.password().to_string(),
            ),
        ]);
        let body = self
            .transport
            .call(Endpoint::ValidateWithLogin, &parameters)
            .await?;
        Endpoint::decode_validation(&body)
    }
}

impl<T: Transport> Approver for LoginApprover<T> {
    fn present_approval<'a>(
        &'a self,
        request: ApprovalRequest<'a>,
    ) -> Pin<Box<dyn Future<Output = ApprovalOutcome> + Send + 'a>> {
        Box::pin(async move {
            match self.validate(request).await {
                Ok(()) => {
                    info!(user = request.credentials.username(), "token validated with login");
                    ApprovalOutcome::Approved
                }
                Err(e) => {
                    warn!(error = %e, "login validation failed");
                    ApprovalOutcome::Cancelled
                }
            }
        })
    }
}
