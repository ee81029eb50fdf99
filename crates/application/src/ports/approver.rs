//! Interactive approval port

use std::future::Future;
use std::pin::Pin;

use reelpass_domain::{ApprovalOutcome, Credentials, RequestToken};

/// What the approver needs to show or act on.
#[derive(Debug, Clone, Copy)]
pub struct ApprovalRequest<'a> {
    /// Page where the request token is approved.
    pub authorization_url: &'a str,
    /// The token awaiting approval.
    pub request_token: &'a RequestToken,
    /// The credentials of the current attempt.
    pub credentials: &'a Credentials,
}

/// Port for the step where a human approves the request token.
///
/// The future may stay pending for as long as the human takes; there is no
/// built-in timeout.
pub trait Approver: Send + Sync {
    /// Present the approval page and resolve once the human is done.
    fn present_approval<'a>(
        &'a self,
        request: ApprovalRequest<'a>,
    ) -> Pin<Box<dyn Future<Output = ApprovalOutcome> + Send + 'a>>;
}
