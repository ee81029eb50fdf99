//! Login handshake use case.
//!
//! A login attempt runs four stages in strict order, each one fed by the
//! previous stage's output:
//!
//! 1. request a new token
//! 2. have the human approve it
//! 3. exchange the approved token for a session
//! 4. look up the account id for the session
//!
//! The first failure ends the attempt. A missing account id in stage 4 is the
//! one exception: the attempt still succeeds without a user id.

use std::sync::Arc;

use reelpass_domain::{
    ApprovalOutcome, AuthError, AuthorizationPage, Credentials, Endpoint, FlowOutcome, FlowResult,
    FlowState, RequestToken, SessionId, UserId,
};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::ports::{
    ApprovalRequest, Approver, CancellationReceiver, Parameters, Transport,
};

/// Parameter carrying the request token.
const REQUEST_TOKEN_PARAM: &str = "request_token";

/// Parameter carrying the session id.
const SESSION_ID_PARAM: &str = "session_id";

/// Use case for establishing an authenticated session.
///
/// The flow itself holds no per-attempt state, so one instance can serve
/// any number of attempts; each attempt owns its own token and session.
///
/// # Example
///
/// ```ignore
/// let flow = Arc::new(AuthenticationFlow::new(transport, approver, page));
/// let (cancel, receiver) = CancellationToken::new();
/// flow.authenticate(credentials, receiver, |result| println!("{result:?}"));
/// ```
pub struct AuthenticationFlow<T: Transport, A: Approver> {
    transport: Arc<T>,
    approver: Arc<A>,
    page: AuthorizationPage,
    progress: Option<mpsc::UnboundedSender<FlowState>>,
}

impl<T: Transport, A: Approver> AuthenticationFlow<T, A> {
    /// Creates a new flow over the given transport and approver.
    #[must_use]
    pub const fn new(transport: Arc<T>, approver: Arc<A>, page: AuthorizationPage) -> Self {
        Self {
            transport,
            approver,
            page,
            progress: None,
        }
    }

    /// Publish every state transition to `sender`.
    #[must_use]
    pub fn with_progress(mut self, sender: mpsc::UnboundedSender<FlowState>) -> Self {
        self.progress = Some(sender);
        self
    }

    /// Runs one login attempt to completion.
    pub async fn run(&self, credentials: &Credentials) -> FlowResult {
        let mut tracker = StateTracker::new(self.progress.clone());

        let result = match self.pipeline(credentials, &mut tracker).await {
            Ok(result) => result,
            Err(reason) => {
                warn!(error = %reason, "login failed");
                FlowResult::Failure { reason }
            }
        };

        let outcome = if result.is_success() {
            FlowOutcome::Success
        } else {
            FlowOutcome::Failure
        };
        tracker.advance(FlowState::Completed(outcome));
        result
    }

    /// Runs one login attempt unless the host cancels it first.
    ///
    /// Returns `None` when cancelled. Whatever stage was in flight is
    /// dropped along with any result it would have produced.
    pub async fn run_with_cancellation(
        &self,
        credentials: &Credentials,
        mut cancel: CancellationReceiver,
    ) -> Option<FlowResult> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                info!("login cancelled by host");
                None
            }
            result = self.run(credentials) => Some(result),
        }
    }

    /// Starts a login attempt in the background.
    ///
    /// `on_complete` runs exactly once with the result, or never if the
    /// attempt is cancelled through `cancel`.
    pub fn authenticate<F>(
        self: Arc<Self>,
        credentials: Credentials,
        cancel: CancellationReceiver,
        on_complete: F,
    ) -> JoinHandle<()>
    where
        T: 'static,
        A: 'static,
        F: FnOnce(FlowResult) + Send + 'static,
    {
        tokio::spawn(async move {
            if let Some(result) = self.run_with_cancellation(&credentials, cancel).await {
                on_complete(result);
            }
        })
    }

    async fn pipeline(
        &self,
        credentials: &Credentials,
        tracker: &mut StateTracker,
    ) -> Result<FlowResult, AuthError> {
        tracker.advance(FlowState::TokenRequested);
        let token = self.request_token().await?;

        let authorization_url = self.page.url_for(&token).to_string();
        tracker.advance(FlowState::AwaitingApproval {
            authorization_url: authorization_url.clone(),
        });
        self.await_approval(&authorization_url, &token, credentials)
            .await?;

        tracker.advance(FlowState::SessionRequested);
        let session_id = self.create_session(&token).await?;

        tracker.advance(FlowState::UserRequested);
        let user_id = match self.resolve_user(&session_id).await {
            Ok(user_id) => Some(user_id),
            Err(AuthError::MissingField { field }) => {
                warn!(field, "account response has no id, continuing without it");
                None
            }
            Err(e) => return Err(e),
        };

        info!(
            session = %session_id.preview(),
            user_id = ?user_id.map(|id| id.0),
            "login complete"
        );
        Ok(FlowResult::Success {
            session_id,
            user_id,
        })
    }

    async fn request_token(&self) -> Result<RequestToken, AuthError> {
        let body = self.call(Endpoint::RequestTokenNew, Parameters::new()).await?;
        let token = Endpoint::decode_request_token(&body)?;
        info!(token = %token.preview(), "request token issued");
        Ok(token)
    }

    async fn await_approval(
        &self,
        authorization_url: &str,
        token: &RequestToken,
        credentials: &Credentials,
    ) -> Result<(), AuthError> {
        debug!(token = %token.preview(), "waiting for approval");
        let request = ApprovalRequest {
            authorization_url,
            request_token: token,
            credentials,
        };
        match self.approver.present_approval(request).await {
            ApprovalOutcome::Approved => {
                info!("request token approved");
                Ok(())
            }
            ApprovalOutcome::Cancelled => Err(AuthError::AuthorizationDeclined),
        }
    }

    async fn create_session(&self, token: &RequestToken) -> Result<SessionId, AuthError> {
        let parameters = Parameters::from([(
            REQUEST_TOKEN_PARAM.to_string(),
            token.as_str().to_string(),
        )]);
        let body = self.call(Endpoint::SessionNew, parameters).await?;
        let session_id = Endpoint::decode_session(&body)?;
        info!(session = %session_id.preview(), "session created");
        Ok(session_id)
    }

    async fn resolve_user(&self, session_id: &SessionId) -> Result<UserId, AuthError> {
        let parameters = Parameters::from([(
            SESSION_ID_PARAM.to_string(),
            session_id.as_str().to_string(),
        )]);
        let body = self.call(Endpoint::Account, parameters).await?;
        Endpoint::decode_account(&body)
    }

    async fn call(&self, endpoint: Endpoint, parameters: Parameters) -> Result<Value, AuthError> {
        debug!(endpoint = endpoint.name(), "calling service");
        self.transport
            .call(endpoint, &parameters)
            .await
            .map_err(AuthError::from)
    }
}

/// Tracks the state of one attempt and publishes transitions.
struct StateTracker {
    state: FlowState,
    progress: Option<mpsc::UnboundedSender<FlowState>>,
}

impl StateTracker {
    const fn new(progress: Option<mpsc::UnboundedSender<FlowState>>) -> Self {
        Self {
            state: FlowState::Idle,
            progress,
        }
    }

    fn advance(&mut self, next: FlowState) {
        debug_assert!(
            self.state.can_advance_to(&next),
            "illegal transition {:?} -> {:?}",
            self.state,
            next
        );
        debug!(from = ?self.state, to = ?next, "flow state");
        if let Some(progress) = &self.progress {
            // A closed channel only means nobody is watching.
            let _ = progress.send(next.clone());
        }
        self.state = next;
    }
}
