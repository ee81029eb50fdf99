//! Login attempt state machine.

/// How a completed attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowOutcome {
    /// A session was established.
    Success,
    /// The attempt failed or approval was declined.
    Failure,
}

/// Progress of a single login attempt.
///
/// States only move forward:
/// `Idle -> TokenRequested -> AwaitingApproval -> SessionRequested -> UserRequested -> Completed`.
/// Any in-progress state may jump straight to `Completed(Failure)`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FlowState {
    /// Not started.
    #[default]
    Idle,
    /// Waiting for a new request token.
    TokenRequested,
    /// Waiting for the human to approve the token.
    AwaitingApproval {
        /// The URL handed to the approver.
        authorization_url: String,
    },
    /// Exchanging the approved token for a session.
    SessionRequested,
    /// Looking up the account id.
    UserRequested,
    /// Terminal state.
    Completed(FlowOutcome),
}

impl FlowState {
    const fn rank(&self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::TokenRequested => 1,
            Self::AwaitingApproval { .. } => 2,
            Self::SessionRequested => 3,
            Self::UserRequested => 4,
            Self::Completed(_) => 5,
        }
    }

    /// Check whether moving to `next` is a legal transition.
    #[must_use]
    pub const fn can_advance_to(&self, next: &Self) -> bool {
        match (self, next) {
            (Self::Completed(_), _) => false,
            (Self::Idle, Self::Completed(_)) => false,
            (_, Self::Completed(FlowOutcome::Failure)) => true,
            (Self::UserRequested, Self::Completed(FlowOutcome::Success)) => true,
            (_, Self::Completed(FlowOutcome::Success)) => false,
            _ => next.rank() == self.rank() + 1,
        }
    }

    /// Check if the attempt is in progress.
    #[must_use]
    pub const fn is_in_progress(&self) -> bool {
        !matches!(self, Self::Idle | Self::Completed(_))
    }

    /// Check if the attempt completed (success or failure).
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// Get a user-friendly status line.
    #[must_use]
    pub const fn message(&self) -> &str {
        match self {
            Self::Idle => "Ready to log in",
            Self::TokenRequested => "Requesting token...",
            Self::AwaitingApproval { .. } => "Waiting for approval in browser...",
            Self::SessionRequested => "Creating session...",
            Self::UserRequested => "Fetching account...",
            Self::Completed(FlowOutcome::Success) => "Login successful",
            Self::Completed(FlowOutcome::Failure) => "Login failed",
        }
    }
}
