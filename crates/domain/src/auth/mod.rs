//! Session handshake domain types

mod authorization;
mod endpoint;
mod state;
mod types;

pub use authorization::AuthorizationPage;
pub use endpoint::Endpoint;
pub use state::{FlowOutcome, FlowState};
pub use types::{
    ApprovalOutcome, AuthError, Credentials, FlowResult, RequestToken, SessionId, UserId,
};
