//! Reelpass Domain - Core session handshake types
//!
//! This crate defines the domain model for logging into TheMovieDB.
//! All types here are pure Rust with no I/O dependencies.

pub mod auth;
pub mod error;
pub mod settings;

pub use auth::{
    ApprovalOutcome, AuthError, AuthorizationPage, Credentials, Endpoint, FlowOutcome, FlowResult,
    FlowState, RequestToken, SessionId, UserId,
};
pub use error::{DomainError, DomainResult};
pub use settings::AuthSettings;
