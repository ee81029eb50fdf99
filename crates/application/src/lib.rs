//! Reelpass Application - Use cases and ports
//!
//! This crate defines the application layer with:
//! - Port traits (interfaces for the transport and the approval step)
//! - The login handshake use case

pub mod auth;
pub mod ports;

pub use auth::AuthenticationFlow;
pub use ports::{
    ApprovalRequest, Approver, CancellationReceiver, CancellationToken, Parameters, Transport,
    TransportError,
};
