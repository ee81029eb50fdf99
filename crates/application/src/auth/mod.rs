//! Login handshake for TheMovieDB.
//!
//! This module provides:
//! - The `AuthenticationFlow` use case that drives token, approval, session and account stages
//! - Cancellation and progress reporting for in-flight attempts

mod flow;

pub use flow::AuthenticationFlow;
