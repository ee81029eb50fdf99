//! Reelpass Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus settings loading.

pub mod adapters;
pub mod auth;
pub mod settings;

pub use adapters::ReqwestTransport;
pub use auth::LoginApprover;
pub use settings::{ENV_PREFIX, SettingsError, environment_from, load_settings, load_settings_from};
