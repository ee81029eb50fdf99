//! Layered settings loading.
//!
//! Built-in defaults come first, then an optional TOML file, then
//! `REELPASS_*` environment variables.

use std::collections::HashMap;
use std::path::Path;

use config::{Config, Environment, File, FileFormat};
use reelpass_domain::{AuthSettings, DomainError};
use thiserror::Error;
use tracing::debug;

/// Prefix of the environment variables read by the loader.
pub const ENV_PREFIX: &str = "REELPASS";

/// Errors raised while loading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A source could not be read or deserialized.
    #[error("failed to load settings: {0}")]
    Config(#[from] config::ConfigError),

    /// The merged settings are unusable.
    #[error("invalid settings: {0}")]
    Invalid(#[from] DomainError),
}

/// Load settings from `path` (if given) and the process environment.
///
/// # Errors
///
/// Returns an error if the file is missing or malformed, or if the merged
/// settings fail validation.
pub fn load_settings(path: Option<&Path>) -> Result<AuthSettings, SettingsError> {
    load_settings_from(path, Environment::with_prefix(ENV_PREFIX))
}

/// Load settings with an explicit environment source.
///
/// # Errors
///
/// See [`load_settings`].
pub fn load_settings_from(
    path: Option<&Path>,
    environment: Environment,
) -> Result<AuthSettings, SettingsError> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        debug!(path = %path.display(), "reading settings file");
        builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
    }
    let settings: AuthSettings = builder
        .add_source(environment.try_parsing(true))
        .build()?
        .try_deserialize()?;

    settings.validate()?;
    Ok(settings)
}

/// Environment source backed by a fixed map instead of the process.
#[must_use]
pub fn environment_from(vars: HashMap<String, String>) -> Environment {
    Environment::with_prefix(ENV_PREFIX).source(Some(vars))
}
