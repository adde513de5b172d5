//! Engine settings loading
//!
//! Settings are layered with the `config` crate: built-in defaults, then an
//! optional YAML, JSON or TOML file, then `STENCIL_*` environment variables
//! (`STENCIL_STRICT_SYNTAX=true`).

use std::path::Path;

use config::{Config, Environment, File};
use stencil_domain::EngineSettings;
use tracing::debug;

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "STENCIL";

/// Error type for settings loading.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The settings file does not exist.
    #[error("Settings file not found: {0}")]
    NotFound(String),

    /// A source could not be read or the merged result has the wrong shape.
    #[error("Invalid settings: {0}")]
    Config(#[from] config::ConfigError),
}

/// Loads engine settings.
///
/// `path` is optional; without it only defaults and the environment apply.
/// The file format is chosen by extension.
///
/// # Errors
///
/// Returns an error if the file is missing or malformed, or a value has the
/// wrong type.
pub fn load_settings(path: Option<&Path>) -> Result<EngineSettings, SettingsError> {
    load_settings_with_env(path, Environment::with_prefix(ENV_PREFIX))
}

fn load_settings_with_env(
    path: Option<&Path>,
    environment: Environment,
) -> Result<EngineSettings, SettingsError> {
    let mut builder = Config::builder();

    if let Some(path) = path {
        if !path.is_file() {
            return Err(SettingsError::NotFound(path.display().to_string()));
        }
        debug!(path = %path.display(), "loading settings file");
        builder = builder.add_source(File::from(path));
    }

    let settings = builder
        .add_source(environment.try_parsing(true))
        .build()?
        .try_deserialize::<EngineSettings>()?;

    debug!(?settings, "engine settings loaded");
    Ok(settings)
}
