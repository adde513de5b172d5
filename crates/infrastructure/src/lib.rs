//! Stencil Infrastructure - Adapters and implementations
//!
//! This crate provides the concrete pieces the application layer is
//! parameterised over: the built-in filter library, the system clock, and
//! loaders for settings and variable files.

pub mod adapters;
pub mod filters;
pub mod serialization;
pub mod settings;
pub mod variables;

use std::sync::Arc;

use stencil_application::Engine;
use stencil_domain::EngineSettings;

pub use adapters::SystemClock;
pub use filters::{DEFAULT_DATE_FORMAT, builtin_registry, format_timestamp, slugify};
pub use serialization::{SerializationError, from_json, from_yaml, to_json_stable, to_yaml};
pub use settings::{ENV_PREFIX, SettingsError, load_settings};
pub use variables::{VariablesError, load_variables};

/// Creates an engine with the built-in filters and the system clock.
#[must_use]
pub fn default_engine(settings: EngineSettings) -> Engine {
    Engine::new(
        Arc::new(builtin_registry()),
        settings,
        Arc::new(SystemClock::new()),
    )
}
