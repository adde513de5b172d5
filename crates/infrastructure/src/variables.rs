//! Variable file loading
//!
//! Reads a flat variable bag from a YAML (`.yaml`, `.yml`) or JSON (`.json`)
//! file. Nested mappings become [`Value::Map`](stencil_domain::Value::Map).

use std::fs;
use std::path::Path;

use stencil_domain::VariableMap;
use tracing::debug;

use crate::serialization::{SerializationError, from_json, from_yaml};

/// Error type for variable file loading.
#[derive(Debug, thiserror::Error)]
pub enum VariablesError {
    /// IO error while reading the file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file contents could not be parsed.
    #[error("Failed to parse {path}: {source}")]
    Parse {
        /// The offending file.
        path: String,
        /// The parse error.
        #[source]
        source: SerializationError,
    },

    /// The extension names no supported format.
    #[error("Unsupported variable file '{0}', expected .yaml, .yml or .json")]
    UnsupportedFormat(String),
}

/// Loads a variable bag from `path`.
///
/// An empty YAML file yields an empty map.
///
/// # Errors
///
/// Returns an error if the file cannot be read, its extension is unknown or
/// its contents are not a mapping.
pub fn load_variables(path: &Path) -> Result<VariableMap, VariablesError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let parse: fn(&str) -> Result<VariableMap, SerializationError> = match extension.as_deref() {
        Some("yaml" | "yml") => parse_yaml,
        Some("json") => from_json,
        _ => return Err(VariablesError::UnsupportedFormat(path.display().to_string())),
    };

    let content = fs::read_to_string(path)?;
    let variables = parse(&content).map_err(|source| VariablesError::Parse {
        path: path.display().to_string(),
        source,
    })?;

    debug!(path = %path.display(), count = variables.len(), "variables loaded");
    Ok(variables)
}

fn parse_yaml(content: &str) -> Result<VariableMap, SerializationError> {
    if content.trim().is_empty() {
        return Ok(VariableMap::new());
    }
    from_yaml(content)
}
