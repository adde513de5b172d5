//! Text formats for variable files and CLI output
//!
//! JSON output is stable: 2-space indentation, insertion-ordered keys and a
//! trailing newline, so rendered batches diff cleanly.

mod json;
mod yaml;

pub use json::{from_json, to_json_stable};
pub use yaml::{from_yaml, to_yaml};

/// Error type for serialization operations.
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    /// JSON serialization or parsing failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization or parsing failed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// UTF-8 encoding error.
    #[error("UTF-8 encoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
