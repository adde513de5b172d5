//! YAML helpers.

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::SerializationError;

/// Serializes a value to YAML.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_yaml<T: Serialize>(value: &T) -> Result<String, SerializationError> {
    Ok(serde_yaml::to_string(value)?)
}

/// Deserializes YAML from a string.
///
/// # Errors
///
/// Returns an error if the YAML is invalid or doesn't match the expected type.
pub fn from_yaml<T: DeserializeOwned>(yaml: &str) -> Result<T, SerializationError> {
    Ok(serde_yaml::from_str(yaml)?)
}
