//! Dynamically typed template values
//!
//! Every variable in a scope, every filter argument and every filter result is
//! a [`Value`]. The set of shapes is closed so each consumer matches it
//! exhaustively.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::PathError;

/// A flat, insertion-ordered mapping from variable name to value.
///
/// Dotted names such as `app.name` are a single key; the dot carries no
/// lookup semantics.
pub type VariableMap = IndexMap<String, Value>;

/// A dynamically typed value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Absence of a value.
    #[default]
    Nil,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// A string.
    String(String),
    /// An ordered list of values.
    List(Vec<Value>),
    /// A nested name to value mapping.
    Map(VariableMap),
    /// A point in time, in UTC.
    Timestamp(DateTime<Utc>),
}

impl Value {
    /// Returns a short name for the value's shape, for error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Timestamp(_) => "timestamp",
        }
    }

    /// Returns true for [`Value::Nil`].
    #[must_use]
    pub const fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// Returns the string slice if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean if this is a bool.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer if this is an int.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns a numeric view of ints and floats.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the list items if this is a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the map if this is a map.
    #[must_use]
    pub const fn as_map(&self) -> Option<&VariableMap> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Whether the value counts as "set" in a boolean context.
    ///
    /// The string `"false"` is falsy because booleans are often rendered to
    /// text before they reach a condition.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Nil => false,
            Self::Bool(b) => *b,
            Self::Int(i) => *i > 0,
            Self::Float(f) => *f > 0.0,
            Self::String(s) => !s.is_empty() && s != "false",
            Self::List(items) => !items.is_empty(),
            Self::Map(map) => !map.is_empty(),
            Self::Timestamp(_) => true,
        }
    }

    /// Renders the value as template output text.
    ///
    /// Strings pass through, booleans become `true`/`false`, numbers their
    /// decimal form, nil the empty string, timestamps RFC 3339 and
    /// containers compact JSON.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Nil => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::String(s) => s.clone(),
            Self::Timestamp(t) => t.to_rfc3339_opts(SecondsFormat::Secs, true),
            Self::List(_) | Self::Map(_) => serde_json::to_string(self).unwrap_or_default(),
        }
    }

    /// Descends into nested lists and maps following `segments`.
    ///
    /// Map segments are keys; list segments must parse as a zero-based index.
    ///
    /// # Errors
    ///
    /// Returns a [`PathError`] naming the first segment that cannot be followed.
    pub fn lookup_path<S: AsRef<str>>(&self, segments: &[S]) -> Result<&Self, PathError> {
        let Some((head, rest)) = segments.split_first() else {
            return Ok(self);
        };
        let segment = head.as_ref();

        let next = match self {
            Self::Map(map) => map.get(segment).ok_or_else(|| PathError::KeyNotFound {
                segment: segment.to_string(),
            })?,
            Self::List(items) => {
                let index: usize = segment.parse().map_err(|_| PathError::InvalidIndex {
                    segment: segment.to_string(),
                })?;
                items.get(index).ok_or(PathError::IndexOutOfRange {
                    index,
                    len: items.len(),
                })?
            }
            other => {
                return Err(PathError::NotAContainer {
                    segment: segment.to_string(),
                    kind: other.type_name(),
                });
            }
        };

        next.lookup_path(rest)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

impl From<VariableMap> for Value {
    fn from(value: VariableMap) -> Self {
        Self::Map(value)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Nil, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Nil,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map_or_else(|| n.as_f64().map_or(Self::Nil, Self::Float), Self::Int),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Into::into).collect())
            }
            serde_json::Value::Object(map) => {
                Self::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}
