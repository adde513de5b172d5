//! Built-in filter library
//!
//! Every filter is a plain function `(value, args) -> FilterResult`. A nil
//! input to a filter that needs a value yields
//! [`FilterError::AllowsDefault`], so `{{ missing | trim | default:'x' }}`
//! falls through to the fallback.

mod collections;
mod convert;
mod date;
mod fallback;
mod logic;
mod text;

use stencil_application::FilterRegistry;
use stencil_domain::{FilterError, Value};

pub use date::{DEFAULT_DATE_FORMAT, format_timestamp};
pub use text::slugify;

/// Builds the registry of built-in filters.
#[must_use]
pub fn builtin_registry() -> FilterRegistry {
    FilterRegistry::builder()
        // text
        .filter("trim", text::trim)
        .filter("shorten", text::shorten)
        .filter("length", text::length)
        .filter("lines", text::lines)
        .filter("join", text::join)
        .filter("split", text::split)
        .filter("concat", text::concat)
        .filter("slug", text::slug)
        .filter("title", text::title)
        .filter("upper", text::upper)
        .filter("lower", text::lower)
        // collections
        .filter("first", collections::first)
        .filter("key", collections::key)
        .filter("find", collections::find)
        .filter("wrap", collections::wrap)
        .filter("map", collections::map)
        // conversion
        .filter("json", convert::json)
        .filter("yaml", convert::yaml)
        .filter("from", convert::from)
        // logic
        .filter("eq", logic::eq)
        .filter("gt", logic::gt)
        .filter("not", logic::not)
        // dates
        .filter("format", date::format)
        .fallback("default", fallback::default)
        .build()
}

/// Returns the positional argument at `index`.
fn arg(args: &[Value], index: usize) -> Result<&Value, FilterError> {
    args.get(index).ok_or(FilterError::MissingArgument(index))
}

/// Returns the positional argument at `index` as a string.
fn arg_str(args: &[Value], index: usize) -> Result<&str, FilterError> {
    let value = arg(args, index)?;
    value.as_str().ok_or_else(|| {
        FilterError::invalid_argument(index, format!("expected string, got {}", value.type_name()))
    })
}

/// Returns the positional argument at `index` as an integer, accepting
/// numeric strings.
fn arg_int(args: &[Value], index: usize) -> Result<i64, FilterError> {
    match arg(args, index)? {
        Value::Int(i) => Ok(*i),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| FilterError::invalid_argument(index, format!("'{s}' is not an integer"))),
        other => Err(FilterError::invalid_argument(
            index,
            format!("expected integer, got {}", other.type_name()),
        )),
    }
}

/// Returns the piped value as a string.
fn value_str(value: &Value) -> Result<&str, FilterError> {
    match value {
        Value::String(s) => Ok(s),
        Value::Nil => Err(nil_value()),
        other => Err(FilterError::invalid_value("string", other.type_name())),
    }
}

/// The error for a nil input, which a fallback filter may cover.
fn nil_value() -> FilterError {
    FilterError::AllowsDefault("value is nil".to_string())
}
