//! The `default` filter

use stencil_domain::{FilterResult, Value};

use super::arg;

/// `default:x`: replaces a nil or empty string with `x`.
pub fn default(value: &Value, args: &[Value]) -> FilterResult {
    let fallback = arg(args, 0)?;
    Ok(match value {
        Value::Nil => fallback.clone(),
        Value::String(s) if s.is_empty() => fallback.clone(),
        other => other.clone(),
    })
}
