//! Comparison and boolean filters

use stencil_domain::{FilterError, FilterResult, Value};

use super::arg;

/// `eq:x`: numeric comparison when both sides are numbers, otherwise plain
/// equality.
pub fn eq(value: &Value, args: &[Value]) -> FilterResult {
    let other = arg(args, 0)?;
    let equal = match (number(value), number(other)) {
        (Some(a), Some(b)) => (a - b).abs() < f64::EPSILON,
        _ => value == other,
    };
    Ok(Value::Bool(equal))
}

/// `gt:x`: true if the value is greater than `x`. Numeric strings count as
/// numbers.
pub fn gt(value: &Value, args: &[Value]) -> FilterResult {
    let lhs = number(value).ok_or(FilterError::invalid_value("number", value.type_name()))?;
    let threshold = arg(args, 0)?;
    let rhs = number(threshold).ok_or_else(|| {
        FilterError::invalid_argument(0, format!("expected number, got {}", threshold.type_name()))
    })?;
    Ok(Value::Bool(lhs > rhs))
}

/// `not`: negates truthiness.
pub fn not(value: &Value, _: &[Value]) -> FilterResult {
    Ok(Value::Bool(!value.is_truthy()))
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => s.trim().parse().ok(),
        other => other.as_number(),
    }
}
