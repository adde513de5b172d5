//! Date formatting with single-letter format codes
//!
//! Format strings are built from single-letter codes (`Y-m-d H:i:s`). Each
//! letter maps to a chrono specifier or a computed value; letters without a
//! mapping are rejected, every other character is copied through.

use std::fmt::Write;

use chrono::{DateTime, Datelike, Utc};
use stencil_domain::{FilterError, FilterResult, Value};

use super::{arg_str, nil_value};

/// Format used when `format` is called without an argument.
pub const DEFAULT_DATE_FORMAT: &str = "Y-m-d H:i:s";

/// `format[:'pattern']`: renders a timestamp. Strings pass through so a
/// date that was already rendered is left alone.
pub fn format(value: &Value, args: &[Value]) -> FilterResult {
    let pattern = if args.is_empty() {
        DEFAULT_DATE_FORMAT
    } else {
        arg_str(args, 0)?
    };

    match value {
        Value::Timestamp(timestamp) => format_timestamp(timestamp, pattern)
            .map(Value::String)
            .map_err(|letter| {
                FilterError::invalid_argument(0, format!("'{letter}' is not a date format character"))
            }),
        Value::String(_) => Ok(value.clone()),
        Value::Nil => Err(nil_value()),
        other => Err(FilterError::invalid_value("timestamp or string", other.type_name())),
    }
}

/// Renders `timestamp` using single-letter format codes.
///
/// # Errors
///
/// Returns the first letter that has no mapping.
pub fn format_timestamp(timestamp: &DateTime<Utc>, pattern: &str) -> Result<String, char> {
    let mut output = String::with_capacity(pattern.len() * 2);

    for c in pattern.chars() {
        if let Some(specifier) = strftime(c) {
            // Specifiers come from the table above and are always valid.
            let _ = write!(output, "{}", timestamp.format(specifier));
        } else if let Some(computed) = computed(c, timestamp) {
            output.push_str(&computed);
        } else if c.is_ascii_alphabetic() {
            return Err(c);
        } else {
            output.push(c);
        }
    }

    Ok(output)
}

/// Letters with a direct chrono equivalent.
const fn strftime(letter: char) -> Option<&'static str> {
    Some(match letter {
        // day
        'd' => "%d",
        'D' => "%a",
        'j' => "%-d",
        'l' => "%A",
        'N' => "%u",
        'w' => "%w",
        // week
        'W' => "%V",
        // month
        'F' => "%B",
        'm' => "%m",
        'M' => "%b",
        'n' => "%-m",
        // year
        'o' => "%G",
        'Y' => "%Y",
        'y' => "%y",
        // time
        'a' => "%P",
        'A' => "%p",
        'g' => "%-I",
        'G' => "%-H",
        'h' => "%I",
        'H' => "%H",
        'i' => "%M",
        's' => "%S",
        'u' => "%6f",
        'v' => "%3f",
        // timezone
        'e' | 'T' => "%Z",
        'O' => "%z",
        'P' => "%:z",
        // full dates
        'c' => "%Y-%m-%dT%H:%M:%S%:z",
        'r' => "%a, %d %b %Y %H:%M:%S %z",
        'U' => "%s",
        _ => return None,
    })
}

/// Letters computed from the date itself.
fn computed(letter: char, timestamp: &DateTime<Utc>) -> Option<String> {
    Some(match letter {
        'S' => ordinal_suffix(timestamp.day()).to_string(),
        'z' => timestamp.ordinal0().to_string(),
        't' => days_in_month(timestamp.year(), timestamp.month()).to_string(),
        'L' => u8::from(is_leap_year(timestamp.year())).to_string(),
        'I' | 'Z' => "0".to_string(),
        'p' => "Z".to_string(),
        _ => return None,
    })
}

const fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

const fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

const fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}
