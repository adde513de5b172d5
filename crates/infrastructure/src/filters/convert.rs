//! Conversion filters

use stencil_domain::{FilterError, FilterResult, Value};

use super::{arg_str, value_str};

/// `json[:'pretty']`: serializes the value to JSON text.
pub fn json(value: &Value, args: &[Value]) -> FilterResult {
    let pretty = args.first().and_then(Value::as_str) == Some("pretty");
    let text = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    text.map(Value::String)
        .map_err(|err| FilterError::Failed(format!("failed to apply json filter: {err}")))
}

/// `yaml`: serializes the value to YAML text.
pub fn yaml(value: &Value, _: &[Value]) -> FilterResult {
    serde_yaml::to_string(value)
        .map(Value::String)
        .map_err(|err| FilterError::Failed(format!("failed to apply yaml filter: {err}")))
}

/// `from:'json'|'yaml'`: parses text into a structured value.
pub fn from(value: &Value, args: &[Value]) -> FilterResult {
    let format = arg_str(args, 0)?;
    let text = value_str(value)?;

    match format {
        "json" => serde_json::from_str(text)
            .map_err(|err| FilterError::Failed(format!("failed to parse JSON: {err}"))),
        "yaml" => serde_yaml::from_str(text)
            .map_err(|err| FilterError::Failed(format!("failed to parse YAML: {err}"))),
        other => Err(FilterError::invalid_argument(
            0,
            format!("unsupported format '{other}', expected 'json' or 'yaml'"),
        )),
    }
}
