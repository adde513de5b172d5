//! Collection filters

use stencil_domain::{FilterError, FilterResult, Value, VariableMap};

use super::{arg, nil_value};

/// `first`: first character of a string or first item of a list.
pub fn first(value: &Value, _: &[Value]) -> FilterResult {
    match value {
        Value::String(s) => s
            .chars()
            .next()
            .map(|c| Value::String(c.to_string()))
            .ok_or_else(|| FilterError::AllowsDefault("string is empty".to_string())),
        Value::List(items) => items
            .first()
            .cloned()
            .ok_or_else(|| FilterError::AllowsDefault("list is empty".to_string())),
        Value::Nil => Err(nil_value()),
        other => Err(FilterError::invalid_value("string or list", other.type_name())),
    }
}

/// `key:path`: follows a dotted path into maps and lists, such as
/// `user.tags.0`.
pub fn key(value: &Value, args: &[Value]) -> FilterResult {
    if value.is_nil() {
        return Err(nil_value());
    }

    let path = arg(args, 0)?.to_text();
    let segments: Vec<&str> = path.split('.').collect();

    value
        .lookup_path(&segments)
        .cloned()
        .map_err(|err| FilterError::AllowsDefault(format!("key '{path}': {err}")))
}

/// `find:key,value`: the first map whose `key` entry renders as `value`.
///
/// A single map is returned as is when it matches.
pub fn find(value: &Value, args: &[Value]) -> FilterResult {
    let field = arg(args, 0)?.to_text();
    let wanted = arg(args, 1)?.to_text();

    let matches = |map: &VariableMap| map.get(&field).is_some_and(|v| v.to_text() == wanted);

    let found = match value {
        Value::List(items) => items
            .iter()
            .find(|item| item.as_map().is_some_and(matches))
            .cloned(),
        Value::Map(map) => matches(map).then(|| value.clone()),
        Value::Nil => return Err(nil_value()),
        other => return Err(FilterError::invalid_value("list or map", other.type_name())),
    };

    found.ok_or_else(|| {
        FilterError::AllowsDefault(format!("no entry with {field} = '{wanted}'"))
    })
}

/// `wrap:key`: places the value in a single-entry map.
pub fn wrap(value: &Value, args: &[Value]) -> FilterResult {
    let key = arg(args, 0)?.to_text();
    let mut map = VariableMap::with_capacity(1);
    map.insert(key, value.clone());
    Ok(Value::Map(map))
}

/// `map:key`: indexes a list of maps by each item's `key` entry.
///
/// Items without the entry are skipped; a later item replaces an earlier one
/// with the same key.
pub fn map(value: &Value, args: &[Value]) -> FilterResult {
    let field = arg(args, 0)?.to_text();

    let items = match value {
        Value::List(items) => items,
        Value::Nil => return Err(nil_value()),
        other => return Err(FilterError::invalid_value("list of maps", other.type_name())),
    };

    let mut indexed = VariableMap::with_capacity(items.len());
    for item in items {
        let entry = item
            .as_map()
            .ok_or_else(|| FilterError::invalid_value("list of maps", item.type_name()))?;
        match entry.get(&field) {
            Some(Value::String(id)) => {
                indexed.insert(id.clone(), item.clone());
            }
            Some(other) => {
                return Err(FilterError::invalid_value("string key", other.type_name()));
            }
            None => {}
        }
    }
    Ok(Value::Map(indexed))
}
