//! JSON field helpers shared by all handlers
//!
//! Every lookup tolerates missing or mistyped fields and returns `None`
//! or zero instead of failing.

use serde_json::Value;

/// Walk a dotted path through objects; numeric segments index arrays
pub fn value_at<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

pub fn str_at<'a>(value: &'a Value, path: &str) -> Option<&'a str> {
    value_at(value, path).and_then(Value::as_str)
}

/// Read a non-negative integer, accepting numeric strings and floats
pub fn u64_at(value: &Value, path: &str) -> Option<u64> {
    as_u64_lenient(value_at(value, path)?)
}

pub fn u64_or_zero(value: &Value, path: &str) -> u64 {
    u64_at(value, path).unwrap_or(0)
}

/// Read a float, accepting numeric strings
pub fn f64_at(value: &Value, path: &str) -> Option<f64> {
    match value_at(value, path)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

pub fn array_at<'a>(value: &'a Value, path: &str) -> &'a [Value] {
    value_at(value, path)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// First path that yields a non-empty string
pub fn first_str<'a>(value: &'a Value, paths: &[&str]) -> Option<&'a str> {
    paths
        .iter()
        .filter_map(|p| str_at(value, p))
        .find(|s| !s.is_empty())
}

/// First path that yields an integer
pub fn first_u64(value: &Value, paths: &[&str]) -> Option<u64> {
    paths.iter().find_map(|p| u64_at(value, p))
}

fn as_u64_lenient(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

/// Concatenate the `text` fields of a list of content parts
pub fn join_text_parts(parts: &[Value], text_key: &str) -> Option<String> {
    let text: String = parts
        .iter()
        .filter_map(|p| p.get(text_key).and_then(Value::as_str))
        .collect();
    if text.is_empty() { None } else { Some(text) }
}
