//! Body sanitization for downstream storage
//!
//! Large inline payloads are replaced with fixed markers so stored records
//! stay small. Everything else is copied unchanged.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

pub const BASE64_MARKER: &str = "[base64 omitted]";
pub const BINARY_MARKER: &str = "[binary omitted]";
pub const EMBEDDING_MARKER: &str = "[embedding omitted]";

/// Keys whose numeric arrays are embedding vectors
const EMBEDDING_KEYS: &[&str] = &["embedding", "values"];

static BASE64_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(data:[\w.+-]+/[\w.+-]+;base64,)?[A-Za-z0-9+/_\-\r\n]+={0,2}$")
        .expect("Invalid base64 regex")
});

/// Whether a string is an inline base64 payload at least `min_length` long
pub fn looks_like_base64(s: &str, min_length: usize) -> bool {
    s.len() >= min_length && BASE64_REGEX.is_match(s)
}

/// Copy of `value` with base64 strings and embedding vectors replaced
pub fn sanitize_json(value: &Value, min_length: usize) -> Value {
    match value {
        Value::String(s) if looks_like_base64(s, min_length) => {
            Value::String(BASE64_MARKER.to_string())
        }
        Value::Array(items) => Value::Array(
            items.iter().map(|v| sanitize_json(v, min_length)).collect(),
        ),
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, v) in map {
                let cleaned = if EMBEDDING_KEYS.contains(&key.as_str()) && is_vector(v) {
                    Value::String(EMBEDDING_MARKER.to_string())
                } else {
                    sanitize_json(v, min_length)
                };
                out.insert(key.clone(), cleaned);
            }
            Value::Object(out)
        }
        other => other.clone(),
    }
}

fn is_vector(value: &Value) -> bool {
    value
        .as_array()
        .is_some_and(|items| !items.is_empty() && items.iter().all(Value::is_number))
}
