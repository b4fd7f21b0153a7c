//! Transport chunks and their canonical form

use serde_json::{Map, Value};

/// Marker some transports send after the last event
const DONE_MARKER: &str = "[DONE]";

/// One element of a streaming response, as the transport delivered it
#[derive(Debug, Clone, PartialEq)]
pub enum Chunk {
    /// Already-parsed JSON, possibly an `{event, data}` envelope
    Json(Value),
    /// A server-sent event
    Sse { event: Option<String>, data: String },
    /// A raw line, with or without the `data: ` prefix
    Text(String),
}

impl Chunk {
    /// Normalize to a flat JSON object.
    ///
    /// `{event, data}` envelopes are flattened so the event name is available
    /// as `type`. Returns `None` for end-of-stream markers, blank lines and
    /// non-object JSON.
    pub fn normalize(&self) -> Option<Value> {
        match self {
            Chunk::Json(value) => normalize_json(value.clone(), None),
            Chunk::Sse { event, data } => normalize_data(data, event.as_deref()),
            Chunk::Text(line) => {
                let line = line.trim();
                let data = line.strip_prefix("data:").map(str::trim).unwrap_or(line);
                normalize_data(data, None)
            }
        }
    }
}

impl From<Value> for Chunk {
    fn from(value: Value) -> Self {
        Chunk::Json(value)
    }
}

impl From<&str> for Chunk {
    fn from(line: &str) -> Self {
        Chunk::Text(line.to_string())
    }
}

impl From<String> for Chunk {
    fn from(line: String) -> Self {
        Chunk::Text(line)
    }
}

fn normalize_data(data: &str, event: Option<&str>) -> Option<Value> {
    let data = data.trim();
    if data.is_empty() || data == DONE_MARKER {
        return None;
    }
    match serde_json::from_str::<Value>(data) {
        Ok(value) => normalize_json(value, event),
        // Plain-text streams carry the fragment itself.
        Err(_) => {
            let mut map = Map::new();
            map.insert("text".to_string(), Value::String(data.to_string()));
            if let Some(event) = event {
                map.insert("type".to_string(), Value::String(event.to_string()));
            }
            Some(Value::Object(map))
        }
    }
}

fn normalize_json(value: Value, event: Option<&str>) -> Option<Value> {
    let Value::Object(mut map) = value else {
        return None;
    };

    if is_envelope(&map) {
        let envelope_event = map
            .remove("event")
            .and_then(|e| e.as_str().map(str::to_string));
        let data = map.remove("data").unwrap_or(Value::Null);
        let inner = match data {
            Value::String(raw) => return normalize_data(&raw, envelope_event.as_deref().or(event)),
            other => other,
        };
        return normalize_json(inner, envelope_event.as_deref().or(event));
    }

    if let Some(event) = event {
        map.entry("type")
            .or_insert_with(|| Value::String(event.to_string()));
    }
    Some(Value::Object(map))
}

/// `{event, data}` with nothing else is a transport wrapper
fn is_envelope(map: &Map<String, Value>) -> bool {
    map.contains_key("data")
        && map.contains_key("event")
        && map.keys().all(|k| matches!(k.as_str(), "event" | "data" | "id" | "retry"))
}
