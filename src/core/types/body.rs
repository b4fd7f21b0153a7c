//! Response payload representation

use serde_json::Value;

static NULL_BODY: Value = Value::Null;

/// A provider response as handed to the processor
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// Parsed JSON body; malformed bodies arrive as `Value::Null`
    Json(Value),
    /// Raw bytes, e.g. synthesized speech
    Binary {
        data: Vec<u8>,
        content_type: Option<String>,
    },
}

impl ResponseBody {
    /// Parse raw bytes as JSON, treating anything unparseable as an empty body
    pub fn from_json_bytes(bytes: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(bytes) {
            Ok(value) => ResponseBody::Json(value),
            Err(e) => {
                tracing::debug!(error = %e, "Response body is not valid JSON, treating as empty");
                ResponseBody::Json(Value::Null)
            }
        }
    }

    /// Build a body from transport bytes and an optional content type
    pub fn from_bytes(bytes: Vec<u8>, content_type: Option<&str>) -> Self {
        let is_json = content_type
            .map(|ct| ct.contains("json"))
            .unwrap_or_else(|| bytes.first().is_some_and(|b| *b == b'{' || *b == b'['));
        if is_json {
            Self::from_json_bytes(&bytes)
        } else {
            ResponseBody::Binary {
                data: bytes,
                content_type: content_type.map(str::to_string),
            }
        }
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, ResponseBody::Binary { .. })
    }

    /// The JSON view of the body; binary bodies read as `Null`
    pub fn json(&self) -> &Value {
        match self {
            ResponseBody::Json(value) => value,
            ResponseBody::Binary { .. } => &NULL_BODY,
        }
    }

    pub fn binary(&self) -> Option<&[u8]> {
        match self {
            ResponseBody::Binary { data, .. } => Some(data),
            ResponseBody::Json(_) => None,
        }
    }
}

impl From<Value> for ResponseBody {
    fn from(value: Value) -> Self {
        ResponseBody::Json(value)
    }
}
