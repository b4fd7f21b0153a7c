//! External collaborator boundaries
//!
//! The meter builds records and hands them off; durable storage, media
//! hosting and audio decoding live behind these traits.

use std::fmt;
use std::sync::Mutex;

use serde_json::{Map, Value};

use crate::utils::error::{MeterError, Result};

/// Opaque handle returned by a sink for a stored record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordHandle(pub String);

impl fmt::Display for RecordHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Persistence boundary for flattened usage records
pub trait UsageSink: Send + Sync + fmt::Debug {
    fn store(&self, record: Map<String, Value>) -> Result<RecordHandle>;
}

/// Storage for generated media
pub trait MediaStore: Send + Sync + fmt::Debug {
    /// Store the media of one response; returns its storage locations
    fn store(&self, request_id: &str, body: &Value, binary: Option<&[u8]>) -> Result<Vec<String>>;
}

/// Duration of raw audio, when it can be decoded.
///
/// Implementations return `None` instead of failing.
pub trait AudioDurationProbe: Send + Sync + fmt::Debug {
    fn duration_seconds(&self, data: &[u8]) -> Option<f64>;
}

/// Sink that keeps records in memory
#[derive(Debug, Default)]
pub struct InMemorySink {
    records: Mutex<Vec<Map<String, Value>>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored record
    pub fn records(&self) -> Vec<Map<String, Value>> {
        match self.records.lock() {
            Ok(records) => records.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl UsageSink for InMemorySink {
    fn store(&self, record: Map<String, Value>) -> Result<RecordHandle> {
        let handle = record
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| MeterError::storage("record has no id"))?;
        self.records
            .lock()
            .map_err(|_| MeterError::storage("in-memory sink lock poisoned"))?
            .push(record);
        Ok(RecordHandle(handle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_in_memory_sink() {
        let sink = InMemorySink::new();
        assert!(sink.is_empty());

        let mut record = Map::new();
        record.insert("id".into(), json!("req-1"));
        let handle = sink.store(record).unwrap();

        assert_eq!(handle, RecordHandle("req-1".to_string()));
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.records()[0]["id"], json!("req-1"));
    }

    #[test]
    fn test_record_without_id_rejected() {
        let sink = InMemorySink::new();
        assert!(matches!(sink.store(Map::new()), Err(MeterError::Storage(_))));
    }
}
