//! Common test utilities for llm-usage-rs
//!
//! - Provider response fixtures as `serde_json::json!` factories
//! - Meter construction backed by an in-memory sink

pub mod fixtures;

use std::sync::Arc;

use llm_usage::{InMemorySink, MeterConfig, UsageMeter};

/// Meter with default configuration and the sink it writes to
pub fn test_meter() -> (UsageMeter, Arc<InMemorySink>) {
    test_meter_with(&MeterConfig::default())
}

pub fn test_meter_with(config: &MeterConfig) -> (UsageMeter, Arc<InMemorySink>) {
    let sink = Arc::new(InMemorySink::new());
    let meter = UsageMeter::from_config(config, sink.clone()).expect("meter builds");
    (meter, sink)
}
