//! Integration tests for llm-usage-rs
//!
//! These tests drive the public API across module boundaries with real
//! provider payloads.

pub mod config_tests;
pub mod cost_tests;
pub mod meter_tests;
pub mod processor_tests;
pub mod registry_tests;
pub mod streaming_tests;
