//! Per-provider streaming merge rules
//!
//! A [`StreamHandler`] is a set of pure functions over one normalized chunk.
//! Usage merging is explicit per provider: some send one cumulative usage
//! block, others split prompt and completion counts across the first and
//! last events.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::core::providers::shared::first_str;
use crate::core::types::TokenMetrics;

/// A tool invocation seen in a chunk.
///
/// Deltas with the same `key` describe the same call and are counted once;
/// keyless deltas are each counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCallDelta {
    pub kind: &'static str,
    pub key: Option<String>,
}

impl ToolCallDelta {
    pub fn new(kind: &'static str, key: Option<String>) -> Self {
        Self { kind, key }
    }
}

/// Everything reconstructed from a finished stream
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamSummary {
    pub text: String,
    pub usage: Option<TokenMetrics>,
    pub model: Option<String>,
    pub response_id: Option<String>,
    pub finish_reason: Option<String>,
    pub tool_calls: BTreeMap<String, u64>,
    /// Inline media parts, in arrival order
    pub media: Vec<Value>,
}

/// Chunk-level parser for one provider family
pub trait StreamHandler: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    /// Whether a normalized chunk looks like this provider's stream
    fn matches_chunk(&self, chunk: &Value) -> bool;

    /// Incremental text carried by the chunk
    fn extract_text(&self, chunk: &Value) -> Option<String>;

    /// Fold the chunk's usage into the usage accumulated so far
    fn merge_usage(&self, chunk: &Value, usage: Option<TokenMetrics>) -> Option<TokenMetrics>;

    fn extract_model(&self, chunk: &Value) -> Option<String> {
        first_str(chunk, &["model", "response.model", "message.model", "modelVersion"])
            .map(str::to_string)
    }

    fn extract_response_id(&self, chunk: &Value) -> Option<String> {
        first_str(chunk, &["id", "response.id", "message.id", "responseId"]).map(str::to_string)
    }

    fn extract_finish_reason(&self, _chunk: &Value) -> Option<String> {
        None
    }

    fn extract_tool_calls(&self, _chunk: &Value) -> Vec<ToolCallDelta> {
        Vec::new()
    }

    /// Generated media carried inline by the chunk, kept whole so the
    /// synthesized response resolves to the same handler as a direct one
    fn extract_media(&self, _chunk: &Value) -> Vec<Value> {
        Vec::new()
    }

    /// Reasoning or thinking content, independent of reported token counts
    fn has_reasoning_content(&self, _chunk: &Value) -> bool {
        false
    }

    /// A complete non-streaming response embedded in a terminal chunk
    fn extract_terminal_payload(&self, _chunk: &Value) -> Option<Value> {
        None
    }

    /// Build a response body in this provider's non-streaming shape
    fn synthesize_response(&self, summary: &StreamSummary) -> Value;
}
