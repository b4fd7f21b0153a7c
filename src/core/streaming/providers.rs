//! Provider-specific streaming implementations
//!
//! Usage merge contracts:
//! - OpenAI Chat Completions: one usage block on the final chunk, overwrite.
//! - OpenAI Responses: usage on `response.completed`, overwrite.
//! - Anthropic: prompt side on `message_start`, cumulative output on
//!   `message_delta`; each side overwrites only its own fields.
//! - Gemini: cumulative `usageMetadata` on every chunk, overwrite.

use serde_json::{Value, json};

use super::handler::{StreamHandler, StreamSummary, ToolCallDelta};
use crate::core::processing::tools::{
    self, anthropic_block_kind, chat_tool_call_kind, gemini_part_kind, responses_item_kind,
};
use crate::core::providers::anthropic::anthropic_usage;
use crate::core::providers::gemini::gemini_usage;
use crate::core::providers::openai::{chat_usage, responses_usage};
use crate::core::providers::shared::{array_at, first_str, str_at, u64_at, value_at};
use crate::core::types::TokenMetrics;

fn repeat(count: u64, item: Value) -> impl Iterator<Item = Value> {
    (0..count).map(move |_| item.clone())
}

/// OpenAI Chat Completions chunks
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAIChatStream;

impl StreamHandler for OpenAIChatStream {
    fn name(&self) -> &'static str {
        "openai.chat_completions"
    }

    fn matches_chunk(&self, chunk: &Value) -> bool {
        str_at(chunk, "object") == Some("chat.completion.chunk")
            || value_at(chunk, "choices.0.delta").is_some()
    }

    fn extract_text(&self, chunk: &Value) -> Option<String> {
        str_at(chunk, "choices.0.delta.content")
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    fn merge_usage(&self, chunk: &Value, usage: Option<TokenMetrics>) -> Option<TokenMetrics> {
        value_at(chunk, "usage").and_then(chat_usage).or(usage)
    }

    fn extract_finish_reason(&self, chunk: &Value) -> Option<String> {
        str_at(chunk, "choices.0.finish_reason").map(str::to_string)
    }

    fn extract_tool_calls(&self, chunk: &Value) -> Vec<ToolCallDelta> {
        array_at(chunk, "choices.0.delta.tool_calls")
            .iter()
            .map(|call| {
                let key = u64_at(call, "index")
                    .map(|i| i.to_string())
                    .or_else(|| str_at(call, "id").map(str::to_string));
                ToolCallDelta::new(chat_tool_call_kind(call), key)
            })
            .collect()
    }

    fn has_reasoning_content(&self, chunk: &Value) -> bool {
        ["choices.0.delta.reasoning_content", "choices.0.delta.reasoning"]
            .iter()
            .any(|p| str_at(chunk, p).is_some_and(|s| !s.is_empty()))
    }

    fn synthesize_response(&self, summary: &StreamSummary) -> Value {
        let tool_calls: Vec<Value> = summary
            .tool_calls
            .iter()
            .flat_map(|(kind, n)| {
                let kind = if kind == tools::CUSTOM_TOOL_CALL { "custom" } else { "function" };
                repeat(*n, json!({"type": kind}))
            })
            .collect();

        let mut message = json!({"role": "assistant", "content": summary.text});
        if !tool_calls.is_empty() {
            message["tool_calls"] = Value::Array(tool_calls);
        }

        json!({
            "id": summary.response_id,
            "object": "chat.completion",
            "model": summary.model,
            "choices": [{
                "index": 0,
                "message": message,
                "finish_reason": summary.finish_reason,
            }],
            "usage": summary.usage.map(|u| json!({
                "prompt_tokens": u.prompt_tokens,
                "completion_tokens": u.completion_tokens,
                "total_tokens": u.total_tokens(),
                "prompt_tokens_details": {"cached_tokens": u.cached_tokens},
                "completion_tokens_details": {"reasoning_tokens": u.reasoning_tokens},
            })),
        })
    }
}

/// OpenAI Responses API events
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAIResponsesStream;

const RESPONSES_TERMINAL_EVENTS: &[&str] =
    &["response.completed", "response.incomplete", "response.failed"];

impl StreamHandler for OpenAIResponsesStream {
    fn name(&self) -> &'static str {
        "openai.responses"
    }

    fn matches_chunk(&self, chunk: &Value) -> bool {
        str_at(chunk, "type").is_some_and(|t| t.starts_with("response."))
    }

    fn extract_text(&self, chunk: &Value) -> Option<String> {
        if str_at(chunk, "type") != Some("response.output_text.delta") {
            return None;
        }
        str_at(chunk, "delta").filter(|s| !s.is_empty()).map(str::to_string)
    }

    fn merge_usage(&self, chunk: &Value, usage: Option<TokenMetrics>) -> Option<TokenMetrics> {
        value_at(chunk, "response.usage")
            .and_then(responses_usage)
            .or(usage)
    }

    fn extract_model(&self, chunk: &Value) -> Option<String> {
        str_at(chunk, "response.model").map(str::to_string)
    }

    fn extract_response_id(&self, chunk: &Value) -> Option<String> {
        str_at(chunk, "response.id").map(str::to_string)
    }

    fn extract_finish_reason(&self, chunk: &Value) -> Option<String> {
        match str_at(chunk, "type")? {
            "response.completed" => Some("completed".to_string()),
            "response.incomplete" => Some(
                str_at(chunk, "response.incomplete_details.reason")
                    .unwrap_or("incomplete")
                    .to_string(),
            ),
            "response.failed" => Some("failed".to_string()),
            _ => None,
        }
    }

    fn extract_tool_calls(&self, chunk: &Value) -> Vec<ToolCallDelta> {
        if str_at(chunk, "type") != Some("response.output_item.added") {
            return Vec::new();
        }
        let Some(item) = chunk.get("item") else {
            return Vec::new();
        };
        responses_item_kind(item)
            .map(|kind| vec![ToolCallDelta::new(kind, str_at(item, "id").map(str::to_string))])
            .unwrap_or_default()
    }

    fn has_reasoning_content(&self, chunk: &Value) -> bool {
        str_at(chunk, "type").is_some_and(|t| t.starts_with("response.reasoning"))
            || str_at(chunk, "item.type") == Some("reasoning")
    }

    fn extract_terminal_payload(&self, chunk: &Value) -> Option<Value> {
        let event = str_at(chunk, "type")?;
        if !RESPONSES_TERMINAL_EVENTS.contains(&event) {
            return None;
        }
        chunk.get("response").filter(|r| r.is_object()).cloned()
    }

    fn synthesize_response(&self, summary: &StreamSummary) -> Value {
        let mut output: Vec<Value> = summary
            .tool_calls
            .iter()
            .flat_map(|(kind, n)| {
                let item_type = if kind == tools::MCP_TOOL_CALL { "mcp_call" } else { kind.as_str() };
                repeat(*n, json!({"type": item_type}))
            })
            .collect();
        if !summary.text.is_empty() {
            output.push(json!({
                "type": "message",
                "role": "assistant",
                "content": [{"type": "output_text", "text": summary.text}],
            }));
        }

        json!({
            "id": summary.response_id,
            "object": "response",
            "model": summary.model,
            "status": summary.finish_reason.as_deref().unwrap_or("completed"),
            "output": output,
            "usage": summary.usage.map(|u| json!({
                "input_tokens": u.prompt_tokens,
                "output_tokens": u.completion_tokens,
                "total_tokens": u.total_tokens(),
                "input_tokens_details": {"cached_tokens": u.cached_tokens},
                "output_tokens_details": {"reasoning_tokens": u.reasoning_tokens},
            })),
        })
    }
}

/// Anthropic Messages events
#[derive(Debug, Clone, Copy, Default)]
pub struct AnthropicStream;

impl StreamHandler for AnthropicStream {
    fn name(&self) -> &'static str {
        "anthropic.messages"
    }

    fn matches_chunk(&self, chunk: &Value) -> bool {
        matches!(
            str_at(chunk, "type"),
            Some(
                "message_start"
                    | "message_delta"
                    | "message_stop"
                    | "content_block_start"
                    | "content_block_delta"
                    | "content_block_stop"
                    | "ping"
            )
        )
    }

    fn extract_text(&self, chunk: &Value) -> Option<String> {
        if str_at(chunk, "type") != Some("content_block_delta")
            || str_at(chunk, "delta.type") != Some("text_delta")
        {
            return None;
        }
        str_at(chunk, "delta.text").filter(|s| !s.is_empty()).map(str::to_string)
    }

    fn merge_usage(&self, chunk: &Value, usage: Option<TokenMetrics>) -> Option<TokenMetrics> {
        match str_at(chunk, "type") {
            Some("message_start") => value_at(chunk, "message.usage")
                .filter(|u| u.is_object())
                .map(anthropic_usage)
                .or(usage),
            Some("message_delta") => {
                let Some(delta) = value_at(chunk, "usage").filter(|u| u.is_object()) else {
                    return usage;
                };
                let mut merged = usage.unwrap_or_default();
                // Newer API versions repeat cumulative input counts here.
                if u64_at(delta, "input_tokens").is_some_and(|n| n > 0) {
                    let prompt = anthropic_usage(delta);
                    merged.prompt_tokens = prompt.prompt_tokens;
                    merged.cached_tokens = prompt.cached_tokens;
                    merged.cache_write_5m_tokens = prompt.cache_write_5m_tokens;
                    merged.cache_write_1h_tokens = prompt.cache_write_1h_tokens;
                }
                if let Some(output) = u64_at(delta, "output_tokens") {
                    merged.completion_tokens = output;
                }
                Some(merged)
            }
            _ => usage,
        }
    }

    fn extract_model(&self, chunk: &Value) -> Option<String> {
        str_at(chunk, "message.model").map(str::to_string)
    }

    fn extract_response_id(&self, chunk: &Value) -> Option<String> {
        str_at(chunk, "message.id").map(str::to_string)
    }

    fn extract_finish_reason(&self, chunk: &Value) -> Option<String> {
        str_at(chunk, "delta.stop_reason").map(str::to_string)
    }

    fn extract_tool_calls(&self, chunk: &Value) -> Vec<ToolCallDelta> {
        if str_at(chunk, "type") != Some("content_block_start") {
            return Vec::new();
        }
        let Some(block) = chunk.get("content_block") else {
            return Vec::new();
        };
        anthropic_block_kind(block)
            .map(|kind| vec![ToolCallDelta::new(kind, str_at(block, "id").map(str::to_string))])
            .unwrap_or_default()
    }

    fn has_reasoning_content(&self, chunk: &Value) -> bool {
        matches!(
            str_at(chunk, "content_block.type"),
            Some("thinking" | "redacted_thinking")
        ) || str_at(chunk, "delta.type") == Some("thinking_delta")
    }

    fn synthesize_response(&self, summary: &StreamSummary) -> Value {
        let mut content = Vec::new();
        if !summary.text.is_empty() {
            content.push(json!({"type": "text", "text": summary.text}));
        }
        for (kind, n) in &summary.tool_calls {
            let block = match kind.as_str() {
                tools::TOOL_USE => json!({"type": "tool_use"}),
                tools::MCP_TOOL_CALL => json!({"type": "mcp_tool_use"}),
                tools::WEB_SEARCH_CALL => json!({"type": "server_tool_use", "name": "web_search"}),
                tools::WEB_FETCH_CALL => json!({"type": "server_tool_use", "name": "web_fetch"}),
                tools::CODE_INTERPRETER_CALL => {
                    json!({"type": "server_tool_use", "name": "code_execution"})
                }
                other => json!({"type": "server_tool_use", "name": other}),
            };
            content.extend(repeat(*n, block));
        }

        let usage = summary.usage.map(|u| {
            let writes = u.cache_write_5m_tokens.saturating_add(u.cache_write_1h_tokens);
            let input = u
                .prompt_tokens
                .saturating_sub(u.cached_tokens.saturating_add(writes));
            json!({
                "input_tokens": input,
                "output_tokens": u.completion_tokens,
                "cache_read_input_tokens": u.cached_tokens,
                "cache_creation_input_tokens": writes,
                "cache_creation": {
                    "ephemeral_5m_input_tokens": u.cache_write_5m_tokens,
                    "ephemeral_1h_input_tokens": u.cache_write_1h_tokens,
                },
            })
        });

        json!({
            "id": summary.response_id,
            "type": "message",
            "role": "assistant",
            "model": summary.model,
            "content": content,
            "stop_reason": summary.finish_reason,
            "usage": usage,
        })
    }
}

/// Gemini `streamGenerateContent` chunks
#[derive(Debug, Clone, Copy, Default)]
pub struct GeminiStream;

impl StreamHandler for GeminiStream {
    fn name(&self) -> &'static str {
        "google.generate_content"
    }

    fn matches_chunk(&self, chunk: &Value) -> bool {
        chunk.get("candidates").is_some() || chunk.get("usageMetadata").is_some()
    }

    fn extract_text(&self, chunk: &Value) -> Option<String> {
        let text: String = array_at(chunk, "candidates.0.content.parts")
            .iter()
            .filter(|p| p.get("thought").and_then(Value::as_bool) != Some(true))
            .filter_map(|p| str_at(p, "text"))
            .collect();
        if text.is_empty() { None } else { Some(text) }
    }

    fn merge_usage(&self, chunk: &Value, usage: Option<TokenMetrics>) -> Option<TokenMetrics> {
        value_at(chunk, "usageMetadata").and_then(gemini_usage).or(usage)
    }

    fn extract_model(&self, chunk: &Value) -> Option<String> {
        str_at(chunk, "modelVersion").map(str::to_string)
    }

    fn extract_response_id(&self, chunk: &Value) -> Option<String> {
        str_at(chunk, "responseId").map(str::to_string)
    }

    fn extract_finish_reason(&self, chunk: &Value) -> Option<String> {
        str_at(chunk, "candidates.0.finishReason").map(str::to_string)
    }

    fn extract_tool_calls(&self, chunk: &Value) -> Vec<ToolCallDelta> {
        array_at(chunk, "candidates.0.content.parts")
            .iter()
            .filter_map(gemini_part_kind)
            .map(|kind| ToolCallDelta::new(kind, None))
            .collect()
    }

    fn has_reasoning_content(&self, chunk: &Value) -> bool {
        array_at(chunk, "candidates.0.content.parts")
            .iter()
            .any(|p| p.get("thought").and_then(Value::as_bool) == Some(true))
    }

    fn extract_media(&self, chunk: &Value) -> Vec<Value> {
        array_at(chunk, "candidates.0.content.parts")
            .iter()
            .filter(|p| p.get("inlineData").is_some() || p.get("inline_data").is_some())
            .cloned()
            .collect()
    }

    fn synthesize_response(&self, summary: &StreamSummary) -> Value {
        let mut parts = Vec::new();
        if !summary.text.is_empty() {
            parts.push(json!({"text": summary.text}));
        }
        parts.extend(summary.media.iter().cloned());
        for (kind, n) in &summary.tool_calls {
            let part = match kind.as_str() {
                tools::CODE_INTERPRETER_CALL => json!({"executableCode": {}}),
                _ => json!({"functionCall": {}}),
            };
            parts.extend(repeat(*n, part));
        }

        json!({
            "responseId": summary.response_id,
            "modelVersion": summary.model,
            "candidates": [{
                "content": {"role": "model", "parts": parts},
                "finishReason": summary.finish_reason,
            }],
            "usageMetadata": summary.usage.map(|u| json!({
                "promptTokenCount": u.prompt_tokens,
                "candidatesTokenCount": u.completion_tokens.saturating_sub(u.reasoning_tokens),
                "thoughtsTokenCount": u.reasoning_tokens,
                "cachedContentTokenCount": u.cached_tokens,
            })),
        })
    }
}

/// Best-effort field lookups when no provider stream handler resolves
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericStream;

const GENERIC_TEXT_PATHS: &[&str] = &[
    "choices.0.delta.content",
    "choices.0.text",
    "delta.text",
    "delta",
    "candidates.0.content.parts.0.text",
    "text",
    "content",
];

impl StreamHandler for GenericStream {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn matches_chunk(&self, _chunk: &Value) -> bool {
        true
    }

    fn extract_text(&self, chunk: &Value) -> Option<String> {
        first_str(chunk, GENERIC_TEXT_PATHS).map(str::to_string)
    }

    fn merge_usage(&self, chunk: &Value, usage: Option<TokenMetrics>) -> Option<TokenMetrics> {
        if let Some(meta) = value_at(chunk, "usageMetadata").and_then(gemini_usage) {
            return Some(meta);
        }
        let Some(block) = value_at(chunk, "usage").filter(|u| u.is_object()) else {
            return usage;
        };
        if block.get("input_tokens").is_some() {
            responses_usage(block).or(usage)
        } else {
            chat_usage(block).or(usage)
        }
    }

    fn extract_finish_reason(&self, chunk: &Value) -> Option<String> {
        first_str(
            chunk,
            &[
                "choices.0.finish_reason",
                "delta.stop_reason",
                "finish_reason",
                "candidates.0.finishReason",
            ],
        )
        .map(str::to_string)
    }

    fn synthesize_response(&self, summary: &StreamSummary) -> Value {
        OpenAIChatStream.synthesize_response(summary)
    }
}
