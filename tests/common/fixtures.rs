//! Test fixtures
//!
//! Response bodies and stream chunks in the shapes providers actually send.

use serde_json::{Value, json};

/// Factory for OpenAI payloads
pub struct OpenAIFixtures;

impl OpenAIFixtures {
    pub fn chat_completion(model: &str, prompt: u64, completion: u64) -> Value {
        json!({
            "id": "chatcmpl-abc123",
            "object": "chat.completion",
            "created": 1_730_000_000,
            "model": model,
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "Paris is the capital of France."},
                "finish_reason": "stop"
            }],
            "usage": {
                "prompt_tokens": prompt,
                "completion_tokens": completion,
                "total_tokens": prompt + completion
            }
        })
    }

    pub fn chat_tool_calls() -> Value {
        json!({
            "id": "chatcmpl-tools",
            "object": "chat.completion",
            "model": "gpt-4o-2024-08-06",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [
                        {"id": "call_1", "type": "function",
                            "function": {"name": "get_weather", "arguments": "{}"}},
                        {"id": "call_2", "type": "function",
                            "function": {"name": "get_time", "arguments": "{}"}}
                    ]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {"prompt_tokens": 80, "completion_tokens": 30, "total_tokens": 110}
        })
    }

    /// Responses API output with 2 function calls, 3 web searches, 1 code interpreter call
    pub fn responses_with_tools() -> Value {
        json!({
            "id": "resp_1",
            "object": "response",
            "status": "completed",
            "model": "gpt-4.1-2025-04-14",
            "output": [
                {"type": "web_search_call", "id": "ws_1", "status": "completed"},
                {"type": "function_call", "id": "fc_1", "name": "lookup", "arguments": "{}"},
                {"type": "web_search_call", "id": "ws_2", "status": "completed"},
                {"type": "code_interpreter_call", "id": "ci_1", "code": "print(1)"},
                {"type": "function_call", "id": "fc_2", "name": "lookup", "arguments": "{}"},
                {"type": "web_search_call", "id": "ws_3", "status": "completed"},
                {"type": "message", "role": "assistant",
                    "content": [{"type": "output_text", "text": "Done."}]}
            ],
            "usage": {
                "input_tokens": 1200,
                "input_tokens_details": {"cached_tokens": 200},
                "output_tokens": 300,
                "output_tokens_details": {"reasoning_tokens": 0},
                "total_tokens": 1500
            }
        })
    }

    pub fn chat_chunk(content: &str) -> Value {
        json!({
            "id": "chatcmpl-stream",
            "object": "chat.completion.chunk",
            "model": "gpt-4o-mini-2024-07-18",
            "choices": [{"index": 0, "delta": {"content": content}, "finish_reason": null}]
        })
    }

    pub fn chat_final_chunk(prompt: u64, completion: u64) -> Value {
        json!({
            "id": "chatcmpl-stream",
            "object": "chat.completion.chunk",
            "model": "gpt-4o-mini-2024-07-18",
            "choices": [{"index": 0, "delta": {}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": prompt, "completion_tokens": completion,
                "total_tokens": prompt + completion}
        })
    }

    pub fn video(status: &str) -> Value {
        json!({
            "id": "video_123",
            "object": "video",
            "model": "sora-2",
            "status": status,
            "seconds": "8",
            "size": "1280x720",
            "expires_at": 1_893_456_000u64
        })
    }
}

/// Factory for Anthropic payloads
pub struct AnthropicFixtures;

impl AnthropicFixtures {
    pub fn message_with_tool_use() -> Value {
        json!({
            "id": "msg_01",
            "type": "message",
            "role": "assistant",
            "model": "claude-sonnet-4-20250514",
            "content": [
                {"type": "thinking", "thinking": "The user wants the weather.", "signature": "sig"},
                {"type": "text", "text": "Let me check."},
                {"type": "tool_use", "id": "toolu_01", "name": "get_weather", "input": {}}
            ],
            "stop_reason": "tool_use",
            "usage": {
                "input_tokens": 100,
                "cache_read_input_tokens": 40,
                "cache_creation_input_tokens": 0,
                "output_tokens": 50
            }
        })
    }

    /// SSE lines of a short streamed message
    pub fn sse_stream() -> Vec<&'static str> {
        vec![
            "event: message_start",
            r#"data: {"type":"message_start","message":{"id":"msg_02","type":"message","role":"assistant","model":"claude-sonnet-4-20250514","content":[],"usage":{"input_tokens":25,"output_tokens":1}}}"#,
            "event: content_block_start",
            r#"data: {"type":"content_block_start","index":0,"content_block":{"type":"text","text":""}}"#,
            "event: content_block_delta",
            r#"data: {"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"Bonjour"}}"#,
            "event: content_block_delta",
            r#"data: {"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":" !"}}"#,
            "event: content_block_stop",
            r#"data: {"type":"content_block_stop","index":0}"#,
            "event: message_delta",
            r#"data: {"type":"message_delta","delta":{"stop_reason":"end_turn"},"usage":{"output_tokens":12}}"#,
            "event: message_stop",
            r#"data: {"type":"message_stop"}"#,
        ]
    }
}

/// Factory for Google Gemini payloads
pub struct GeminiFixtures;

impl GeminiFixtures {
    pub const ENDPOINT: &'static str = "/v1beta/models/gemini-2.5-flash:generateContent";

    pub fn text(prompt: u64, candidates: u64) -> Value {
        json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Hello from Gemini"}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {
                "promptTokenCount": prompt,
                "candidatesTokenCount": candidates,
                "totalTokenCount": prompt + candidates
            },
            "modelVersion": "gemini-2.5-flash"
        })
    }

    pub fn image() -> Value {
        json!({
            "candidates": [{
                "content": {"role": "model", "parts": [
                    {"inlineData": {"mimeType": "image/png", "data": "iVBORw0KGgo".repeat(40)}}
                ]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 1290,
                "totalTokenCount": 1302},
            "modelVersion": "gemini-2.5-flash-image"
        })
    }

    /// Image generation streamed as an image chunk, then text with usage
    pub fn image_stream() -> Vec<Value> {
        vec![
            json!({
                "candidates": [{"content": {"role": "model", "parts": [
                    {"inlineData": {"mimeType": "image/png", "data": "iVBORw0KGgo".repeat(40)}}
                ]}}],
                "modelVersion": "gemini-2.5-flash-image"
            }),
            json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "A red fox"}]},
                    "finishReason": "STOP"
                }],
                "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 1290},
                "modelVersion": "gemini-2.5-flash-image"
            }),
        ]
    }

    /// The same generation as one non-streamed response
    pub fn image_with_caption() -> Value {
        json!({
            "candidates": [{
                "content": {"role": "model", "parts": [
                    {"text": "A red fox"},
                    {"inlineData": {"mimeType": "image/png", "data": "iVBORw0KGgo".repeat(40)}}
                ]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 1290},
            "modelVersion": "gemini-2.5-flash-image"
        })
    }
}
