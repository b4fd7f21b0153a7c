//! Best-effort extraction for responses no handler claims

use serde_json::Value;

use crate::core::providers::anthropic::anthropic_usage;
use crate::core::providers::gemini::gemini_usage;
use crate::core::providers::openai::{chat_usage, message_text, output_text, responses_usage};
use crate::core::providers::shared::{array_at, first_str, join_text_parts, value_at};
use crate::core::types::{Metrics, TokenMetrics};

/// Token usage in whichever common shape the body carries
pub fn extract_tokens(body: &Value) -> Option<TokenMetrics> {
    if let Some(tokens) = value_at(body, "usageMetadata").and_then(gemini_usage) {
        return Some(tokens);
    }
    let usage = value_at(body, "usage").filter(|u| u.is_object())?;
    if usage.get("prompt_tokens").is_some() {
        chat_usage(usage)
    } else if usage.get("cache_read_input_tokens").is_some()
        || usage.get("cache_creation_input_tokens").is_some()
    {
        Some(anthropic_usage(usage))
    } else if usage.get("input_tokens").is_some() {
        responses_usage(usage)
    } else {
        None
    }
}

pub fn extract_metrics(body: &Value) -> Metrics {
    extract_tokens(body)
        .map(Metrics::from_tokens)
        .unwrap_or_default()
}

pub fn extract_model(body: &Value) -> Option<String> {
    first_str(body, &["model", "modelVersion", "response.model", "message.model"])
        .map(str::to_string)
}

pub fn extract_finish_reason(body: &Value) -> Option<String> {
    first_str(
        body,
        &[
            "choices.0.finish_reason",
            "stop_reason",
            "candidates.0.finishReason",
            "incomplete_details.reason",
        ],
    )
    .map(str::to_string)
}

pub fn extract_response_text(body: &Value) -> Option<String> {
    value_at(body, "choices.0.message.content")
        .and_then(message_text)
        .or_else(|| output_text(body))
        .or_else(|| join_text_parts(array_at(body, "content"), "text"))
        .or_else(|| join_text_parts(array_at(body, "candidates.0.content.parts"), "text"))
        .or_else(|| first_str(body, &["text"]).map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chat_shape() {
        let body = json!({
            "model": "local-llama",
            "choices": [{"message": {"content": "hi"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 7, "completion_tokens": 2}
        });
        assert_eq!(extract_tokens(&body), Some(TokenMetrics::new(7, 2)));
        assert_eq!(extract_model(&body).as_deref(), Some("local-llama"));
        assert_eq!(extract_finish_reason(&body).as_deref(), Some("stop"));
        assert_eq!(extract_response_text(&body).as_deref(), Some("hi"));
    }

    #[test]
    fn test_anthropic_shape() {
        let body = json!({
            "content": [{"type": "text", "text": "ok"}],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 10, "output_tokens": 4, "cache_read_input_tokens": 6}
        });
        let tokens = extract_tokens(&body).unwrap();
        assert_eq!(tokens.prompt_tokens, 16);
        assert_eq!(tokens.cached_tokens, 6);
        assert_eq!(extract_response_text(&body).as_deref(), Some("ok"));
    }

    #[test]
    fn test_empty_body() {
        assert!(extract_metrics(&Value::Null).is_empty());
        assert_eq!(extract_model(&Value::Null), None);
        assert_eq!(extract_response_text(&json!({})), None);
    }
}
