use serde_json::Value;

use crate::core::providers::handler::{HandlerCapabilities, ProviderHandler};
use crate::core::providers::shared::{array_at, join_text_parts, str_at, u64_or_zero, value_at};
use crate::core::streaming::{OpenAIChatStream, StreamHandler};
use crate::core::types::{Metrics, ModelType, PricingTierName, ResponseBody, TokenMetrics};

/// `/v1/chat/completions`
#[derive(Debug, Clone, Copy, Default)]
pub struct ChatCompletionsHandler;

/// Usage block shared by chat completions and their streaming chunks
pub(crate) fn chat_usage(usage: &Value) -> Option<TokenMetrics> {
    if !usage.is_object() {
        return None;
    }
    Some(
        TokenMetrics::new(
            u64_or_zero(usage, "prompt_tokens"),
            u64_or_zero(usage, "completion_tokens"),
        )
        .with_cached(u64_or_zero(usage, "prompt_tokens_details.cached_tokens"))
        .with_reasoning(u64_or_zero(usage, "completion_tokens_details.reasoning_tokens")),
    )
}

/// Message content is either a string or a list of typed parts
pub(crate) fn message_text(content: &Value) -> Option<String> {
    match content {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(parts) => join_text_parts(parts, "text"),
        _ => None,
    }
}

impl ProviderHandler for ChatCompletionsHandler {
    fn name(&self) -> &'static str {
        "openai.chat_completions"
    }

    fn endpoints(&self) -> &'static [&'static str] {
        &["/v1/chat/completions", "/chat/completions"]
    }

    fn model_type(&self) -> ModelType {
        ModelType::Text
    }

    fn capabilities(&self) -> HandlerCapabilities {
        HandlerCapabilities {
            streaming: true,
            tier_from_request: true,
            tier_from_response: true,
            ..HandlerCapabilities::NONE
        }
    }

    fn matches_response(&self, body: &ResponseBody) -> bool {
        let json = body.json();
        str_at(json, "object").is_some_and(|o| o.starts_with("chat.completion"))
            || value_at(json, "choices").is_some_and(Value::is_array)
    }

    fn extract_metrics(&self, _request: Option<&Value>, body: &ResponseBody) -> Metrics {
        let json = body.json();
        let mut metrics = Metrics::empty();
        if let Some(tokens) = value_at(json, "usage").and_then(chat_usage) {
            metrics = metrics.with_tokens(tokens);
        }
        // Image-output chat models list generated images on the message.
        let images = array_at(json, "choices")
            .iter()
            .flat_map(|c| array_at(c, "message.images"))
            .count() as u64;
        if images > 0 {
            metrics = metrics.with_images(images);
        }
        metrics
    }

    fn extract_finish_reason(&self, body: &Value) -> Option<String> {
        str_at(body, "choices.0.finish_reason").map(str::to_string)
    }

    fn extract_response_text(&self, body: &Value) -> Option<String> {
        value_at(body, "choices.0.message.content").and_then(message_text)
    }

    fn stream_handler(&self) -> Option<&'static dyn StreamHandler> {
        Some(&OpenAIChatStream)
    }

    fn extract_tier_from_request(&self, request: &Value) -> Option<PricingTierName> {
        super::service_tier(request)
    }

    fn extract_tier_from_response(&self, body: &Value) -> Option<PricingTierName> {
        super::service_tier(body)
    }
}
