use serde_json::Value;

use crate::core::providers::handler::{HandlerCapabilities, ProviderHandler};
use crate::core::providers::shared::{array_at, str_at, u64_or_zero, value_at};
use crate::core::streaming::{OpenAIResponsesStream, StreamHandler};
use crate::core::types::{Metrics, ModelType, PricingTierName, ResponseBody, TokenMetrics};

/// `/v1/responses`
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponsesHandler;

pub(crate) fn responses_usage(usage: &Value) -> Option<TokenMetrics> {
    if !usage.is_object() {
        return None;
    }
    Some(
        TokenMetrics::new(
            u64_or_zero(usage, "input_tokens"),
            u64_or_zero(usage, "output_tokens"),
        )
        .with_cached(u64_or_zero(usage, "input_tokens_details.cached_tokens"))
        .with_reasoning(u64_or_zero(usage, "output_tokens_details.reasoning_tokens")),
    )
}

/// Concatenated `output_text` parts of every message item
pub(crate) fn output_text(body: &Value) -> Option<String> {
    if let Some(text) = str_at(body, "output_text").filter(|t| !t.is_empty()) {
        return Some(text.to_string());
    }
    let text: String = array_at(body, "output")
        .iter()
        .filter(|item| str_at(item, "type") == Some("message"))
        .flat_map(|item| array_at(item, "content"))
        .filter(|part| str_at(part, "type") == Some("output_text"))
        .filter_map(|part| str_at(part, "text"))
        .collect();
    if text.is_empty() { None } else { Some(text) }
}

impl ProviderHandler for ResponsesHandler {
    fn name(&self) -> &'static str {
        "openai.responses"
    }

    fn endpoints(&self) -> &'static [&'static str] {
        &["/v1/responses", "/v1/responses/{response_id}", "/responses"]
    }

    fn model_type(&self) -> ModelType {
        ModelType::Text
    }

    fn capabilities(&self) -> HandlerCapabilities {
        HandlerCapabilities {
            streaming: true,
            storable_media: true,
            tier_from_request: true,
            tier_from_response: true,
            ..HandlerCapabilities::NONE
        }
    }

    fn matches_response(&self, body: &ResponseBody) -> bool {
        let json = body.json();
        str_at(json, "object") == Some("response")
            || value_at(json, "output").is_some_and(Value::is_array)
    }

    fn extract_metrics(&self, _request: Option<&Value>, body: &ResponseBody) -> Metrics {
        let json = body.json();
        let mut metrics = Metrics::empty();
        if let Some(tokens) = value_at(json, "usage").and_then(responses_usage) {
            metrics = metrics.with_tokens(tokens);
        }
        let images = array_at(json, "output")
            .iter()
            .filter(|item| str_at(item, "type") == Some("image_generation_call"))
            .count() as u64;
        if images > 0 {
            metrics = metrics.with_images(images);
        }
        metrics
    }

    fn extract_finish_reason(&self, body: &Value) -> Option<String> {
        // An incomplete response explains itself; otherwise the status is the reason.
        str_at(body, "incomplete_details.reason")
            .or_else(|| str_at(body, "status"))
            .map(str::to_string)
    }

    fn extract_response_text(&self, body: &Value) -> Option<String> {
        output_text(body)
    }

    fn stream_handler(&self) -> Option<&'static dyn StreamHandler> {
        Some(&OpenAIResponsesStream)
    }

    fn extract_tier_from_request(&self, request: &Value) -> Option<PricingTierName> {
        super::service_tier(request)
    }

    fn extract_tier_from_response(&self, body: &Value) -> Option<PricingTierName> {
        super::service_tier(body)
    }
}
