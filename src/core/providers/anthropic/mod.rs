//! Anthropic Messages API response shape

use std::sync::Arc;

use serde_json::Value;

use super::handler::{HandlerCapabilities, ProviderHandler};
use super::shared::{array_at, str_at, u64_at, u64_or_zero, value_at};
use crate::core::streaming::{AnthropicStream, StreamHandler};
use crate::core::types::{Metrics, ModelType, PricingTierName, ResponseBody, TokenMetrics};

/// Built-in API hosts
pub const HOSTS: &[&str] = &["api.anthropic.com"];

/// Handlers in resolution order
pub fn handlers() -> Vec<Arc<dyn ProviderHandler>> {
    vec![Arc::new(MessagesHandler)]
}

/// `/v1/messages`
#[derive(Debug, Clone, Copy, Default)]
pub struct MessagesHandler;

/// Anthropic usage block, as found on messages and `message_start` events.
///
/// `input_tokens` excludes cache reads and writes, so the prompt total is
/// rebuilt from all three. Cache writes are split by TTL when the breakdown
/// is present and otherwise attributed to the 5-minute cache.
pub(crate) fn anthropic_usage(usage: &Value) -> TokenMetrics {
    let input = u64_or_zero(usage, "input_tokens");
    let cache_read = u64_or_zero(usage, "cache_read_input_tokens");
    let cache_creation = u64_or_zero(usage, "cache_creation_input_tokens");

    let (write_5m, write_1h) = match (
        u64_at(usage, "cache_creation.ephemeral_5m_input_tokens"),
        u64_at(usage, "cache_creation.ephemeral_1h_input_tokens"),
    ) {
        (None, None) => (cache_creation, 0),
        (five, one) => (five.unwrap_or(0), one.unwrap_or(0)),
    };

    TokenMetrics {
        prompt_tokens: input
            .saturating_add(cache_read)
            .saturating_add(cache_creation),
        completion_tokens: u64_or_zero(usage, "output_tokens"),
        cached_tokens: cache_read,
        reasoning_tokens: 0,
        cache_write_5m_tokens: write_5m,
        cache_write_1h_tokens: write_1h,
    }
}

impl ProviderHandler for MessagesHandler {
    fn name(&self) -> &'static str {
        "anthropic.messages"
    }

    fn endpoints(&self) -> &'static [&'static str] {
        &["/v1/messages"]
    }

    fn model_type(&self) -> ModelType {
        ModelType::Text
    }

    fn capabilities(&self) -> HandlerCapabilities {
        HandlerCapabilities {
            streaming: true,
            tier_from_response: true,
            ..HandlerCapabilities::NONE
        }
    }

    fn matches_response(&self, body: &ResponseBody) -> bool {
        str_at(body.json(), "type") == Some("message")
    }

    fn extract_metrics(&self, _request: Option<&Value>, body: &ResponseBody) -> Metrics {
        match value_at(body.json(), "usage").filter(|u| u.is_object()) {
            Some(usage) => Metrics::from_tokens(anthropic_usage(usage)),
            None => Metrics::empty(),
        }
    }

    fn extract_finish_reason(&self, body: &Value) -> Option<String> {
        str_at(body, "stop_reason").map(str::to_string)
    }

    fn extract_response_text(&self, body: &Value) -> Option<String> {
        let text: String = array_at(body, "content")
            .iter()
            .filter(|block| str_at(block, "type") == Some("text"))
            .filter_map(|block| str_at(block, "text"))
            .collect();
        if text.is_empty() { None } else { Some(text) }
    }

    fn stream_handler(&self) -> Option<&'static dyn StreamHandler> {
        Some(&AnthropicStream)
    }

    fn extract_tier_from_response(&self, body: &Value) -> Option<PricingTierName> {
        str_at(body, "usage.service_tier").and_then(PricingTierName::from_provider_label)
    }
}
