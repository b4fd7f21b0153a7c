use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

use crate::core::providers::handler::{HandlerCapabilities, ProviderHandler};
use crate::core::providers::shared::{array_at, str_at, u64_at, u64_or_zero, value_at};
use crate::core::types::{Metrics, ModelType, PricingTierName, ResponseBody, TokenMetrics};

/// Generated image URLs stay downloadable for one hour
const IMAGE_URL_TTL_SECS: i64 = 3600;

/// `/v1/images/*`
#[derive(Debug, Clone, Copy, Default)]
pub struct ImagesHandler;

impl ProviderHandler for ImagesHandler {
    fn name(&self) -> &'static str {
        "openai.images"
    }

    fn endpoints(&self) -> &'static [&'static str] {
        &[
            "/v1/images/generations",
            "/v1/images/edits",
            "/v1/images/variations",
            "/images/generations",
        ]
    }

    fn model_type(&self) -> ModelType {
        ModelType::Image
    }

    fn capabilities(&self) -> HandlerCapabilities {
        HandlerCapabilities {
            storable_media: true,
            expiring_media: true,
            tier_from_request: true,
            ..HandlerCapabilities::NONE
        }
    }

    fn matches_response(&self, body: &ResponseBody) -> bool {
        array_at(body.json(), "data")
            .first()
            .is_some_and(|item| item.get("url").is_some() || item.get("b64_json").is_some())
    }

    fn extract_metrics(&self, _request: Option<&Value>, body: &ResponseBody) -> Metrics {
        let json = body.json();
        let mut metrics = Metrics::empty().with_images(array_at(json, "data").len() as u64);
        // gpt-image models also bill text and image tokens
        if let Some(usage) = value_at(json, "usage").filter(|u| u.is_object()) {
            metrics = metrics.with_tokens(
                TokenMetrics::new(
                    u64_or_zero(usage, "input_tokens"),
                    u64_or_zero(usage, "output_tokens"),
                )
                .with_cached(u64_or_zero(usage, "input_tokens_details.cached_tokens")),
            );
        }
        metrics
    }

    fn extract_response_text(&self, body: &Value) -> Option<String> {
        str_at(body, "data.0.revised_prompt").map(str::to_string)
    }

    fn extract_expiration(&self, body: &Value) -> Option<DateTime<Utc>> {
        let has_urls = array_at(body, "data").iter().any(|item| item.get("url").is_some());
        if !has_urls {
            return None;
        }
        let created = u64_at(body, "created")?;
        DateTime::from_timestamp(i64::try_from(created).ok()?, 0)
            .map(|t| t + Duration::seconds(IMAGE_URL_TTL_SECS))
    }

    fn extract_tier_from_request(&self, request: &Value) -> Option<PricingTierName> {
        match str_at(request, "quality")? {
            "hd" => Some(PricingTierName::Hd),
            "standard" => Some(PricingTierName::Standard),
            _ => None,
        }
    }
}
