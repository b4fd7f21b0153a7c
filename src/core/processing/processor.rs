//! Response processor
//!
//! One-shot, idempotent extraction of everything a provider response
//! reports. Steps run in a fixed order because later steps read what
//! earlier ones wrote into the context.

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{debug, warn};

use super::generic;
use super::reasoning::{
    effort_enables_reasoning, effort_from_request, effort_from_response, has_reasoning_content,
};
use super::sanitize::{BINARY_MARKER, sanitize_json};
use super::tools::{finish_reason_implies_tools, tally_tool_calls};
use crate::core::cost::CostCalculator;
use crate::core::providers::{HandlerRegistry, ProviderHandler};
use crate::core::types::{
    AudioMetrics, Metrics, ModelType, PricingUnit, RequestContext, ResponseBody,
};
use crate::services::boundaries::{AudioDurationProbe, MediaStore};

/// Default minimum length of a string treated as inline base64
pub const DEFAULT_BASE64_MIN_LENGTH: usize = 256;

/// Result of processing one response
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessOutcome {
    /// Sanitized body (with the resolved finish reason merged in) and usage
    Processed { body: Value, usage: Metrics },
    /// The handler asked for this response to be ignored
    Skipped,
}

impl ProcessOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, ProcessOutcome::Skipped)
    }

    pub fn usage(&self) -> Option<&Metrics> {
        match self {
            ProcessOutcome::Processed { usage, .. } => Some(usage),
            ProcessOutcome::Skipped => None,
        }
    }

    pub fn body(&self) -> Option<&Value> {
        match self {
            ProcessOutcome::Processed { body, .. } => Some(body),
            ProcessOutcome::Skipped => None,
        }
    }
}

/// Extracts metrics and signals from resolved responses
#[derive(Clone)]
pub struct ResponseProcessor {
    registry: Arc<HandlerRegistry>,
    calculator: Arc<CostCalculator>,
    media_store: Option<Arc<dyn MediaStore>>,
    audio_probe: Option<Arc<dyn AudioDurationProbe>>,
    persist_media: bool,
    base64_min_length: usize,
}

impl std::fmt::Debug for ResponseProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseProcessor")
            .field("registry", &self.registry)
            .field("media_store", &self.media_store.is_some())
            .field("audio_probe", &self.audio_probe.is_some())
            .field("persist_media", &self.persist_media)
            .field("base64_min_length", &self.base64_min_length)
            .finish()
    }
}

impl ResponseProcessor {
    pub fn new(registry: Arc<HandlerRegistry>, calculator: Arc<CostCalculator>) -> Self {
        Self {
            registry,
            calculator,
            media_store: None,
            audio_probe: None,
            persist_media: false,
            base64_min_length: DEFAULT_BASE64_MIN_LENGTH,
        }
    }

    pub fn with_media_store(mut self, store: Arc<dyn MediaStore>) -> Self {
        self.media_store = Some(store);
        self
    }

    pub fn with_audio_probe(mut self, probe: Arc<dyn AudioDurationProbe>) -> Self {
        self.audio_probe = Some(probe);
        self
    }

    pub fn with_persist_media(mut self, persist: bool) -> Self {
        self.persist_media = persist;
        self
    }

    pub fn with_base64_min_length(mut self, min_length: usize) -> Self {
        self.base64_min_length = min_length;
        self
    }

    pub fn registry(&self) -> &Arc<HandlerRegistry> {
        &self.registry
    }

    pub fn calculator(&self) -> &Arc<CostCalculator> {
        &self.calculator
    }

    /// Process a response into the context.
    ///
    /// A context that was already processed returns its earlier result
    /// without repeating any side effect.
    pub fn process(&self, ctx: &mut RequestContext, body: ResponseBody) -> ProcessOutcome {
        if ctx.processed {
            debug!(request_id = %ctx.id, "Context already processed, returning previous usage");
            return ProcessOutcome::Processed {
                body: ctx.sanitized_body.clone().unwrap_or(Value::Null),
                usage: ctx.usage_fallback.unwrap_or(ctx.usage),
            };
        }

        let handler = self
            .registry
            .resolve(ctx.provider, ctx.endpoint.as_deref(), Some(&body));
        let json = body.json();
        let request = ctx.request_body.clone();

        match &handler {
            Some(handler) => {
                debug!(
                    request_id = %ctx.id,
                    provider = %ctx.provider,
                    handler = handler.name(),
                    "Resolved response handler"
                );
                let caps = handler.capabilities();
                if caps.skippable && handler.should_skip(json) {
                    debug!(request_id = %ctx.id, handler = handler.name(), "Skipping response");
                    return ProcessOutcome::Skipped;
                }
                self.extract_with_handler(ctx, handler.as_ref(), request.as_ref(), &body);
            }
            None => {
                debug!(
                    request_id = %ctx.id,
                    provider = %ctx.provider,
                    endpoint = ?ctx.endpoint,
                    "No handler resolved, using generic extraction"
                );
                self.extract_generic(ctx, json);
            }
        }

        self.tally_tools(ctx, json);
        self.detect_reasoning(ctx, request.as_ref(), json);

        ctx.pricing_unit = self
            .calculator
            .pricing_unit(ctx.provider, &ctx.model, ctx.model_type)
            .or_else(|| {
                ctx.model_snapshot.as_deref().and_then(|snapshot| {
                    self.calculator
                        .pricing_unit(ctx.provider, snapshot, ctx.model_type)
                })
            });

        self.probe_audio_duration(ctx, &body);

        if let Some(handler) = &handler {
            let caps = handler.capabilities();
            if caps.expiring_media {
                ctx.expires_at = handler.extract_expiration(json);
            }
            if caps.storable_media && self.persist_media {
                self.store_media(ctx, &body);
            }
        }

        let mut sanitized = match &body {
            ResponseBody::Binary { content_type, .. } => json!({
                "content": BINARY_MARKER,
                "content_type": content_type,
            }),
            ResponseBody::Json(value) => sanitize_json(value, self.base64_min_length),
        };
        if let (Some(map), Some(reason)) = (sanitized.as_object_mut(), &ctx.finish_reason) {
            map.insert("finish_reason".to_string(), json!(reason));
        }

        ctx.processed = true;
        ctx.usage_fallback = Some(ctx.usage);
        ctx.sanitized_body = Some(sanitized.clone());

        debug!(
            request_id = %ctx.id,
            model = %ctx.model,
            tokens = ctx.usage.tokens_or_default().total_tokens(),
            tool_calls = ctx.tool_calls.values().sum::<u64>(),
            "Processed response"
        );
        ProcessOutcome::Processed {
            body: sanitized,
            usage: ctx.usage,
        }
    }

    fn extract_with_handler(
        &self,
        ctx: &mut RequestContext,
        handler: &dyn ProviderHandler,
        request: Option<&Value>,
        body: &ResponseBody,
    ) {
        let json = body.json();
        let caps = handler.capabilities();

        if ctx.model_type.is_none() {
            ctx.model_type = Some(handler.model_type());
        }

        if let Some(declared) = handler.extract_model(json) {
            ctx.reconcile_model(&declared);
        }
        if !ctx.has_known_model() {
            let fallback = request
                .filter(|_| !caps.model_from_response_only)
                .and_then(|r| handler.extract_model_from_request(r))
                .or_else(|| {
                    ctx.endpoint
                        .as_deref()
                        .and_then(|e| handler.extract_model_from_endpoint(e))
                });
            if let Some(model) = fallback {
                ctx.model = model;
            }
        }

        if ctx.pricing_tier.is_none() && caps.tier_from_response {
            ctx.pricing_tier = handler.extract_tier_from_response(json);
        }
        if ctx.pricing_tier.is_none() && caps.tier_from_request {
            ctx.pricing_tier = request.and_then(|r| handler.extract_tier_from_request(r));
        }

        ctx.usage = handler.extract_metrics(request, body);

        if let Some(reason) = handler.extract_finish_reason(json) {
            ctx.finish_reason = Some(reason);
        }
        if ctx.response_text.is_none() {
            ctx.response_text = handler.extract_response_text(json);
        }
    }

    fn extract_generic(&self, ctx: &mut RequestContext, json: &Value) {
        if let Some(declared) = generic::extract_model(json) {
            ctx.reconcile_model(&declared);
        }
        if !ctx.has_known_model() {
            if let Some(model) = ctx
                .request_body
                .as_ref()
                .and_then(|r| r.get("model"))
                .and_then(Value::as_str)
            {
                ctx.model = model.to_string();
            }
        }
        ctx.usage = generic::extract_metrics(json);
        if let Some(reason) = generic::extract_finish_reason(json) {
            ctx.finish_reason = Some(reason);
        }
        if ctx.response_text.is_none() {
            ctx.response_text = generic::extract_response_text(json);
        }
    }

    fn tally_tools(&self, ctx: &mut RequestContext, json: &Value) {
        let tally = tally_tool_calls(json);
        if !tally.is_empty() {
            ctx.tool_calls = tally;
        }
        ctx.has_tool_calls = !ctx.tool_calls.is_empty()
            || ctx
                .finish_reason
                .as_deref()
                .is_some_and(finish_reason_implies_tools);
    }

    fn detect_reasoning(&self, ctx: &mut RequestContext, request: Option<&Value>, json: &Value) {
        let effort = request
            .and_then(effort_from_request)
            .or_else(|| effort_from_response(json));
        let reasoning_tokens = ctx.usage.tokens_or_default().reasoning_tokens;

        ctx.has_reasoning = ctx.has_reasoning
            || reasoning_tokens > 0
            || effort.as_deref().is_some_and(effort_enables_reasoning)
            || has_reasoning_content(json);
        if effort.is_some() {
            ctx.reasoning_effort = effort;
        }
    }

    /// Binary audio with no reported duration, for duration-priced models
    fn probe_audio_duration(&self, ctx: &mut RequestContext, body: &ResponseBody) {
        let Some(probe) = &self.audio_probe else {
            return;
        };
        let Some(data) = body.binary() else {
            return;
        };
        let duration_priced = matches!(
            ctx.pricing_unit,
            None | Some(PricingUnit::Minute) | Some(PricingUnit::Second)
        );
        if ctx.model_type != Some(ModelType::Audio)
            || ctx.usage.duration_seconds().is_some()
            || !duration_priced
        {
            return;
        }

        if let Some(seconds) = probe.duration_seconds(data) {
            let audio = ctx.usage.audio.unwrap_or_default();
            ctx.usage.audio = Some(AudioMetrics {
                duration_seconds: Some(seconds),
                ..audio
            });
        } else {
            debug!(request_id = %ctx.id, "Audio duration probe returned nothing");
        }
    }

    fn store_media(&self, ctx: &mut RequestContext, body: &ResponseBody) {
        let Some(store) = &self.media_store else {
            return;
        };
        let binary = body.binary().or(ctx.binary_payload.as_deref());
        match store.store(&ctx.id, body.json(), binary) {
            Ok(urls) => ctx.media_urls.extend(urls),
            Err(e) => warn!(request_id = %ctx.id, error = %e, "Media storage failed"),
        }
        ctx.binary_payload = None;
    }
}
