//! Usage meter
//!
//! Wires the handler registry, response processor, cost calculator and
//! persistence sink together. One `UsageMeter` is built at startup and
//! shared; each call gets its own [`RequestContext`].

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::boundaries::{AudioDurationProbe, MediaStore, RecordHandle, UsageSink};
use crate::config::MeterConfig;
use crate::core::cost::{CostBreakdown, CostCalculator};
use crate::core::processing::ResponseProcessor;
use crate::core::providers::{HandlerRegistry, ProviderHandler};
use crate::core::streaming::StreamingTracker;
use crate::core::types::{Provider, RequestContext, RequestContextBuilder, ResponseBody};
use crate::utils::error::{MeterError, Result};

/// Meters provider calls: process, price, persist
#[derive(Debug, Clone)]
pub struct UsageMeter {
    registry: Arc<HandlerRegistry>,
    processor: Arc<ResponseProcessor>,
    sink: Arc<dyn UsageSink>,
    currency: String,
}

impl UsageMeter {
    /// Build a meter from configuration
    pub fn from_config(config: &MeterConfig, sink: Arc<dyn UsageSink>) -> Result<Self> {
        info!("Initializing usage meter");

        debug!("Building handler registry");
        let registry = Arc::new(HandlerRegistry::from_config(config)?);

        debug!(catalog = ?config.pricing_catalog, "Loading pricing catalog");
        let catalog = Arc::new(config.load_catalog()?);
        let calculator = Arc::new(CostCalculator::new(catalog));

        let processor = ResponseProcessor::new(Arc::clone(&registry), calculator)
            .with_persist_media(config.persist_media)
            .with_base64_min_length(config.sanitize.base64_min_length);

        info!(
            models = processor.calculator().catalog().len(),
            persist_media = config.persist_media,
            "Usage meter initialized"
        );
        Ok(Self {
            registry,
            processor: Arc::new(processor),
            sink,
            currency: config.default_currency.clone(),
        })
    }

    /// Meter assembled from existing parts
    pub fn new(processor: Arc<ResponseProcessor>, sink: Arc<dyn UsageSink>) -> Self {
        Self {
            registry: Arc::clone(processor.registry()),
            processor,
            sink,
            currency: "USD".to_string(),
        }
    }

    pub fn with_media_store(mut self, store: Arc<dyn MediaStore>) -> Self {
        let processor = (*self.processor).clone().with_media_store(store);
        self.processor = Arc::new(processor);
        self
    }

    pub fn with_audio_probe(mut self, probe: Arc<dyn AudioDurationProbe>) -> Self {
        let processor = (*self.processor).clone().with_audio_probe(probe);
        self.processor = Arc::new(processor);
        self
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn processor(&self) -> &Arc<ResponseProcessor> {
        &self.processor
    }

    pub fn calculator(&self) -> &CostCalculator {
        self.processor.calculator()
    }

    /// Context builder preset with the configured currency
    pub fn context(&self, provider: Provider) -> RequestContextBuilder {
        RequestContext::builder(provider).currency(self.currency.clone())
    }

    /// Provider that serves `host`, if any
    pub fn detect_provider(&self, host: &str) -> Option<Provider> {
        self.registry.detect_provider(host)
    }

    /// Fill in what the request alone tells us before the call is made.
    ///
    /// Resolves the handler from the endpoint only, takes the model from the
    /// request when the context has none and the pricing tier when the
    /// handler reads one from requests.
    pub fn prepare(&self, ctx: &mut RequestContext) -> Option<Arc<dyn ProviderHandler>> {
        let handler = self
            .registry
            .resolve(ctx.provider, ctx.endpoint.as_deref(), None)?;
        let caps = handler.capabilities();

        if let Some(request) = &ctx.request_body {
            if !ctx.has_known_model() && !caps.model_from_response_only {
                if let Some(model) = handler.extract_model_from_request(request) {
                    ctx.model = model;
                }
            }
            if ctx.pricing_tier.is_none() && caps.tier_from_request {
                ctx.pricing_tier = handler.extract_tier_from_request(request);
            }
        }
        if !ctx.has_known_model() {
            if let Some(model) = ctx
                .endpoint
                .as_deref()
                .and_then(|path| handler.extract_model_from_endpoint(path))
            {
                ctx.model = model;
            }
        }

        debug!(
            request_id = %ctx.id,
            provider = %ctx.provider,
            handler = handler.name(),
            model = %ctx.model,
            tier = ?ctx.pricing_tier,
            "Prepared request context"
        );
        Some(handler)
    }

    /// Process a complete response, price it and persist the record.
    ///
    /// Returns `None` when the handler skipped the response.
    pub fn record(
        &self,
        ctx: &mut RequestContext,
        body: ResponseBody,
    ) -> Result<Option<RecordHandle>> {
        if let Some(handle) = stored_handle(ctx) {
            debug!(request_id = %ctx.id, "Context already recorded");
            return Ok(Some(handle));
        }
        let outcome = self.processor.process(ctx, body);
        if outcome.is_skipped() {
            debug!(request_id = %ctx.id, "Response skipped, nothing recorded");
            return Ok(None);
        }
        ctx.mark_completed();
        self.price(ctx);
        self.persist(ctx).map(Some)
    }

    /// Record a call that failed, keeping any usage already gathered
    pub fn record_failure(
        &self,
        ctx: &mut RequestContext,
        http_status: Option<u16>,
        error_type: &str,
        message: &str,
    ) -> Result<RecordHandle> {
        if let Some(handle) = stored_handle(ctx) {
            debug!(request_id = %ctx.id, "Context already recorded");
            return Ok(handle);
        }
        ctx.record_failure(http_status, error_type, message);
        self.price(ctx);
        self.persist(ctx)
    }

    /// Start tracking a streamed response
    pub fn start_stream(&self, builder: RequestContextBuilder) -> StreamingTracker {
        StreamingTracker::new(Arc::clone(&self.processor), builder)
    }

    /// Finish a stream, price it and persist the record.
    ///
    /// Errored streams are recorded with their partial usage. A stream that
    /// was already finished fails with `StreamFinished`.
    pub fn finish_stream(&self, tracker: &mut StreamingTracker) -> Result<Option<RecordHandle>> {
        let finished = tracker.finish()?;
        if finished.outcome.as_ref().is_some_and(|o| o.is_skipped()) {
            debug!(request_id = %finished.context.id, "Stream response skipped");
            return Ok(None);
        }
        let mut ctx = finished.context;
        self.price(&mut ctx);
        self.persist(&mut ctx).map(Some)
    }

    fn price(&self, ctx: &mut RequestContext) -> CostBreakdown {
        let breakdown = self.processor.calculator().price_context(ctx);
        debug!(
            request_id = %ctx.id,
            model = %ctx.model,
            total_cost = ctx.total_cost,
            model_found = breakdown.model_found,
            "Priced request"
        );
        breakdown
    }

    fn persist(&self, ctx: &mut RequestContext) -> Result<RecordHandle> {
        if let Some(handle) = stored_handle(ctx) {
            return Ok(handle);
        }
        let mut record = ctx.to_attributes();
        if let Some(body) = &ctx.sanitized_body {
            record.insert("response_body".into(), body.clone());
        }
        let handle = self.sink.store(record).map_err(|e| {
            warn!(request_id = %ctx.id, error = %e, "Failed to persist usage record");
            match e {
                MeterError::Storage(_) => e,
                other => MeterError::storage(other.to_string()),
            }
        })?;
        ctx.persisted_as = Some(handle.0.clone());
        Ok(handle)
    }
}

fn stored_handle(ctx: &RequestContext) -> Option<RecordHandle> {
    ctx.persisted_as.clone().map(RecordHandle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::streaming::STREAM_ERROR;
    use crate::core::types::PricingTierName;
    use crate::services::boundaries::InMemorySink;
    use serde_json::{Map, Value, json};

    #[derive(Debug)]
    struct FailingSink;

    impl UsageSink for FailingSink {
        fn store(&self, _record: Map<String, Value>) -> Result<RecordHandle> {
            Err(MeterError::Io(std::io::Error::other("disk full")))
        }
    }

    fn meter() -> (UsageMeter, Arc<InMemorySink>) {
        let sink = Arc::new(InMemorySink::new());
        let meter = UsageMeter::from_config(&MeterConfig::default(), sink.clone()).unwrap();
        (meter, sink)
    }

    #[test]
    fn test_record_chat_completion() {
        let (meter, sink) = meter();
        let mut ctx = meter
            .context(Provider::OpenAI)
            .endpoint("/v1/chat/completions")
            .build();
        let body = json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "model": "gpt-4o-mini-2024-07-18",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Hi"},
                "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 19, "completion_tokens": 10, "total_tokens": 29}
        });

        let handle = meter.record(&mut ctx, ResponseBody::Json(body)).unwrap();
        assert_eq!(handle, Some(RecordHandle(ctx.id.clone())));
        assert!(ctx.total_cost > 0.0);

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["prompt_tokens"], json!(19));
        assert_eq!(records[0]["model"], json!("gpt-4o-mini-2024-07-18"));
        assert_eq!(records[0]["currency"], json!("USD"));
        assert!(records[0]["response_body"].is_object());
    }

    #[test]
    fn test_record_twice_stores_once() {
        let (meter, sink) = meter();
        let mut ctx = meter
            .context(Provider::OpenAI)
            .endpoint("/v1/chat/completions")
            .build();
        let body = json!({
            "id": "chatcmpl-9", "object": "chat.completion", "model": "gpt-4o",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Hi"},
                "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3}
        });

        let first = meter.record(&mut ctx, ResponseBody::Json(body.clone())).unwrap();
        let cost = ctx.total_cost;
        let second = meter.record(&mut ctx, ResponseBody::Json(body)).unwrap();
        assert_eq!(first, second);
        assert_eq!(ctx.total_cost, cost);

        let again = meter
            .record_failure(&mut ctx, Some(500), "server_error", "late failure")
            .unwrap();
        assert_eq!(Some(again), first);
        assert!(ctx.error_type.is_none());
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_record_extreme_usage() {
        let (meter, sink) = meter();
        let mut ctx = meter
            .context(Provider::Anthropic)
            .endpoint("/v1/messages")
            .build();
        let body = json!({
            "id": "msg_1", "type": "message", "model": "claude-sonnet-4-20250514",
            "content": [{"type": "text", "text": "ok"}],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": u64::MAX, "cache_read_input_tokens": 5,
                "output_tokens": u64::MAX}
        });

        assert!(meter.record(&mut ctx, ResponseBody::Json(body)).unwrap().is_some());
        assert!(ctx.total_cost.is_finite());
        assert_eq!(sink.records()[0]["total_tokens"], json!(u64::MAX));
    }

    #[test]
    fn test_prepare_reads_request() {
        let (meter, _) = meter();
        let mut ctx = meter
            .context(Provider::OpenAI)
            .endpoint("/v1/images/generations")
            .request_body(json!({"model": "dall-e-3", "prompt": "a cat", "quality": "hd"}))
            .build();

        let handler = meter.prepare(&mut ctx).unwrap();
        assert_eq!(handler.name(), "openai.images");
        assert_eq!(ctx.model, "dall-e-3");
        assert_eq!(ctx.pricing_tier, Some(PricingTierName::Hd));
    }

    #[test]
    fn test_prepare_unknown_endpoint() {
        let (meter, _) = meter();
        let mut ctx = meter
            .context(Provider::OpenAI)
            .endpoint("/v1/files")
            .build();
        assert!(meter.prepare(&mut ctx).is_none());
    }

    #[test]
    fn test_skipped_response_is_not_recorded() {
        let (meter, sink) = meter();
        let mut ctx = meter
            .context(Provider::OpenAI)
            .endpoint("/v1/videos")
            .build();
        let body = json!({"id": "video_1", "object": "video", "model": "sora-2",
            "status": "in_progress"});

        assert_eq!(meter.record(&mut ctx, ResponseBody::Json(body)).unwrap(), None);
        assert!(sink.is_empty());
        assert!(!ctx.processed);
    }

    #[test]
    fn test_sink_failure_is_storage_error() {
        let meter =
            UsageMeter::from_config(&MeterConfig::default(), Arc::new(FailingSink)).unwrap();
        let mut ctx = meter.context(Provider::Anthropic).build();
        let result = meter.record_failure(&mut ctx, Some(529), "overloaded_error", "Overloaded");
        assert!(matches!(result, Err(MeterError::Storage(_))));
    }

    #[test]
    fn test_record_failure() {
        let (meter, sink) = meter();
        let mut ctx = meter
            .context(Provider::Anthropic)
            .model("claude-sonnet-4-20250514")
            .build();
        meter
            .record_failure(&mut ctx, Some(429), "rate_limit_error", "Too many requests")
            .unwrap();

        let records = sink.records();
        assert_eq!(records[0]["http_status"], json!(429));
        assert_eq!(records[0]["error_type"], json!("rate_limit_error"));
        assert_eq!(records[0]["total_cost"], json!(0.0));
        assert!(records[0]["completed_at"].is_string());
    }

    #[test]
    fn test_stream_lifecycle() {
        let (meter, sink) = meter();
        let mut tracker = meter.start_stream(
            meter
                .context(Provider::OpenAI)
                .endpoint("/v1/chat/completions")
                .model("gpt-4o-mini"),
        );
        tracker.observe(json!({
            "id": "chatcmpl-2", "object": "chat.completion.chunk", "model": "gpt-4o-mini",
            "choices": [{"index": 0, "delta": {"content": "Hey"}, "finish_reason": null}]
        }));
        tracker.observe(json!({
            "id": "chatcmpl-2", "object": "chat.completion.chunk", "model": "gpt-4o-mini",
            "choices": [{"index": 0, "delta": {}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 8, "completion_tokens": 1}
        }));

        assert!(meter.finish_stream(&mut tracker).unwrap().is_some());
        assert!(matches!(
            meter.finish_stream(&mut tracker),
            Err(MeterError::StreamFinished(_))
        ));

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["streamed"], json!(true));
        assert_eq!(records[0]["completion_tokens"], json!(1));
        assert_eq!(records[0]["response_text"], json!("Hey"));
    }

    #[test]
    fn test_errored_stream_is_recorded() {
        let (meter, sink) = meter();
        let mut tracker = meter.start_stream(
            meter
                .context(Provider::OpenAI)
                .endpoint("/v1/chat/completions"),
        );
        tracker.observe(json!({
            "id": "chatcmpl-3", "object": "chat.completion.chunk", "model": "gpt-4o",
            "choices": [{"index": 0, "delta": {"content": "par"}, "finish_reason": null}]
        }));
        tracker.record_error("connection reset");

        assert!(meter.finish_stream(&mut tracker).unwrap().is_some());
        let records = sink.records();
        assert_eq!(records[0]["error_type"], json!(STREAM_ERROR));
        assert_eq!(records[0]["response_text"], json!("par"));
    }
}
