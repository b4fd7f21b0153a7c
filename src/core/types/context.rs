//! In-flight accumulator for exactly one external call
//!
//! A `RequestContext` is created when a call begins, mutated by the response
//! processor or the streaming tracker, flattened once into an attribute record
//! for the persistence boundary and then dropped. It is never shared between
//! concurrent calls.

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::metrics::Metrics;
use super::provider::{ModelType, PricingTierName, PricingUnit, Provider};

/// Placeholder model name used until the real model is known
pub const UNKNOWN_MODEL: &str = "unknown";

/// Reference to an application object the call should be attributed to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackableRef {
    pub kind: String,
    pub id: String,
}

/// Request context for one instrumented call
#[derive(Debug, Clone)]
pub struct RequestContext {
    // identity
    pub id: String,
    pub trace_id: Option<String>,
    pub span_id: Option<String>,
    pub parent_span_id: Option<String>,

    // classification
    pub provider: Provider,
    /// Canonical model name, `UNKNOWN_MODEL` until resolved
    pub model: String,
    /// Provider-declared point release when it differs from `model`
    pub model_snapshot: Option<String>,
    pub model_type: Option<ModelType>,
    pub endpoint: Option<String>,
    pub host: Option<String>,
    /// Original request payload, when the caller has it
    pub request_body: Option<Value>,

    // usage
    pub usage: Metrics,
    pub tool_calls: BTreeMap<String, u64>,
    pub has_tool_calls: bool,
    pub has_reasoning: bool,
    pub reasoning_effort: Option<String>,

    // economics, in cents
    pub prompt_cost: Option<f64>,
    pub completion_cost: Option<f64>,
    pub tool_cost: f64,
    pub total_cost: f64,
    pub currency: String,
    pub pricing_tier: Option<PricingTierName>,
    pub pricing_unit: Option<PricingUnit>,

    // timing
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub latency_ms: Option<u64>,
    pub time_to_first_token_ms: Option<u64>,
    started: Instant,

    // outcome
    pub http_status: Option<u16>,
    pub error_type: Option<String>,
    pub error_message: Option<String>,
    pub finish_reason: Option<String>,
    pub streamed: bool,

    // media
    pub response_text: Option<String>,
    pub media_urls: Vec<String>,
    pub expires_at: Option<DateTime<Utc>>,
    /// Raw binary response held until media storage has taken it
    pub binary_payload: Option<Vec<u8>>,

    // enrichment
    pub tags: Vec<String>,
    pub metadata: Map<String, Value>,
    pub trackable: Option<TrackableRef>,

    // processing
    /// Set once extraction side effects have run
    pub processed: bool,
    /// Sink handle of the stored record; a context is persisted at most once
    pub persisted_as: Option<String>,
    pub(crate) usage_fallback: Option<Metrics>,
    pub(crate) sanitized_body: Option<Value>,
}

impl RequestContext {
    /// Create a context for a call that is starting now
    pub fn new(provider: Provider) -> Self {
        RequestContextBuilder::new(provider).build()
    }

    pub fn builder(provider: Provider) -> RequestContextBuilder {
        RequestContextBuilder::new(provider)
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_request_body(mut self, body: Value) -> Self {
        self.request_body = Some(body);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn with_pricing_tier(mut self, tier: PricingTierName) -> Self {
        self.pricing_tier = Some(tier);
        self
    }

    pub fn has_known_model(&self) -> bool {
        !self.model.is_empty() && self.model != UNKNOWN_MODEL
    }

    /// Reconcile a provider-declared model with the requested one.
    ///
    /// An unknown canonical model adopts the declared name; otherwise a
    /// differing declared name is kept as the snapshot.
    pub fn reconcile_model(&mut self, declared: &str) {
        let declared = declared.trim();
        if declared.is_empty() || declared == self.model {
            return;
        }
        if self.has_known_model() {
            self.model_snapshot = Some(declared.to_string());
        } else {
            self.model = declared.to_string();
        }
    }

    /// Milliseconds since the call started
    pub fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    /// Stamp time-to-first-token if it has not been stamped yet
    pub fn mark_first_token(&mut self) {
        if self.time_to_first_token_ms.is_none() {
            self.time_to_first_token_ms = Some(self.elapsed_ms());
        }
    }

    /// Stamp completion time and latency
    pub fn mark_completed(&mut self) {
        if self.completed_at.is_none() {
            self.completed_at = Some(Utc::now());
            self.latency_ms = Some(self.elapsed_ms());
        }
    }

    /// Record a failed call, keeping whatever usage has accumulated
    pub fn record_failure(
        &mut self,
        http_status: Option<u16>,
        error_type: impl Into<String>,
        message: impl Into<String>,
    ) {
        if http_status.is_some() {
            self.http_status = http_status;
        }
        self.error_type = Some(error_type.into());
        self.error_message = Some(message.into());
        self.mark_completed();
    }

    pub fn is_failed(&self) -> bool {
        self.error_type.is_some()
    }

    /// Flatten the context into the record handed to the persistence boundary
    pub fn to_attributes(&self) -> Map<String, Value> {
        let tokens = self.usage.tokens_or_default();
        let mut attrs = Map::new();

        attrs.insert("id".into(), json!(self.id));
        attrs.insert("trace_id".into(), json!(self.trace_id));
        attrs.insert("span_id".into(), json!(self.span_id));
        attrs.insert("parent_span_id".into(), json!(self.parent_span_id));

        attrs.insert("provider".into(), json!(self.provider.as_str()));
        attrs.insert("model".into(), json!(self.model));
        attrs.insert("model_snapshot".into(), json!(self.model_snapshot));
        attrs.insert(
            "model_type".into(),
            json!(self.model_type.map(|t| t.as_str())),
        );
        attrs.insert("endpoint".into(), json!(self.endpoint));
        attrs.insert("host".into(), json!(self.host));

        attrs.insert("prompt_tokens".into(), json!(tokens.prompt_tokens));
        attrs.insert("completion_tokens".into(), json!(tokens.completion_tokens));
        attrs.insert("total_tokens".into(), json!(tokens.total_tokens()));
        attrs.insert("cached_tokens".into(), json!(tokens.cached_tokens));
        attrs.insert("reasoning_tokens".into(), json!(tokens.reasoning_tokens));
        attrs.insert(
            "cache_write_5m_tokens".into(),
            json!(tokens.cache_write_5m_tokens),
        );
        attrs.insert(
            "cache_write_1h_tokens".into(),
            json!(tokens.cache_write_1h_tokens),
        );
        attrs.insert("duration_seconds".into(), json!(self.usage.duration_seconds()));
        attrs.insert("characters".into(), json!(self.usage.input_characters()));
        attrs.insert("image_count".into(), json!(self.usage.image_count()));
        attrs.insert("video_count".into(), json!(self.usage.video_count()));
        attrs.insert("tool_calls".into(), json!(self.tool_calls));
        attrs.insert("has_tool_calls".into(), json!(self.has_tool_calls));
        attrs.insert("has_reasoning".into(), json!(self.has_reasoning));
        attrs.insert("reasoning_effort".into(), json!(self.reasoning_effort));

        attrs.insert("prompt_cost".into(), json!(self.prompt_cost));
        attrs.insert("completion_cost".into(), json!(self.completion_cost));
        attrs.insert("tool_cost".into(), json!(self.tool_cost));
        attrs.insert("total_cost".into(), json!(self.total_cost));
        attrs.insert("currency".into(), json!(self.currency));
        attrs.insert(
            "pricing_tier".into(),
            json!(self.pricing_tier.map(|t| t.as_str())),
        );
        attrs.insert(
            "pricing_unit".into(),
            json!(self.pricing_unit.map(|u| u.as_str())),
        );

        attrs.insert("started_at".into(), json!(self.started_at.to_rfc3339()));
        attrs.insert(
            "completed_at".into(),
            json!(self.completed_at.map(|t| t.to_rfc3339())),
        );
        attrs.insert("latency_ms".into(), json!(self.latency_ms));
        attrs.insert(
            "time_to_first_token_ms".into(),
            json!(self.time_to_first_token_ms),
        );

        attrs.insert("http_status".into(), json!(self.http_status));
        attrs.insert("error_type".into(), json!(self.error_type));
        attrs.insert("error_message".into(), json!(self.error_message));
        attrs.insert("finish_reason".into(), json!(self.finish_reason));
        attrs.insert("streamed".into(), json!(self.streamed));

        attrs.insert("response_text".into(), json!(self.response_text));
        attrs.insert("media_urls".into(), json!(self.media_urls));
        attrs.insert(
            "expires_at".into(),
            json!(self.expires_at.map(|t| t.to_rfc3339())),
        );

        attrs.insert("tags".into(), json!(self.tags));
        attrs.insert("metadata".into(), Value::Object(self.metadata.clone()));
        attrs.insert(
            "trackable_type".into(),
            json!(self.trackable.as_ref().map(|t| t.kind.as_str())),
        );
        attrs.insert(
            "trackable_id".into(),
            json!(self.trackable.as_ref().map(|t| t.id.as_str())),
        );

        attrs
    }
}

/// Collects what the caller knows before a call starts.
///
/// The streaming tracker holds one of these until the first chunk arrives so
/// the model can be sniffed from the stream itself.
#[derive(Debug, Clone)]
pub struct RequestContextBuilder {
    provider: Provider,
    id: Option<String>,
    trace_id: Option<String>,
    span_id: Option<String>,
    parent_span_id: Option<String>,
    model: Option<String>,
    endpoint: Option<String>,
    host: Option<String>,
    request_body: Option<Value>,
    pricing_tier: Option<PricingTierName>,
    currency: Option<String>,
    tags: Vec<String>,
    metadata: Map<String, Value>,
    trackable: Option<TrackableRef>,
    started_at: DateTime<Utc>,
    started: Instant,
}

impl RequestContextBuilder {
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            id: None,
            trace_id: None,
            span_id: None,
            parent_span_id: None,
            model: None,
            endpoint: None,
            host: None,
            request_body: None,
            pricing_tier: None,
            currency: None,
            tags: Vec::new(),
            metadata: Map::new(),
            trackable: None,
            started_at: Utc::now(),
            started: Instant::now(),
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn trace(
        mut self,
        trace_id: impl Into<String>,
        span_id: Option<String>,
        parent_span_id: Option<String>,
    ) -> Self {
        self.trace_id = Some(trace_id.into());
        self.span_id = span_id;
        self.parent_span_id = parent_span_id;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn request_body(mut self, body: Value) -> Self {
        self.request_body = Some(body);
        self
    }

    pub fn pricing_tier(mut self, tier: PricingTierName) -> Self {
        self.pricing_tier = Some(tier);
        self
    }

    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn trackable(mut self, kind: impl Into<String>, id: impl Into<String>) -> Self {
        self.trackable = Some(TrackableRef {
            kind: kind.into(),
            id: id.into(),
        });
        self
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn endpoint_ref(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    pub fn has_model(&self) -> bool {
        self.model.as_deref().is_some_and(|m| !m.is_empty() && m != UNKNOWN_MODEL)
    }

    /// Build the context, keeping the start time captured by `new`
    pub fn build(self) -> RequestContext {
        RequestContext {
            id: self.id.unwrap_or_else(crate::utils::logging::new_request_id),
            trace_id: self.trace_id,
            span_id: self.span_id,
            parent_span_id: self.parent_span_id,
            provider: self.provider,
            model: self.model.unwrap_or_else(|| UNKNOWN_MODEL.to_string()),
            model_snapshot: None,
            model_type: None,
            endpoint: self.endpoint,
            host: self.host,
            request_body: self.request_body,
            usage: Metrics::default(),
            tool_calls: BTreeMap::new(),
            has_tool_calls: false,
            has_reasoning: false,
            reasoning_effort: None,
            prompt_cost: None,
            completion_cost: None,
            tool_cost: 0.0,
            total_cost: 0.0,
            currency: self.currency.unwrap_or_else(|| "USD".to_string()),
            pricing_tier: self.pricing_tier,
            pricing_unit: None,
            started_at: self.started_at,
            completed_at: None,
            latency_ms: None,
            time_to_first_token_ms: None,
            started: self.started,
            http_status: None,
            error_type: None,
            error_message: None,
            finish_reason: None,
            streamed: false,
            response_text: None,
            media_urls: Vec::new(),
            expires_at: None,
            binary_payload: None,
            tags: self.tags,
            metadata: self.metadata,
            trackable: self.trackable,
            processed: false,
            persisted_as: None,
            usage_fallback: None,
            sanitized_body: None,
        }
    }
}
