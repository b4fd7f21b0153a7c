//! Provider response-shape handlers
//!
//! A handler is a stateless parser bound to one provider and one response
//! shape. Optional behaviour is advertised through [`HandlerCapabilities`]
//! rather than discovered by type checks, so the registry and the processor
//! can decide what to call from plain data.

use std::fmt;

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::shared::str_at;
use crate::core::streaming::StreamHandler;
use crate::core::types::{Metrics, ModelType, PricingTierName, ResponseBody};

/// Optional capabilities a handler may declare
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandlerCapabilities {
    /// Responses are raw bytes rather than JSON
    pub binary_response: bool,
    /// Some responses must be ignored (e.g. an async job still pending)
    pub skippable: bool,
    /// Returned media expires and carries an expiry timestamp
    pub expiring_media: bool,
    /// Returned media can be handed to the media store
    pub storable_media: bool,
    /// The endpoint can stream; `stream_handler` returns a handler
    pub streaming: bool,
    /// The pricing tier can be read from the request payload
    pub tier_from_request: bool,
    /// The pricing tier can be read from the response payload
    pub tier_from_response: bool,
    /// The request's model field is not a model name (e.g. a deployment)
    pub model_from_response_only: bool,
}

impl HandlerCapabilities {
    pub const NONE: HandlerCapabilities = HandlerCapabilities {
        binary_response: false,
        skippable: false,
        expiring_media: false,
        storable_media: false,
        streaming: false,
        tier_from_request: false,
        tier_from_response: false,
        model_from_response_only: false,
    };
}

/// Parser for one provider response shape
pub trait ProviderHandler: Send + Sync + fmt::Debug {
    /// Stable name used in logs
    fn name(&self) -> &'static str;

    /// Endpoint path patterns with `{placeholder}` segments
    fn endpoints(&self) -> &'static [&'static str];

    /// Kind of model this shape belongs to
    fn model_type(&self) -> ModelType;

    fn capabilities(&self) -> HandlerCapabilities {
        HandlerCapabilities::NONE
    }

    /// Structural check used when several handlers share an endpoint
    fn matches_response(&self, body: &ResponseBody) -> bool;

    /// Token/image/audio/video usage. `request` carries facts some providers
    /// only echo in the request, such as requested video length.
    fn extract_metrics(&self, request: Option<&Value>, body: &ResponseBody) -> Metrics;

    fn extract_model(&self, body: &Value) -> Option<String> {
        str_at(body, "model").map(str::to_string)
    }

    fn extract_model_from_request(&self, request: &Value) -> Option<String> {
        str_at(request, "model").map(str::to_string)
    }

    /// Model named in the endpoint path, for providers that route by URL
    fn extract_model_from_endpoint(&self, _path: &str) -> Option<String> {
        None
    }

    fn extract_finish_reason(&self, _body: &Value) -> Option<String> {
        None
    }

    /// Human-readable response text
    fn extract_response_text(&self, _body: &Value) -> Option<String> {
        None
    }

    /// Only consulted when `capabilities().skippable`
    fn should_skip(&self, _body: &Value) -> bool {
        false
    }

    /// Only consulted when `capabilities().expiring_media`
    fn extract_expiration(&self, _body: &Value) -> Option<DateTime<Utc>> {
        None
    }

    /// Only consulted when `capabilities().streaming`
    fn stream_handler(&self) -> Option<&'static dyn StreamHandler> {
        None
    }

    /// Only consulted when `capabilities().tier_from_request`
    fn extract_tier_from_request(&self, _request: &Value) -> Option<PricingTierName> {
        None
    }

    /// Only consulted when `capabilities().tier_from_response`
    fn extract_tier_from_response(&self, _body: &Value) -> Option<PricingTierName> {
        None
    }
}
