//! Core type definitions
//!
//! Provider classification, normalized metrics and the per-call context.

pub mod body;
pub mod context;
pub mod metrics;
pub mod provider;

pub use body::ResponseBody;
pub use context::{RequestContext, RequestContextBuilder, TrackableRef, UNKNOWN_MODEL};
pub use metrics::{AudioMetrics, ImageMetrics, Metrics, TokenMetrics, VideoMetrics};
pub use provider::{ModelType, PricingTierName, PricingUnit, Provider};
