//! # llm-usage-rs
//!
//! Usage and cost metering for generative-AI provider calls.
//!
//! ## Features
//!
//! - **Provider handlers**: OpenAI, Azure OpenAI, Anthropic, Google Gemini and ElevenLabs
//!   responses normalized into one set of metrics
//! - **Streaming reconstruction**: SSE and chunked streams folded back into a single
//!   response, with time-to-first-token
//! - **Tiered pricing**: per-model price tables by token, image, minute, second,
//!   character or video, with service tiers and tool-call surcharges
//! - **Sanitized records**: base64 and binary payloads stripped before persistence
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use llm_usage::{InMemorySink, MeterConfig, Provider, ResponseBody, UsageMeter};
//! use serde_json::json;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let meter = UsageMeter::from_config(&MeterConfig::default(), Arc::new(InMemorySink::new()))?;
//!
//!     let mut ctx = meter
//!         .context(Provider::OpenAI)
//!         .endpoint("/v1/chat/completions")
//!         .build();
//!     let body = json!({
//!         "model": "gpt-4o",
//!         "choices": [{"message": {"content": "Hi"}, "finish_reason": "stop"}],
//!         "usage": {"prompt_tokens": 19, "completion_tokens": 10}
//!     });
//!     meter.record(&mut ctx, ResponseBody::Json(body))?;
//!     println!("cost: {} cents", ctx.total_cost);
//!     Ok(())
//! }
//! ```
//!
//! ## Streaming
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use llm_usage::{Provider, TrackedStream, UsageMeter};
//!
//! async fn relay<S>(meter: &UsageMeter, upstream: S) -> Result<(), Box<dyn std::error::Error>>
//! where
//!     S: futures::Stream<Item = Result<String, std::io::Error>> + Unpin,
//! {
//!     let tracker = meter.start_stream(
//!         meter.context(Provider::Anthropic).endpoint("/v1/messages"),
//!     );
//!     let mut stream = TrackedStream::new(upstream, tracker);
//!     while let Some(fragment) = stream.next().await {
//!         print!("{}", fragment?);
//!     }
//!     meter.finish_stream(stream.tracker_mut())?;
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod core;
pub mod services;
pub mod utils;

// Re-export main types
pub use config::{MeterConfig, Validate};
pub use utils::error::{MeterError, Result};

pub use core::cost::{CostBreakdown, CostCalculator, UsageQuantities};
pub use core::processing::{ProcessOutcome, ResponseProcessor};
pub use core::providers::{HandlerCapabilities, HandlerRegistry, ProviderHandler};
pub use core::streaming::{FinishedStream, StreamingTracker, TrackedIter, TrackedStream};
pub use core::types::{
    Metrics, ModelType, PricingTierName, PricingUnit, Provider, RequestContext,
    RequestContextBuilder, ResponseBody, TokenMetrics,
};
pub use services::{
    AudioDurationProbe, InMemorySink, MediaStore, PricingCatalog, RecordHandle, UsageMeter,
    UsageSink,
};

// Version information
/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
