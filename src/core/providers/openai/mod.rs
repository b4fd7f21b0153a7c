//! OpenAI response shapes
//!
//! One handler per endpoint family. Azure OpenAI reuses these parsers with
//! deployment-scoped endpoints, see [`super::azure`].

mod audio;
mod chat;
mod embeddings;
mod images;
mod responses;
mod videos;

use std::sync::Arc;

use serde_json::Value;

pub use audio::{SpeechHandler, TranscriptionHandler};
pub use chat::ChatCompletionsHandler;
pub use embeddings::EmbeddingsHandler;
pub use images::ImagesHandler;
pub use responses::ResponsesHandler;
pub use videos::VideosHandler;

pub(crate) use chat::{chat_usage, message_text};
pub(crate) use responses::{output_text, responses_usage};

use super::handler::ProviderHandler;
use super::shared::str_at;
use crate::core::types::PricingTierName;

/// Built-in API hosts
pub const HOSTS: &[&str] = &["api.openai.com"];

/// Handlers in resolution order
pub fn handlers() -> Vec<Arc<dyn ProviderHandler>> {
    vec![
        Arc::new(ChatCompletionsHandler),
        Arc::new(ResponsesHandler),
        Arc::new(EmbeddingsHandler),
        Arc::new(ImagesHandler),
        Arc::new(SpeechHandler),
        Arc::new(TranscriptionHandler),
        Arc::new(VideosHandler),
    ]
}

/// `service_tier` as sent in a request or echoed in a response
pub(crate) fn service_tier(body: &Value) -> Option<PricingTierName> {
    str_at(body, "service_tier").and_then(PricingTierName::from_provider_label)
}
