//! Provider handlers and the registry that resolves them
//!
//! Each provider module exposes its built-in hosts and an ordered list of
//! stateless handlers, one per response shape.

pub mod anthropic;
pub mod azure;
pub mod elevenlabs;
pub mod gemini;
pub mod handler;
pub mod openai;
pub mod pattern;
pub mod registry;
pub mod shared;

use std::sync::Arc;

pub use handler::{HandlerCapabilities, ProviderHandler};
pub use pattern::{CompiledPattern, PatternKind};
pub use registry::HandlerRegistry;

use crate::core::types::Provider;

/// Built-in handlers for a provider, in resolution order
pub fn builtin_handlers(provider: Provider) -> Vec<Arc<dyn ProviderHandler>> {
    match provider {
        Provider::OpenAI => openai::handlers(),
        Provider::Azure => azure::handlers(),
        Provider::Anthropic => anthropic::handlers(),
        Provider::Google => gemini::handlers(),
        Provider::ElevenLabs => elevenlabs::handlers(),
    }
}

/// Built-in host patterns for a provider
pub fn builtin_hosts(provider: Provider) -> &'static [&'static str] {
    match provider {
        Provider::OpenAI => openai::HOSTS,
        Provider::Azure => azure::HOSTS,
        Provider::Anthropic => anthropic::HOSTS,
        Provider::Google => gemini::HOSTS,
        Provider::ElevenLabs => elevenlabs::HOSTS,
    }
}
