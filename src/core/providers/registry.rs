//! Handler Registry
//!
//! Maps (provider, endpoint, optional response body) to the handler that
//! understands the response shape, and request hosts to providers. Built once
//! at startup and read-only afterwards, so it can be shared behind an `Arc`.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, trace};

use super::handler::ProviderHandler;
use super::pattern::{CompiledPattern, PatternKind, normalize_host, normalize_path};
use crate::config::MeterConfig;
use crate::core::types::{Provider, ResponseBody};
use crate::utils::error::{MeterError, Result};

struct RegisteredHandler {
    handler: Arc<dyn ProviderHandler>,
    patterns: Vec<CompiledPattern>,
}

impl RegisteredHandler {
    fn matches_endpoint(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(path))
    }
}

/// Registry of response handlers and provider host patterns
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<Provider, Vec<RegisteredHandler>>,
    custom_hosts: Vec<(Provider, CompiledPattern)>,
    builtin_hosts: Vec<(Provider, CompiledPattern)>,
}

impl HandlerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in provider's handlers and hosts
    pub fn with_defaults() -> Result<Self> {
        let mut registry = Self::new();
        for provider in Provider::ALL {
            for handler in super::builtin_handlers(provider) {
                registry.register(provider, handler)?;
            }
            for host in super::builtin_hosts(provider) {
                registry.builtin_hosts.push((
                    provider,
                    CompiledPattern::compile(host, PatternKind::Host)?,
                ));
            }
        }
        Ok(registry)
    }

    /// Built-in registry plus operator-configured hosts
    pub fn from_config(config: &MeterConfig) -> Result<Self> {
        let mut registry = Self::with_defaults()?;
        for (name, hosts) in &config.custom_hosts {
            let provider: Provider = name.parse().map_err(MeterError::config)?;
            for host in hosts {
                registry.register_host(provider, host)?;
            }
        }
        Ok(registry)
    }

    /// Register a handler; declaration order is resolution order
    pub fn register(&mut self, provider: Provider, handler: Arc<dyn ProviderHandler>) -> Result<()> {
        let patterns = handler
            .endpoints()
            .iter()
            .map(|p| CompiledPattern::compile(p, PatternKind::Path))
            .collect::<Result<Vec<_>>>()?;
        debug!(provider = %provider, handler = handler.name(), "Registered response handler");
        self.handlers
            .entry(provider)
            .or_default()
            .push(RegisteredHandler { handler, patterns });
        Ok(())
    }

    /// Add a custom host pattern; custom hosts are checked before built-in ones
    pub fn register_host(&mut self, provider: Provider, pattern: &str) -> Result<()> {
        self.custom_hosts
            .push((provider, CompiledPattern::compile(pattern, PatternKind::Host)?));
        Ok(())
    }

    /// Handlers registered for a provider, in declaration order
    pub fn handlers(&self, provider: Provider) -> Vec<Arc<dyn ProviderHandler>> {
        self.handlers
            .get(&provider)
            .map(|hs| hs.iter().map(|h| Arc::clone(&h.handler)).collect())
            .unwrap_or_default()
    }

    /// Resolve the handler for a response.
    ///
    /// 1. keep handlers whose endpoint pattern matches (all of them when no
    ///    endpoint is known);
    /// 2. with a body, pick the unique structural match, or the first match
    ///    in declaration order when several agree;
    /// 3. without a body, fall back to the first candidate that streams,
    ///    then to the first candidate.
    pub fn resolve(
        &self,
        provider: Provider,
        endpoint: Option<&str>,
        body: Option<&ResponseBody>,
    ) -> Option<Arc<dyn ProviderHandler>> {
        let registered = self.handlers.get(&provider)?;

        let candidates: Vec<&RegisteredHandler> = match endpoint {
            Some(endpoint) => {
                let path = normalize_path(endpoint);
                registered.iter().filter(|h| h.matches_endpoint(path)).collect()
            }
            None => registered.iter().collect(),
        };

        if candidates.is_empty() {
            trace!(provider = %provider, endpoint = ?endpoint, "No handler matches endpoint");
            return None;
        }

        if let Some(body) = body {
            let matching: Vec<&&RegisteredHandler> = candidates
                .iter()
                .filter(|h| h.handler.matches_response(body))
                .collect();

            match matching.len() {
                1 => return Some(Arc::clone(&matching[0].handler)),
                n if n > 1 => {
                    debug!(
                        provider = %provider,
                        count = n,
                        "Several handlers match response shape, using first declared"
                    );
                    return Some(Arc::clone(&matching[0].handler));
                }
                _ if endpoint.is_none() => {
                    // Sniffing without an endpoint found nothing.
                    return None;
                }
                _ => {
                    if candidates.len() == 1 {
                        return Some(Arc::clone(&candidates[0].handler));
                    }
                }
            }
        }

        candidates
            .iter()
            .find(|h| h.handler.capabilities().streaming)
            .or_else(|| candidates.first())
            .map(|h| Arc::clone(&h.handler))
    }

    /// Resolve the handler for a stream from its first normalized chunk.
    ///
    /// Streaming-capable candidates whose stream handler recognizes the chunk
    /// win; otherwise the first streaming candidate in declaration order.
    pub fn resolve_stream(
        &self,
        provider: Provider,
        endpoint: Option<&str>,
        chunk: &Value,
    ) -> Option<Arc<dyn ProviderHandler>> {
        let registered = self.handlers.get(&provider)?;
        let path = endpoint.map(normalize_path);
        let streaming: Vec<&RegisteredHandler> = registered
            .iter()
            .filter(|h| path.is_none_or(|p| h.matches_endpoint(p)))
            .filter(|h| h.handler.capabilities().streaming)
            .collect();

        streaming
            .iter()
            .find(|h| {
                h.handler
                    .stream_handler()
                    .is_some_and(|s| s.matches_chunk(chunk))
            })
            .or_else(|| streaming.first())
            .map(|h| Arc::clone(&h.handler))
            .or_else(|| self.resolve(provider, endpoint, None))
    }

    /// Match a request host against custom then built-in host patterns
    pub fn detect_provider(&self, host: &str) -> Option<Provider> {
        let host = normalize_host(host);
        self.custom_hosts
            .iter()
            .chain(self.builtin_hosts.iter())
            .find(|(_, pattern)| pattern.is_match(host))
            .map(|(provider, _)| *provider)
    }

    /// Whether calls to this path should be instrumented at all
    pub fn is_trackable_endpoint(&self, provider: Provider, path: &str) -> bool {
        let path = normalize_path(path);
        self.handlers
            .get(&provider)
            .is_some_and(|hs| hs.iter().any(|h| h.matches_endpoint(path)))
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: HashMap<&str, usize> = self
            .handlers
            .iter()
            .map(|(p, hs)| (p.as_str(), hs.len()))
            .collect();
        f.debug_struct("HandlerRegistry")
            .field("handlers", &counts)
            .field("custom_hosts", &self.custom_hosts.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> HandlerRegistry {
        HandlerRegistry::with_defaults().unwrap()
    }

    #[test]
    fn test_resolve_by_endpoint() {
        let registry = registry();
        let handler = registry
            .resolve(Provider::OpenAI, Some("https://api.openai.com/v1/chat/completions?x=1"), None)
            .unwrap();
        assert_eq!(handler.name(), "openai.chat_completions");

        assert!(registry.resolve(Provider::OpenAI, Some("/v1/files"), None).is_none());
    }

    #[test]
    fn test_resolve_shared_endpoint_by_shape() {
        let registry = registry();
        let endpoint = Some("/v1beta/models/gemini-2.5-flash-image:generateContent");

        let image = ResponseBody::Json(json!({
            "candidates": [{"content": {"parts": [{"inlineData": {"mimeType": "image/png", "data": "AA=="}}]}}]
        }));
        assert_eq!(
            registry.resolve(Provider::Google, endpoint, Some(&image)).unwrap().name(),
            "google.generate_image"
        );

        let text = ResponseBody::Json(json!({"candidates": [{"content": {"parts": [{"text": "hi"}]}}]}));
        assert_eq!(
            registry.resolve(Provider::Google, endpoint, Some(&text)).unwrap().name(),
            "google.generate_text"
        );

        // No body: the streaming-capable handler wins.
        assert_eq!(
            registry.resolve(Provider::Google, endpoint, None).unwrap().name(),
            "google.generate_text"
        );
    }

    #[test]
    fn test_resolve_stream_sniffs_chunk() {
        let registry = registry();
        let chunk = json!({"type": "response.created", "response": {"model": "gpt-5"}});
        assert_eq!(
            registry.resolve_stream(Provider::OpenAI, None, &chunk).unwrap().name(),
            "openai.responses"
        );
        let chunk = json!({"object": "chat.completion.chunk", "choices": []});
        assert_eq!(
            registry.resolve_stream(Provider::OpenAI, None, &chunk).unwrap().name(),
            "openai.chat_completions"
        );
    }

    #[test]
    fn test_resolve_without_endpoint_sniffs_body() {
        let registry = registry();
        let body = ResponseBody::Json(json!({"type": "message", "content": []}));
        assert_eq!(
            registry.resolve(Provider::Anthropic, None, Some(&body)).unwrap().name(),
            "anthropic.messages"
        );

        let unknown = ResponseBody::Json(json!({"foo": 1}));
        assert!(registry.resolve(Provider::Anthropic, None, Some(&unknown)).is_none());
    }

    #[test]
    fn test_single_candidate_survives_shape_mismatch() {
        let registry = registry();
        let body = ResponseBody::Json(Value::Null);
        assert_eq!(
            registry
                .resolve(Provider::OpenAI, Some("/v1/embeddings"), Some(&body))
                .unwrap()
                .name(),
            "openai.embeddings"
        );
    }

    #[test]
    fn test_binary_body_resolves_speech() {
        let registry = registry();
        let body = ResponseBody::Binary {
            data: vec![0xff, 0xf3],
            content_type: Some("audio/mpeg".into()),
        };
        let handler = registry
            .resolve(Provider::ElevenLabs, Some("/v1/text-to-speech/voice123"), Some(&body))
            .unwrap();
        assert!(handler.capabilities().binary_response);
    }

    #[test]
    fn test_detect_provider() {
        let mut registry = registry();
        assert_eq!(registry.detect_provider("api.openai.com"), Some(Provider::OpenAI));
        assert_eq!(
            registry.detect_provider("MyResource.openai.azure.com:443"),
            Some(Provider::Azure)
        );
        assert_eq!(registry.detect_provider("sub.myresource.openai.azure.com"), None);
        assert_eq!(registry.detect_provider("llm-proxy.internal"), None);

        registry.register_host(Provider::Anthropic, "llm-proxy.internal").unwrap();
        assert_eq!(
            registry.detect_provider("llm-proxy.internal"),
            Some(Provider::Anthropic)
        );
    }

    #[test]
    fn test_trackable_endpoints() {
        let registry = registry();
        assert!(registry.is_trackable_endpoint(
            Provider::Azure,
            "/openai/deployments/prod-gpt4o/chat/completions"
        ));
        assert!(!registry.is_trackable_endpoint(
            Provider::Azure,
            "/openai/deployments/a/b/chat/completions"
        ));
        assert!(registry.is_trackable_endpoint(Provider::OpenAI, "/v1/videos/video_123"));
        assert!(!registry.is_trackable_endpoint(Provider::OpenAI, "/v1/models"));
    }
}
