//! Azure OpenAI response shapes
//!
//! Azure serves the OpenAI wire format under deployment-scoped paths. The
//! request's `model` (when present) names a deployment, not a model, so the
//! model is only ever taken from the response.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::handler::{HandlerCapabilities, ProviderHandler};
use super::openai;
use crate::core::streaming::StreamHandler;
use crate::core::types::{Metrics, ModelType, PricingTierName, ResponseBody};

/// Built-in API hosts
pub const HOSTS: &[&str] = &[
    "{resource}.openai.azure.com",
    "{resource}.cognitiveservices.azure.com",
];

/// An OpenAI parser bound to Azure deployment endpoints
#[derive(Debug)]
pub struct AzureHandler {
    name: &'static str,
    endpoints: &'static [&'static str],
    inner: Arc<dyn ProviderHandler>,
}

impl AzureHandler {
    pub fn new(
        name: &'static str,
        endpoints: &'static [&'static str],
        inner: Arc<dyn ProviderHandler>,
    ) -> Self {
        Self {
            name,
            endpoints,
            inner,
        }
    }
}

/// Handlers in resolution order
pub fn handlers() -> Vec<Arc<dyn ProviderHandler>> {
    vec![
        Arc::new(AzureHandler::new(
            "azure.chat_completions",
            &["/openai/deployments/{deployment}/chat/completions"],
            Arc::new(openai::ChatCompletionsHandler),
        )),
        Arc::new(AzureHandler::new(
            "azure.responses",
            &["/openai/responses", "/openai/v1/responses"],
            Arc::new(openai::ResponsesHandler),
        )),
        Arc::new(AzureHandler::new(
            "azure.embeddings",
            &["/openai/deployments/{deployment}/embeddings"],
            Arc::new(openai::EmbeddingsHandler),
        )),
        Arc::new(AzureHandler::new(
            "azure.images",
            &["/openai/deployments/{deployment}/images/generations"],
            Arc::new(openai::ImagesHandler),
        )),
        Arc::new(AzureHandler::new(
            "azure.speech",
            &["/openai/deployments/{deployment}/audio/speech"],
            Arc::new(openai::SpeechHandler),
        )),
        Arc::new(AzureHandler::new(
            "azure.transcription",
            &[
                "/openai/deployments/{deployment}/audio/transcriptions",
                "/openai/deployments/{deployment}/audio/translations",
            ],
            Arc::new(openai::TranscriptionHandler),
        )),
    ]
}

impl ProviderHandler for AzureHandler {
    fn name(&self) -> &'static str {
        self.name
    }

    fn endpoints(&self) -> &'static [&'static str] {
        self.endpoints
    }

    fn model_type(&self) -> ModelType {
        self.inner.model_type()
    }

    fn capabilities(&self) -> HandlerCapabilities {
        HandlerCapabilities {
            model_from_response_only: true,
            ..self.inner.capabilities()
        }
    }

    fn matches_response(&self, body: &ResponseBody) -> bool {
        self.inner.matches_response(body)
    }

    fn extract_metrics(&self, request: Option<&Value>, body: &ResponseBody) -> Metrics {
        self.inner.extract_metrics(request, body)
    }

    fn extract_model(&self, body: &Value) -> Option<String> {
        self.inner.extract_model(body)
    }

    fn extract_model_from_request(&self, _request: &Value) -> Option<String> {
        None
    }

    fn extract_finish_reason(&self, body: &Value) -> Option<String> {
        self.inner.extract_finish_reason(body)
    }

    fn extract_response_text(&self, body: &Value) -> Option<String> {
        self.inner.extract_response_text(body)
    }

    fn should_skip(&self, body: &Value) -> bool {
        self.inner.should_skip(body)
    }

    fn extract_expiration(&self, body: &Value) -> Option<DateTime<Utc>> {
        self.inner.extract_expiration(body)
    }

    fn stream_handler(&self) -> Option<&'static dyn StreamHandler> {
        self.inner.stream_handler()
    }

    fn extract_tier_from_request(&self, request: &Value) -> Option<PricingTierName> {
        self.inner.extract_tier_from_request(request)
    }

    fn extract_tier_from_response(&self, body: &Value) -> Option<PricingTierName> {
        self.inner.extract_tier_from_response(body)
    }
}
