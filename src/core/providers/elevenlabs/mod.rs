//! ElevenLabs text-to-speech
//!
//! Responses are raw audio. Billing is per input character, and both the
//! text and the model only appear in the request.

use std::sync::Arc;

use serde_json::Value;

use super::handler::{HandlerCapabilities, ProviderHandler};
use super::shared::str_at;
use crate::core::types::{AudioMetrics, Metrics, ModelType, ResponseBody};

/// Built-in API hosts
pub const HOSTS: &[&str] = &["api.elevenlabs.io", "api.us.elevenlabs.io"];

/// Model used when the request does not name one
pub const DEFAULT_MODEL: &str = "eleven_multilingual_v2";

/// Handlers in resolution order
pub fn handlers() -> Vec<Arc<dyn ProviderHandler>> {
    vec![Arc::new(TextToSpeechHandler)]
}

/// `/v1/text-to-speech/{voice_id}` and its streaming variant
#[derive(Debug, Clone, Copy, Default)]
pub struct TextToSpeechHandler;

impl ProviderHandler for TextToSpeechHandler {
    fn name(&self) -> &'static str {
        "elevenlabs.text_to_speech"
    }

    fn endpoints(&self) -> &'static [&'static str] {
        &[
            "/v1/text-to-speech/{voice_id}",
            "/v1/text-to-speech/{voice_id}/stream",
        ]
    }

    fn model_type(&self) -> ModelType {
        ModelType::Audio
    }

    fn capabilities(&self) -> HandlerCapabilities {
        HandlerCapabilities {
            binary_response: true,
            storable_media: true,
            ..HandlerCapabilities::NONE
        }
    }

    fn matches_response(&self, body: &ResponseBody) -> bool {
        body.is_binary()
    }

    fn extract_metrics(&self, request: Option<&Value>, _body: &ResponseBody) -> Metrics {
        let characters = request
            .and_then(|r| str_at(r, "text"))
            .map(|text| text.chars().count() as u64);
        Metrics::empty().with_audio(AudioMetrics {
            duration_seconds: None,
            input_characters: characters,
        })
    }

    fn extract_model(&self, _body: &Value) -> Option<String> {
        None
    }

    fn extract_model_from_request(&self, request: &Value) -> Option<String> {
        Some(str_at(request, "model_id").unwrap_or(DEFAULT_MODEL).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_characters_and_model_from_request() {
        let body = ResponseBody::Binary {
            data: vec![1, 2, 3],
            content_type: Some("audio/mpeg".to_string()),
        };
        let request = json!({"text": "Hello there", "model_id": "eleven_flash_v2_5"});
        let handler = TextToSpeechHandler;
        assert_eq!(
            handler.extract_metrics(Some(&request), &body).input_characters(),
            Some(11)
        );
        assert_eq!(
            handler.extract_model_from_request(&request).as_deref(),
            Some("eleven_flash_v2_5")
        );
        assert_eq!(
            handler.extract_model_from_request(&json!({"text": "x"})).as_deref(),
            Some(DEFAULT_MODEL)
        );
    }
}
