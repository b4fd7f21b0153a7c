use serde_json::Value;

use crate::core::providers::handler::{HandlerCapabilities, ProviderHandler};
use crate::core::providers::shared::{f64_at, str_at, u64_or_zero};
use crate::core::types::{AudioMetrics, Metrics, ModelType, ResponseBody, TokenMetrics};

/// `/v1/audio/speech`: the response is the encoded audio itself
#[derive(Debug, Clone, Copy, Default)]
pub struct SpeechHandler;

impl ProviderHandler for SpeechHandler {
    fn name(&self) -> &'static str {
        "openai.speech"
    }

    fn endpoints(&self) -> &'static [&'static str] {
        &["/v1/audio/speech", "/audio/speech"]
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
            .and_then(|r| str_at(r, "input"))
            .map(|input| input.chars().count() as u64);
        Metrics::empty().with_audio(AudioMetrics {
            duration_seconds: None,
            input_characters: characters,
        })
    }
}

/// `/v1/audio/transcriptions` and `/v1/audio/translations`
#[derive(Debug, Clone, Copy, Default)]
pub struct TranscriptionHandler;

impl ProviderHandler for TranscriptionHandler {
    fn name(&self) -> &'static str {
        "openai.transcription"
    }

    fn endpoints(&self) -> &'static [&'static str] {
        &[
            "/v1/audio/transcriptions",
            "/v1/audio/translations",
            "/audio/transcriptions",
        ]
    }

    fn model_type(&self) -> ModelType {
        ModelType::Transcription
    }

    fn matches_response(&self, body: &ResponseBody) -> bool {
        let json = body.json();
        json.get("text").is_some_and(Value::is_string) && json.get("choices").is_none()
    }

    fn extract_metrics(&self, _request: Option<&Value>, body: &ResponseBody) -> Metrics {
        let json = body.json();
        let mut metrics = Metrics::empty();

        // verbose_json carries `duration`; whisper usage reports seconds
        let duration = f64_at(json, "duration").or_else(|| match str_at(json, "usage.type") {
            Some("duration") => f64_at(json, "usage.seconds"),
            _ => None,
        });
        if duration.is_some() {
            metrics = metrics.with_audio(AudioMetrics {
                duration_seconds: duration,
                input_characters: None,
            });
        }

        if str_at(json, "usage.type") == Some("tokens") {
            metrics = metrics.with_tokens(TokenMetrics::new(
                u64_or_zero(json, "usage.input_tokens"),
                u64_or_zero(json, "usage.output_tokens"),
            ));
        }
        metrics
    }

    fn extract_response_text(&self, body: &Value) -> Option<String> {
        str_at(body, "text").map(str::to_string)
    }
}
