//! Google Gemini response shapes
//!
//! `generateContent` returns text, images or audio from the same endpoint,
//! so three handlers share its patterns and are told apart by the inline
//! media they carry.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;

use super::handler::{HandlerCapabilities, ProviderHandler};
use super::shared::{array_at, str_at, u64_at, u64_or_zero, value_at};
use crate::core::streaming::{GeminiStream, StreamHandler};
use crate::core::types::{AudioMetrics, Metrics, ModelType, ResponseBody, TokenMetrics};

/// Built-in API hosts
pub const HOSTS: &[&str] = &[
    "generativelanguage.googleapis.com",
    "{region}-aiplatform.googleapis.com",
    "aiplatform.googleapis.com",
];

const GENERATE_ENDPOINTS: &[&str] = &[
    "/{version}/models/{model}:generateContent",
    "/{version}/models/{model}:streamGenerateContent",
    "/{version}/projects/{project}/locations/{location}/publishers/google/models/{model}:generateContent",
    "/{version}/projects/{project}/locations/{location}/publishers/google/models/{model}:streamGenerateContent",
];

/// Default PCM sample rate of Gemini speech output
const DEFAULT_PCM_RATE: u64 = 24_000;

/// Handlers in resolution order
pub fn handlers() -> Vec<Arc<dyn ProviderHandler>> {
    vec![
        Arc::new(GenerateTextHandler),
        Arc::new(GenerateImageHandler),
        Arc::new(GenerateAudioHandler),
        Arc::new(EmbedContentHandler),
    ]
}

/// `usageMetadata`; completion includes thoughts
pub(crate) fn gemini_usage(meta: &Value) -> Option<TokenMetrics> {
    if !meta.is_object() {
        return None;
    }
    let thoughts = u64_or_zero(meta, "thoughtsTokenCount");
    Some(
        TokenMetrics::new(
            u64_or_zero(meta, "promptTokenCount"),
            u64_or_zero(meta, "candidatesTokenCount").saturating_add(thoughts),
        )
        .with_cached(u64_or_zero(meta, "cachedContentTokenCount"))
        .with_reasoning(thoughts),
    )
}

/// Model segment of a `models/{model}:method` path
pub(crate) fn model_from_path(path: &str) -> Option<String> {
    let start = path.rfind("models/")? + "models/".len();
    let rest = &path[start..];
    let model = rest.split([':', '/', '?']).next()?;
    if model.is_empty() { None } else { Some(model.to_string()) }
}

/// Every content part of every candidate
fn parts(body: &Value) -> impl Iterator<Item = &Value> {
    array_at(body, "candidates")
        .iter()
        .flat_map(|c| array_at(c, "content.parts"))
}

/// Inline media parts whose MIME type starts with `prefix`
fn inline_media<'a>(body: &'a Value, prefix: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
    parts(body)
        .filter_map(|p| p.get("inlineData").or_else(|| p.get("inline_data")))
        .filter(move |d| {
            d.get("mimeType")
                .or_else(|| d.get("mime_type"))
                .and_then(Value::as_str)
                .is_some_and(|m| m.starts_with(prefix))
        })
}

fn token_metrics(body: &Value) -> Metrics {
    match value_at(body, "usageMetadata").and_then(gemini_usage) {
        Some(tokens) => Metrics::from_tokens(tokens),
        None => Metrics::empty(),
    }
}

/// Seconds of 16-bit mono PCM audio in an inline part
fn pcm_duration(inline: &Value) -> Option<f64> {
    let data = str_at(inline, "data")?;
    let bytes = STANDARD.decode(data).ok()?;
    let mime = str_at(inline, "mimeType").unwrap_or_default();
    let rate = mime
        .split(';')
        .find_map(|p| p.trim().strip_prefix("rate="))
        .and_then(|r| r.parse::<u64>().ok())
        .filter(|r| *r > 0)
        .unwrap_or(DEFAULT_PCM_RATE);
    Some(bytes.len() as f64 / (rate as f64 * 2.0))
}

fn generated_text(body: &Value) -> Option<String> {
    let text: String = array_at(body, "candidates.0.content.parts")
        .iter()
        .filter(|p| p.get("thought").and_then(Value::as_bool) != Some(true))
        .filter_map(|p| str_at(p, "text"))
        .collect();
    if text.is_empty() { None } else { Some(text) }
}

macro_rules! generate_content_common {
    () => {
        fn endpoints(&self) -> &'static [&'static str] {
            GENERATE_ENDPOINTS
        }

        fn extract_model(&self, body: &Value) -> Option<String> {
            str_at(body, "modelVersion").map(str::to_string)
        }

        fn extract_model_from_request(&self, request: &Value) -> Option<String> {
            str_at(request, "model").map(|m| m.trim_start_matches("models/").to_string())
        }

        fn extract_model_from_endpoint(&self, path: &str) -> Option<String> {
            model_from_path(path)
        }

        fn extract_finish_reason(&self, body: &Value) -> Option<String> {
            str_at(body, "candidates.0.finishReason").map(str::to_string)
        }

        fn extract_response_text(&self, body: &Value) -> Option<String> {
            generated_text(body)
        }
    };
}

/// Plain text generation
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerateTextHandler;

impl ProviderHandler for GenerateTextHandler {
    generate_content_common!();

    fn name(&self) -> &'static str {
        "google.generate_text"
    }

    fn model_type(&self) -> ModelType {
        ModelType::Text
    }

    fn capabilities(&self) -> HandlerCapabilities {
        HandlerCapabilities {
            streaming: true,
            ..HandlerCapabilities::NONE
        }
    }

    fn matches_response(&self, body: &ResponseBody) -> bool {
        let json = body.json();
        (json.get("candidates").is_some() || json.get("usageMetadata").is_some())
            && inline_media(json, "image/").next().is_none()
            && inline_media(json, "audio/").next().is_none()
    }

    fn extract_metrics(&self, _request: Option<&Value>, body: &ResponseBody) -> Metrics {
        token_metrics(body.json())
    }

    fn stream_handler(&self) -> Option<&'static dyn StreamHandler> {
        Some(&GeminiStream)
    }
}

/// Native image generation (`responseModalities: ["IMAGE"]`)
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerateImageHandler;

impl ProviderHandler for GenerateImageHandler {
    generate_content_common!();

    fn name(&self) -> &'static str {
        "google.generate_image"
    }

    fn model_type(&self) -> ModelType {
        ModelType::Image
    }

    fn capabilities(&self) -> HandlerCapabilities {
        HandlerCapabilities {
            storable_media: true,
            ..HandlerCapabilities::NONE
        }
    }

    fn matches_response(&self, body: &ResponseBody) -> bool {
        inline_media(body.json(), "image/").next().is_some()
    }

    fn extract_metrics(&self, _request: Option<&Value>, body: &ResponseBody) -> Metrics {
        let json = body.json();
        let count = inline_media(json, "image/").count() as u64;
        token_metrics(json).with_images(count)
    }
}

/// Speech generation returning base64 PCM
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerateAudioHandler;

impl ProviderHandler for GenerateAudioHandler {
    generate_content_common!();

    fn name(&self) -> &'static str {
        "google.generate_audio"
    }

    fn model_type(&self) -> ModelType {
        ModelType::Audio
    }

    fn capabilities(&self) -> HandlerCapabilities {
        HandlerCapabilities {
            storable_media: true,
            ..HandlerCapabilities::NONE
        }
    }

    fn matches_response(&self, body: &ResponseBody) -> bool {
        inline_media(body.json(), "audio/").next().is_some()
    }

    fn extract_metrics(&self, _request: Option<&Value>, body: &ResponseBody) -> Metrics {
        let json = body.json();
        let duration: Option<f64> = inline_media(json, "audio/")
            .filter_map(pcm_duration)
            .reduce(|a, b| a + b);
        token_metrics(json).with_audio(AudioMetrics {
            duration_seconds: duration,
            input_characters: None,
        })
    }
}

/// `embedContent` and `batchEmbedContents`
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbedContentHandler;

impl ProviderHandler for EmbedContentHandler {
    fn name(&self) -> &'static str {
        "google.embed_content"
    }

    fn endpoints(&self) -> &'static [&'static str] {
        &[
            "/{version}/models/{model}:embedContent",
            "/{version}/models/{model}:batchEmbedContents",
        ]
    }

    fn model_type(&self) -> ModelType {
        ModelType::Embedding
    }

    fn matches_response(&self, body: &ResponseBody) -> bool {
        let json = body.json();
        json.get("embedding").is_some() || json.get("embeddings").is_some()
    }

    fn extract_metrics(&self, _request: Option<&Value>, body: &ResponseBody) -> Metrics {
        match u64_at(body.json(), "usageMetadata.promptTokenCount") {
            Some(prompt) => Metrics::from_tokens(TokenMetrics::new(prompt, 0)),
            None => Metrics::empty(),
        }
    }

    fn extract_model_from_endpoint(&self, path: &str) -> Option<String> {
        model_from_path(path)
    }
}
