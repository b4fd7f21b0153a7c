//! Normalized usage metrics
//!
//! A single response may report several modalities at once (a text reply
//! plus a generated image), so every modality is optional.

use serde::{Deserialize, Serialize};

/// Token usage information
///
/// `prompt_tokens` includes the cached and cache-write sub-portions;
/// `completion_tokens` includes reasoning tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TokenMetrics {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub cached_tokens: u64,
    pub reasoning_tokens: u64,
    /// Prompt tokens written to a 5-minute cache
    #[serde(default)]
    pub cache_write_5m_tokens: u64,
    /// Prompt tokens written to a 1-hour cache
    #[serde(default)]
    pub cache_write_1h_tokens: u64,
}

impl TokenMetrics {
    pub fn new(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            ..Default::default()
        }
    }

    pub fn with_cached(mut self, cached_tokens: u64) -> Self {
        self.cached_tokens = cached_tokens;
        self
    }

    pub fn with_reasoning(mut self, reasoning_tokens: u64) -> Self {
        self.reasoning_tokens = reasoning_tokens;
        self
    }

    pub fn total_tokens(&self) -> u64 {
        self.prompt_tokens.saturating_add(self.completion_tokens)
    }

    pub fn is_zero(&self) -> bool {
        self.prompt_tokens == 0
            && self.completion_tokens == 0
            && self.cached_tokens == 0
            && self.reasoning_tokens == 0
    }
}

/// Generated image count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ImageMetrics {
    pub count: u64,
}

/// Audio usage: duration for transcription/speech, characters for synthesis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct AudioMetrics {
    pub duration_seconds: Option<f64>,
    pub input_characters: Option<u64>,
}

/// Generated video usage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct VideoMetrics {
    pub count: u64,
    pub duration_seconds: Option<f64>,
}

/// Immutable snapshot of everything a response reported
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Metrics {
    pub tokens: Option<TokenMetrics>,
    pub image: Option<ImageMetrics>,
    pub audio: Option<AudioMetrics>,
    pub video: Option<VideoMetrics>,
}

impl Metrics {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_tokens(tokens: TokenMetrics) -> Self {
        Self {
            tokens: Some(tokens),
            ..Default::default()
        }
    }

    pub fn with_tokens(mut self, tokens: TokenMetrics) -> Self {
        self.tokens = Some(tokens);
        self
    }

    pub fn with_images(mut self, count: u64) -> Self {
        self.image = Some(ImageMetrics { count });
        self
    }

    pub fn with_audio(mut self, audio: AudioMetrics) -> Self {
        self.audio = Some(audio);
        self
    }

    pub fn with_video(mut self, video: VideoMetrics) -> Self {
        self.video = Some(video);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_none() && self.image.is_none() && self.audio.is_none() && self.video.is_none()
    }

    pub fn tokens_or_default(&self) -> TokenMetrics {
        self.tokens.unwrap_or_default()
    }

    pub fn image_count(&self) -> u64 {
        self.image.map(|i| i.count).unwrap_or(0)
    }

    pub fn video_count(&self) -> u64 {
        self.video.map(|v| v.count).unwrap_or(0)
    }

    /// Audio or video duration, whichever the response reported
    pub fn duration_seconds(&self) -> Option<f64> {
        self.audio
            .and_then(|a| a.duration_seconds)
            .or_else(|| self.video.and_then(|v| v.duration_seconds))
    }

    pub fn input_characters(&self) -> Option<u64> {
        self.audio.and_then(|a| a.input_characters)
    }
}
