//! Provider and model classification enums

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Upstream API family a call was made to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Provider {
    #[serde(rename = "openai")]
    OpenAI,
    #[serde(rename = "azure")]
    Azure,
    #[serde(rename = "anthropic")]
    Anthropic,
    #[serde(rename = "google")]
    Google,
    #[serde(rename = "elevenlabs")]
    ElevenLabs,
}

impl Provider {
    /// Every provider, in registration order
    pub const ALL: [Provider; 5] = [
        Provider::OpenAI,
        Provider::Azure,
        Provider::Anthropic,
        Provider::Google,
        Provider::ElevenLabs,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAI => "openai",
            Provider::Azure => "azure",
            Provider::Anthropic => "anthropic",
            Provider::Google => "google",
            Provider::ElevenLabs => "elevenlabs",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAI),
            "azure" | "azure_openai" => Ok(Provider::Azure),
            "anthropic" => Ok(Provider::Anthropic),
            "google" | "gemini" => Ok(Provider::Google),
            "elevenlabs" | "eleven_labs" => Ok(Provider::ElevenLabs),
            other => Err(format!("unknown provider: {}", other)),
        }
    }
}

/// What kind of output a model produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    #[default]
    Text,
    Embedding,
    Image,
    Audio,
    Transcription,
    Video,
}

impl ModelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelType::Text => "text",
            ModelType::Embedding => "embedding",
            ModelType::Image => "image",
            ModelType::Audio => "audio",
            ModelType::Transcription => "transcription",
            ModelType::Video => "video",
        }
    }
}

impl FromStr for ModelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "chat" => Ok(ModelType::Text),
            "embedding" | "embeddings" => Ok(ModelType::Embedding),
            "image" => Ok(ModelType::Image),
            "audio" | "speech" => Ok(ModelType::Audio),
            "transcription" => Ok(ModelType::Transcription),
            "video" => Ok(ModelType::Video),
            other => Err(format!("unknown model type: {}", other)),
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Billing quantity a model is priced by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PricingUnit {
    #[default]
    Tokens,
    Minute,
    Second,
    Characters,
    Image,
    Video,
    Search,
}

impl PricingUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            PricingUnit::Tokens => "tokens",
            PricingUnit::Minute => "minute",
            PricingUnit::Second => "second",
            PricingUnit::Characters => "characters",
            PricingUnit::Image => "image",
            PricingUnit::Video => "video",
            PricingUnit::Search => "search",
        }
    }

    pub fn is_token_based(&self) -> bool {
        matches!(self, PricingUnit::Tokens)
    }
}

/// Named price list variant of a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PricingTierName {
    #[default]
    Standard,
    Batch,
    Flex,
    Priority,
    Hd,
}

impl PricingTierName {
    pub fn as_str(&self) -> &'static str {
        match self {
            PricingTierName::Standard => "standard",
            PricingTierName::Batch => "batch",
            PricingTierName::Flex => "flex",
            PricingTierName::Priority => "priority",
            PricingTierName::Hd => "hd",
        }
    }

    /// Map a provider-declared tier label onto a catalog tier.
    ///
    /// Providers echo labels such as `default`, `auto` or `scale` that all bill
    /// at standard rates.
    pub fn from_provider_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "standard" | "default" | "auto" | "scale" | "standard_only" => {
                Some(PricingTierName::Standard)
            }
            "batch" => Some(PricingTierName::Batch),
            "flex" => Some(PricingTierName::Flex),
            "priority" => Some(PricingTierName::Priority),
            "hd" => Some(PricingTierName::Hd),
            _ => None,
        }
    }
}

impl fmt::Display for PricingTierName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PricingTierName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_provider_label(s).ok_or_else(|| format!("unknown pricing tier: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_round_trip_names() {
        for provider in Provider::ALL {
            assert_eq!(provider.as_str().parse::<Provider>().unwrap(), provider);
        }
        assert_eq!("Gemini".parse::<Provider>().unwrap(), Provider::Google);
        assert!("bedrock".parse::<Provider>().is_err());
    }

    #[test]
    fn test_tier_labels() {
        assert_eq!(
            PricingTierName::from_provider_label("default"),
            Some(PricingTierName::Standard)
        );
        assert_eq!(
            PricingTierName::from_provider_label("FLEX"),
            Some(PricingTierName::Flex)
        );
        assert_eq!(PricingTierName::from_provider_label("turbo"), None);
    }

    #[test]
    fn test_serde_names() {
        let unit: PricingUnit = serde_json::from_str("\"characters\"").unwrap();
        assert_eq!(unit, PricingUnit::Characters);
        let provider = serde_json::to_string(&Provider::ElevenLabs).unwrap();
        assert_eq!(provider, "\"elevenlabs\"");
    }
}
