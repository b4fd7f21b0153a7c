//! Built-in price tables
//!
//! Token prices in cents per million tokens, unit prices in cents per unit.

use std::collections::BTreeMap;

use super::types::{ModelDefinition, PricingTier, ProviderPricing};
use crate::core::processing::tools::{CODE_INTERPRETER_CALL, FILE_SEARCH_CALL, WEB_SEARCH_CALL};
use crate::core::types::{ModelType, PricingTierName as Tier, PricingUnit, Provider};

fn text(name: &str, display: &str) -> ModelDefinition {
    ModelDefinition::new(name, display, ModelType::Text, PricingUnit::Tokens)
}

fn tools(prices: &[(&str, f64)]) -> BTreeMap<String, f64> {
    prices.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

pub(super) fn sections() -> Vec<ProviderPricing> {
    vec![openai(), anthropic(), google(), elevenlabs()]
}

fn openai() -> ProviderPricing {
    let models = vec![
        text("gpt-4.1", "GPT-4.1")
            .tier(PricingTier::tokens(Tier::Standard, 200.0, 800.0).with_cached(50.0))
            .tier(PricingTier::tokens(Tier::Batch, 100.0, 400.0)),
        text("gpt-4.1-mini", "GPT-4.1 mini")
            .tier(PricingTier::tokens(Tier::Standard, 40.0, 160.0).with_cached(10.0)),
        text("gpt-4o", "GPT-4o")
            .tier(PricingTier::tokens(Tier::Standard, 250.0, 1000.0).with_cached(125.0))
            .tier(PricingTier::tokens(Tier::Batch, 125.0, 500.0)),
        text("gpt-4o-mini", "GPT-4o mini")
            .tier(PricingTier::tokens(Tier::Standard, 15.0, 60.0).with_cached(7.5))
            .tier(PricingTier::tokens(Tier::Batch, 7.5, 30.0)),
        text("gpt-5", "GPT-5")
            .capability("reasoning")
            .tier(PricingTier::tokens(Tier::Standard, 125.0, 1000.0).with_cached(12.5))
            .tier(PricingTier::tokens(Tier::Flex, 62.5, 500.0).with_cached(6.25))
            .tier(PricingTier::tokens(Tier::Priority, 250.0, 2000.0).with_cached(25.0))
            .tier(PricingTier::tokens(Tier::Batch, 62.5, 500.0)),
        text("gpt-5-mini", "GPT-5 mini")
            .capability("reasoning")
            .tier(PricingTier::tokens(Tier::Standard, 25.0, 200.0).with_cached(2.5))
            .tier(PricingTier::tokens(Tier::Flex, 12.5, 100.0).with_cached(1.25)),
        text("o3", "o3")
            .capability("reasoning")
            .tier(PricingTier::tokens(Tier::Standard, 200.0, 800.0).with_cached(50.0))
            .tier(PricingTier::tokens(Tier::Flex, 100.0, 400.0).with_cached(25.0)),
        text("o3-mini", "o3-mini")
            .capability("reasoning")
            .tier(PricingTier::tokens(Tier::Standard, 110.0, 440.0).with_cached(55.0)),
        text("o4-mini", "o4-mini")
            .capability("reasoning")
            .tier(PricingTier::tokens(Tier::Standard, 110.0, 440.0).with_cached(27.5))
            .tier(PricingTier::tokens(Tier::Flex, 55.0, 220.0).with_cached(13.75)),
        ModelDefinition::new(
            "text-embedding-3-small",
            "Text Embedding 3 Small",
            ModelType::Embedding,
            PricingUnit::Tokens,
        )
        .tier(PricingTier::tokens(Tier::Standard, 2.0, 0.0))
        .tier(PricingTier::tokens(Tier::Batch, 1.0, 0.0)),
        ModelDefinition::new(
            "text-embedding-3-large",
            "Text Embedding 3 Large",
            ModelType::Embedding,
            PricingUnit::Tokens,
        )
        .tier(PricingTier::tokens(Tier::Standard, 13.0, 0.0))
        .tier(PricingTier::tokens(Tier::Batch, 6.5, 0.0)),
        ModelDefinition::new("gpt-image-1", "GPT Image 1", ModelType::Image, PricingUnit::Tokens)
            .tier(PricingTier::tokens(Tier::Standard, 500.0, 4000.0).with_cached(125.0)),
        ModelDefinition::new("dall-e-3", "DALL·E 3", ModelType::Image, PricingUnit::Image)
            .tier(PricingTier::per_unit(Tier::Standard, 4.0))
            .tier(PricingTier::per_unit(Tier::Hd, 8.0)),
        ModelDefinition::new("dall-e-2", "DALL·E 2", ModelType::Image, PricingUnit::Image)
            .tier(PricingTier::per_unit(Tier::Standard, 2.0)),
        ModelDefinition::new("tts-1", "TTS", ModelType::Audio, PricingUnit::Characters)
            .tier(PricingTier::per_unit(Tier::Standard, 0.0015)),
        ModelDefinition::new("tts-1-hd", "TTS HD", ModelType::Audio, PricingUnit::Characters)
            .tier(PricingTier::per_unit(Tier::Standard, 0.003)),
        ModelDefinition::new(
            "whisper-1",
            "Whisper",
            ModelType::Transcription,
            PricingUnit::Minute,
        )
        .tier(PricingTier::per_unit(Tier::Standard, 0.6)),
        ModelDefinition::new(
            "gpt-4o-transcribe",
            "GPT-4o Transcribe",
            ModelType::Transcription,
            PricingUnit::Tokens,
        )
        .tier(PricingTier::tokens(Tier::Standard, 250.0, 1000.0)),
        ModelDefinition::new("sora-2", "Sora 2", ModelType::Video, PricingUnit::Second)
            .tier(PricingTier::per_unit(Tier::Standard, 10.0)),
        ModelDefinition::new("sora-2-pro", "Sora 2 Pro", ModelType::Video, PricingUnit::Second)
            .tier(PricingTier::per_unit(Tier::Standard, 30.0))
            .tier(PricingTier::per_unit(Tier::Hd, 50.0)),
    ];

    ProviderPricing {
        provider: Provider::OpenAI,
        models,
        tool_prices: tools(&[
            (WEB_SEARCH_CALL, 1.0),
            (FILE_SEARCH_CALL, 0.25),
            (CODE_INTERPRETER_CALL, 3.0),
        ]),
    }
}

fn anthropic() -> ProviderPricing {
    let models = vec![
        text("claude-sonnet-4", "Claude Sonnet 4")
            .capability("reasoning")
            .tier(
                PricingTier::tokens(Tier::Standard, 300.0, 1500.0)
                    .with_cached(30.0)
                    .with_cache_writes(375.0, 600.0),
            )
            .tier(PricingTier::tokens(Tier::Batch, 150.0, 750.0).with_cached(15.0)),
        text("claude-sonnet-4-5", "Claude Sonnet 4.5")
            .capability("reasoning")
            .tier(
                PricingTier::tokens(Tier::Standard, 300.0, 1500.0)
                    .with_cached(30.0)
                    .with_cache_writes(375.0, 600.0),
            ),
        text("claude-opus-4-1", "Claude Opus 4.1")
            .capability("reasoning")
            .tier(
                PricingTier::tokens(Tier::Standard, 1500.0, 7500.0)
                    .with_cached(150.0)
                    .with_cache_writes(1875.0, 3000.0),
            )
            .tier(PricingTier::tokens(Tier::Batch, 750.0, 3750.0).with_cached(75.0)),
        text("claude-3-5-haiku", "Claude Haiku 3.5")
            .tier(
                PricingTier::tokens(Tier::Standard, 80.0, 400.0)
                    .with_cached(8.0)
                    .with_cache_writes(100.0, 160.0),
            )
            .tier(PricingTier::tokens(Tier::Batch, 40.0, 200.0).with_cached(4.0)),
    ];

    ProviderPricing {
        provider: Provider::Anthropic,
        models,
        tool_prices: tools(&[(WEB_SEARCH_CALL, 1.0)]),
    }
}

fn google() -> ProviderPricing {
    let models = vec![
        text("gemini-2.5-flash", "Gemini 2.5 Flash")
            .capability("reasoning")
            .tier(PricingTier::tokens(Tier::Standard, 30.0, 250.0).with_cached(7.5))
            .tier(PricingTier::tokens(Tier::Batch, 15.0, 125.0)),
        text("gemini-2.5-pro", "Gemini 2.5 Pro")
            .capability("reasoning")
            .tier(PricingTier::tokens(Tier::Standard, 125.0, 1000.0).with_cached(31.0))
            .tier(PricingTier::tokens(Tier::Batch, 62.5, 500.0)),
        ModelDefinition::new(
            "gemini-2.5-flash-image",
            "Gemini 2.5 Flash Image",
            ModelType::Image,
            PricingUnit::Image,
        )
        .tier(PricingTier::per_unit(Tier::Standard, 3.9)),
        ModelDefinition::new(
            "gemini-2.5-flash-preview-tts",
            "Gemini 2.5 Flash TTS",
            ModelType::Audio,
            PricingUnit::Tokens,
        )
        .tier(PricingTier::tokens(Tier::Standard, 50.0, 1000.0)),
        ModelDefinition::new(
            "gemini-embedding-001",
            "Gemini Embedding",
            ModelType::Embedding,
            PricingUnit::Tokens,
        )
        .tier(PricingTier::tokens(Tier::Standard, 15.0, 0.0)),
    ];

    ProviderPricing {
        provider: Provider::Google,
        models,
        tool_prices: BTreeMap::new(),
    }
}

fn elevenlabs() -> ProviderPricing {
    let models = vec![
        ModelDefinition::new(
            "eleven_multilingual_v2",
            "Eleven Multilingual v2",
            ModelType::Audio,
            PricingUnit::Characters,
        )
        .tier(PricingTier::per_unit(Tier::Standard, 0.03)),
        ModelDefinition::new(
            "eleven_flash_v2_5",
            "Eleven Flash v2.5",
            ModelType::Audio,
            PricingUnit::Characters,
        )
        .tier(PricingTier::per_unit(Tier::Standard, 0.015)),
    ];

    ProviderPricing {
        provider: Provider::ElevenLabs,
        models,
        tool_prices: BTreeMap::new(),
    }
}
