//! Type definitions for the pricing catalog
//!
//! Token prices are in cents per million tokens. Unit prices
//! (`price_per_unit`) are flat cents per unit of the model's pricing unit.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::types::{ModelType, PricingTierName, PricingUnit, Provider};

/// One named price list of a model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PricingTier {
    /// Service tier these prices apply to
    pub name: PricingTierName,
    /// Cents per million prompt tokens
    pub input_price: Option<f64>,
    /// Cents per million completion tokens
    pub output_price: Option<f64>,
    /// Cents per million cached prompt tokens
    pub cached_input_price: Option<f64>,
    /// Cents per million tokens written to a 5-minute cache
    pub cache_write_5m_price: Option<f64>,
    /// Cents per million tokens written to a 1-hour cache
    pub cache_write_1h_price: Option<f64>,
    /// Cents per million reasoning tokens, when billed apart from output
    pub reasoning_price: Option<f64>,
    /// Flat cents per unit for non-token pricing units
    pub price_per_unit: Option<f64>,
}

impl PricingTier {
    /// Token-priced tier with input and output rates
    pub fn tokens(name: PricingTierName, input: f64, output: f64) -> Self {
        Self {
            name,
            input_price: Some(input),
            output_price: Some(output),
            ..Default::default()
        }
    }

    /// Tier priced per unit of the model's pricing unit
    pub fn per_unit(name: PricingTierName, price: f64) -> Self {
        Self {
            name,
            price_per_unit: Some(price),
            ..Default::default()
        }
    }

    /// Set the cached prompt token rate
    pub fn with_cached(mut self, price: f64) -> Self {
        self.cached_input_price = Some(price);
        self
    }

    /// Set the 5-minute and 1-hour cache write rates
    pub fn with_cache_writes(mut self, five_minute: f64, one_hour: f64) -> Self {
        self.cache_write_5m_price = Some(five_minute);
        self.cache_write_1h_price = Some(one_hour);
        self
    }

    /// Bill reasoning tokens at their own rate
    pub fn with_reasoning(mut self, price: f64) -> Self {
        self.reasoning_price = Some(price);
        self
    }

    /// Whether the tier prices tokens rather than units
    pub fn has_token_prices(&self) -> bool {
        self.input_price.is_some() || self.output_price.is_some()
    }

    fn prices(&self) -> impl Iterator<Item = f64> + '_ {
        [
            self.input_price,
            self.output_price,
            self.cached_input_price,
            self.cache_write_5m_price,
            self.cache_write_1h_price,
            self.reasoning_price,
            self.price_per_unit,
        ]
        .into_iter()
        .flatten()
    }

    /// Every declared price is finite and non-negative
    pub fn is_valid(&self) -> bool {
        self.prices().all(|p| p.is_finite() && p >= 0.0)
    }
}

/// A model entry in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDefinition {
    /// Name as providers report it, without date suffixes
    pub internal_name: String,
    /// Human-readable name
    pub display_name: String,
    /// Kind of output; narrows lookups when one name has several kinds
    #[serde(default)]
    pub model_type: ModelType,
    /// Quantity that unit prices are charged against
    #[serde(default)]
    pub pricing_unit: PricingUnit,
    /// Free-form feature tags such as `vision` or `tools`
    #[serde(default)]
    pub capabilities: Vec<String>,
    /// Price lists, one per service tier
    pub tiers: Vec<PricingTier>,
}

impl ModelDefinition {
    pub fn new(
        internal_name: impl Into<String>,
        display_name: impl Into<String>,
        model_type: ModelType,
        pricing_unit: PricingUnit,
    ) -> Self {
        Self {
            internal_name: internal_name.into(),
            display_name: display_name.into(),
            model_type,
            pricing_unit,
            capabilities: Vec::new(),
            tiers: Vec::new(),
        }
    }

    /// Add a price tier
    pub fn tier(mut self, tier: PricingTier) -> Self {
        self.tiers.push(tier);
        self
    }

    pub fn capability(mut self, capability: impl Into<String>) -> Self {
        self.capabilities.push(capability.into());
        self
    }

    /// Exact tier lookup, no fallback
    pub fn find_tier(&self, name: PricingTierName) -> Option<&PricingTier> {
        self.tiers.iter().find(|t| t.name == name)
    }

    /// The requested tier, else standard, else the first declared tier
    pub fn resolve_tier(&self, name: Option<PricingTierName>) -> Option<&PricingTier> {
        name.and_then(|n| self.find_tier(n))
            .or_else(|| self.find_tier(PricingTierName::Standard))
            .or_else(|| self.tiers.first())
    }
}

/// Catalog section for one provider, as loaded from a file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderPricing {
    /// Provider these entries belong to
    pub provider: Provider,
    /// Models priced for the provider
    #[serde(default)]
    pub models: Vec<ModelDefinition>,
    /// Cents per tool call, keyed by tool-call kind
    #[serde(default)]
    pub tool_prices: BTreeMap<String, f64>,
}

/// Top-level catalog file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CatalogFile {
    /// One section per provider
    #[serde(default)]
    pub providers: Vec<ProviderPricing>,
}
