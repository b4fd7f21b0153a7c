//! Cost calculation types
//!
//! All amounts are cents as `f64`; fractional cents are kept.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::processing::tools::WEB_SEARCH_CALL;
use crate::core::types::{Metrics, PricingTierName, PricingUnit, TokenMetrics};

/// Every usage quantity a price can apply to
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UsageQuantities {
    /// Token counts for token-priced tiers
    pub tokens: TokenMetrics,
    /// Audio or video length, for per-second and per-minute units
    pub duration_seconds: Option<f64>,
    /// Input characters, for per-character units
    pub characters: Option<u64>,
    /// Generated images
    pub images: u64,
    /// Generated videos
    pub videos: u64,
    /// Web searches, for per-search units
    pub searches: u64,
    /// Tool-call counts keyed by kind
    pub tool_calls: BTreeMap<String, u64>,
}

impl UsageQuantities {
    /// Quantities carrying token counts only
    pub fn from_tokens(tokens: TokenMetrics) -> Self {
        Self {
            tokens,
            ..Default::default()
        }
    }

    /// Collect quantities from extracted metrics and a tool-call tally
    pub fn from_metrics(metrics: &Metrics, tool_calls: &BTreeMap<String, u64>) -> Self {
        Self {
            tokens: metrics.tokens_or_default(),
            duration_seconds: metrics.duration_seconds(),
            characters: metrics.input_characters(),
            images: metrics.image_count(),
            videos: metrics.video_count(),
            searches: tool_calls.get(WEB_SEARCH_CALL).copied().unwrap_or(0),
            tool_calls: tool_calls.clone(),
        }
    }

    /// Attach a tool-call tally; web searches also count as searches
    pub fn with_tool_calls(mut self, tool_calls: BTreeMap<String, u64>) -> Self {
        self.searches = tool_calls.get(WEB_SEARCH_CALL).copied().unwrap_or(0);
        self.tool_calls = tool_calls;
        self
    }
}

/// Priced result of one call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    /// Prompt-side token cost, when the tier prices tokens
    pub prompt_cost: Option<f64>,
    /// Completion-side token cost, when the tier prices tokens
    pub completion_cost: Option<f64>,
    /// Flat per-unit cost for non-token pricing units
    pub unit_cost: f64,
    /// Tool-call surcharge
    pub tool_cost: f64,
    /// Sum of every component
    pub total_cost: f64,
    /// Tier the prices were taken from
    pub tier: Option<PricingTierName>,
    /// Pricing unit of the matched model
    pub unit: Option<PricingUnit>,
    /// Whether the catalog had the model; false means every cost is zero
    pub model_found: bool,
}

impl CostBreakdown {
    /// Result for a model the catalog does not know
    pub fn zero() -> Self {
        Self {
            prompt_cost: None,
            completion_cost: None,
            unit_cost: 0.0,
            tool_cost: 0.0,
            total_cost: 0.0,
            tier: None,
            unit: None,
            model_found: false,
        }
    }

    /// Recompute `total_cost` from the components
    pub fn calculate_total(&mut self) {
        self.total_cost = self.prompt_cost.unwrap_or(0.0)
            + self.completion_cost.unwrap_or(0.0)
            + self.unit_cost
            + self.tool_cost;
    }
}

impl Default for CostBreakdown {
    fn default() -> Self {
        Self::zero()
    }
}
