//! Cost calculator
//!
//! Resolves a (provider, model, tier, usage) tuple against the pricing
//! catalog. Never fails: unknown models price at zero and undefined tiers
//! fall back to standard.

use std::sync::Arc;

use tracing::debug;

use crate::core::cost::types::{CostBreakdown, UsageQuantities};
use crate::core::cost::utils::{tokens_to_cost, unit_quantity};
use crate::core::types::{
    ModelType, PricingTierName, PricingUnit, Provider, RequestContext, TokenMetrics,
};
use crate::services::pricing::{ModelDefinition, PricingCatalog, PricingTier};

/// Prices usage against a shared, read-only catalog
#[derive(Debug, Clone)]
pub struct CostCalculator {
    catalog: Arc<PricingCatalog>,
}

impl CostCalculator {
    /// Create a calculator over a loaded catalog
    pub fn new(catalog: Arc<PricingCatalog>) -> Self {
        Self { catalog }
    }

    /// Catalog prices are read from
    pub fn catalog(&self) -> &PricingCatalog {
        &self.catalog
    }

    /// Pricing unit of a model, if the catalog knows it
    pub fn pricing_unit(
        &self,
        provider: Provider,
        model: &str,
        kind: Option<ModelType>,
    ) -> Option<PricingUnit> {
        self.catalog
            .find(provider, model, kind)
            .map(|m| m.pricing_unit)
    }

    /// Price one call's usage
    pub fn calculate(
        &self,
        provider: Provider,
        model: &str,
        tier: Option<PricingTierName>,
        kind: Option<ModelType>,
        usage: &UsageQuantities,
    ) -> CostBreakdown {
        let Some(definition) = self.catalog.find(provider, model, kind) else {
            debug!(provider = %provider, model = %model, "Model not in pricing catalog, zero cost");
            return CostBreakdown::zero();
        };
        self.price_definition(provider, definition, tier, usage)
    }

    fn price_definition(
        &self,
        provider: Provider,
        definition: &ModelDefinition,
        tier: Option<PricingTierName>,
        usage: &UsageQuantities,
    ) -> CostBreakdown {
        let mut breakdown = CostBreakdown {
            model_found: true,
            unit: Some(definition.pricing_unit),
            ..CostBreakdown::zero()
        };

        let Some(price) = definition.resolve_tier(tier) else {
            debug!(model = %definition.internal_name, "Model has no pricing tiers");
            return breakdown;
        };
        if tier.is_some_and(|t| t != price.name) {
            debug!(
                model = %definition.internal_name,
                requested = ?tier,
                resolved = %price.name,
                "Pricing tier not defined, falling back"
            );
        }
        breakdown.tier = Some(price.name);

        if let Some(quantity) = unit_quantity(definition.pricing_unit, usage) {
            breakdown.unit_cost = quantity * price.price_per_unit.unwrap_or(0.0);
        }
        if definition.pricing_unit.is_token_based() || price.has_token_prices() {
            let (prompt, completion) = token_costs(price, &usage.tokens);
            breakdown.prompt_cost = Some(prompt);
            breakdown.completion_cost = Some(completion);
        }

        breakdown.tool_cost = usage
            .tool_calls
            .iter()
            .filter_map(|(kind, count)| {
                self.catalog
                    .tool_price(provider, kind)
                    .map(|cents| cents * *count as f64)
            })
            .sum();

        breakdown.calculate_total();
        breakdown
    }

    /// Price a context in place from its usage, model and tier.
    ///
    /// The canonical model is tried first, then the snapshot.
    pub fn price_context(&self, ctx: &mut RequestContext) -> CostBreakdown {
        let usage = UsageQuantities::from_metrics(&ctx.usage, &ctx.tool_calls);
        let definition = self
            .catalog
            .find(ctx.provider, &ctx.model, ctx.model_type)
            .or_else(|| {
                ctx.model_snapshot
                    .as_deref()
                    .and_then(|s| self.catalog.find(ctx.provider, s, ctx.model_type))
            });

        let breakdown = match definition {
            Some(definition) => {
                self.price_definition(ctx.provider, definition, ctx.pricing_tier, &usage)
            }
            None => {
                debug!(
                    request_id = %ctx.id,
                    provider = %ctx.provider,
                    model = %ctx.model,
                    "Model not in pricing catalog, zero cost"
                );
                CostBreakdown::zero()
            }
        };

        ctx.prompt_cost = breakdown.prompt_cost;
        ctx.completion_cost = breakdown.completion_cost;
        ctx.tool_cost = breakdown.tool_cost;
        ctx.total_cost = breakdown.total_cost;
        if breakdown.unit.is_some() {
            ctx.pricing_unit = breakdown.unit;
        }
        if breakdown.tier.is_some() {
            ctx.pricing_tier = breakdown.tier;
        }
        breakdown
    }
}

/// Prompt and completion cost of token usage.
///
/// Cached and cache-write tokens are sub-portions of the prompt and each use
/// their own rate, falling back to the input rate. Reasoning tokens are
/// completion tokens unless the tier declares a reasoning rate.
fn token_costs(price: &PricingTier, tokens: &TokenMetrics) -> (f64, f64) {
    let input = price.input_price.unwrap_or(0.0);
    let output = price.output_price.unwrap_or(0.0);

    let cached = tokens.cached_tokens.min(tokens.prompt_tokens);
    let write_5m = tokens
        .cache_write_5m_tokens
        .min(tokens.prompt_tokens - cached);
    let write_1h = tokens
        .cache_write_1h_tokens
        .min(tokens.prompt_tokens - cached - write_5m);
    let uncached = tokens.prompt_tokens - cached - write_5m - write_1h;

    let write_5m_price = price.cache_write_5m_price.unwrap_or(input);
    let write_1h_price = price.cache_write_1h_price.unwrap_or(write_5m_price);
    let prompt = tokens_to_cost(uncached, input)
        + tokens_to_cost(cached, price.cached_input_price.unwrap_or(input))
        + tokens_to_cost(write_5m, write_5m_price)
        + tokens_to_cost(write_1h, write_1h_price);

    let completion = match price.reasoning_price {
        Some(reasoning_price) => {
            let reasoning = tokens.reasoning_tokens.min(tokens.completion_tokens);
            tokens_to_cost(tokens.completion_tokens - reasoning, output)
                + tokens_to_cost(reasoning, reasoning_price)
        }
        None => tokens_to_cost(tokens.completion_tokens, output),
    };

    (prompt, completion)
}
