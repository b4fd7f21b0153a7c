//! Cost calculation helpers

use crate::core::cost::types::UsageQuantities;
use crate::core::types::PricingUnit;

const TOKENS_PER_PRICE_UNIT: f64 = 1_000_000.0;

/// Cost in cents of `tokens` at a price in cents per million tokens
pub fn tokens_to_cost(tokens: u64, price_per_million: f64) -> f64 {
    tokens as f64 * price_per_million / TOKENS_PER_PRICE_UNIT
}

/// The quantity a pricing unit bills, or `None` for token pricing
pub fn unit_quantity(unit: PricingUnit, usage: &UsageQuantities) -> Option<f64> {
    match unit {
        PricingUnit::Tokens => None,
        PricingUnit::Second => Some(usage.duration_seconds.unwrap_or(0.0)),
        PricingUnit::Minute => Some(usage.duration_seconds.unwrap_or(0.0) / 60.0),
        PricingUnit::Characters => Some(usage.characters.unwrap_or(0) as f64),
        PricingUnit::Image => Some(usage.images as f64),
        PricingUnit::Video => Some(usage.videos as f64),
        PricingUnit::Search => Some(usage.searches as f64),
    }
}

/// Render a cent amount for humans, e.g. `0.0118¢ ($0.000118)`
pub fn format_cents(cents: f64) -> String {
    format!("{:.6}¢ (${:.8})", cents, cents / 100.0)
}
