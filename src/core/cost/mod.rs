//! Cost calculation
//!
//! Token prices are cents per million tokens; unit prices are cents per
//! unit of the model's pricing unit. Every result is in cents.

pub mod calculator;
pub mod types;
pub mod utils;

// Re-export main types and functions
pub use calculator::CostCalculator;
pub use types::{CostBreakdown, UsageQuantities};
pub use utils::{format_cents, tokens_to_cost, unit_quantity};
