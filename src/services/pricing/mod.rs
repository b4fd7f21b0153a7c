//! Pricing catalog
//!
//! Per-provider, per-model tiered price tables keyed by a pricing-unit
//! discriminator. Loaded once at startup, optionally overlaid with an
//! operator-supplied YAML or JSON file, then shared read-only.

mod builtin;
mod catalog;
mod loader;
mod types;


// Re-export public types
pub use catalog::PricingCatalog;
pub use types::{CatalogFile, ModelDefinition, PricingTier, ProviderPricing};
