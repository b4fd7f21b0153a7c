//! Services module
//!
//! Pricing data, the usage meter and the boundaries it hands records to.

pub mod boundaries;
pub mod meter;
pub mod pricing;

pub use boundaries::{AudioDurationProbe, InMemorySink, MediaStore, RecordHandle, UsageSink};
pub use meter::UsageMeter;
pub use pricing::PricingCatalog;
