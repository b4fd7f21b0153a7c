//! Configuration validation

mod meter_validators;
mod trait_def;

pub use trait_def::Validate;
