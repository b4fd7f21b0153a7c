//! Configuration management for the usage meter
//!
//! Settings come from a YAML file, `LLM_USAGE_*` environment variables, or
//! both. Everything is validated before use.

pub mod loader;
pub mod models;
pub mod validation;

pub use loader::{ENV_PREFIX, parse_custom_hosts};
pub use models::*;
pub use validation::Validate;
