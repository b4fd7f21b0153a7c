//! Error handling for the usage meter
//!
//! Extraction code never returns these errors: malformed provider payloads
//! degrade to empty metrics. `MeterError` covers configuration, catalog
//! loading, boundary failures and stream lifecycle misuse.

mod helpers;
mod types;

pub use types::{MeterError, Result};
