//! Configuration data models

pub mod logging;
pub mod meter;

// Re-export all configuration types
pub use logging::*;
pub use meter::*;

/// Default currency code for recorded costs
pub fn default_currency() -> String {
    "USD".to_string()
}

/// Default minimum length of a string treated as inline base64
pub fn default_base64_min_length() -> usize {
    256
}

/// Default log level
pub fn default_log_level() -> String {
    "info".to_string()
}
