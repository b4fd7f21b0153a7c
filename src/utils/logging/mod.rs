//! Logging setup
//!
//! The library only emits `tracing` events; binaries and tests decide how they
//! are rendered by calling [`init_logging`].

use crate::config::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Install a global `tracing` subscriber.
///
/// `RUST_LOG` wins over the configured level when it is set. Calling this more
/// than once is harmless: later calls leave the first subscriber in place.
pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false);

    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if result.is_err() {
        tracing::debug!("Global subscriber already installed, keeping it");
    }
}

/// Generate an id for a request that arrived without one
pub fn new_request_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
