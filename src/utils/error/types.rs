//! Error types for the usage meter

use thiserror::Error;

/// Result type alias for the usage meter
pub type Result<T> = std::result::Result<T, MeterError>;

/// Main error type for the usage meter
#[derive(Error, Debug)]
pub enum MeterError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid endpoint or host pattern
    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Parsing errors
    #[error("Parsing error: {0}")]
    Parsing(String),

    /// Streaming lifecycle errors
    #[error("Stream error: {0}")]
    Stream(String),

    /// `finish()` was called on a stream that already handed off its record
    #[error("Stream already finished: {0}")]
    StreamFinished(String),

    /// Persistence or media storage boundary errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}
