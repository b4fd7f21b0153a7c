//! Usage meter configuration

use std::collections::HashMap;
use std::path::PathBuf;

use super::*;
use serde::{Deserialize, Serialize};

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeterConfig {
    /// Hand storable media to the media store
    #[serde(default)]
    pub persist_media: bool,
    /// Extra host patterns per provider slug, checked before built-in hosts
    #[serde(default)]
    pub custom_hosts: HashMap<String, Vec<String>>,
    /// Pricing catalog file layered over the built-in tables
    #[serde(default)]
    pub pricing_catalog: Option<PathBuf>,
    #[serde(default = "default_currency")]
    pub default_currency: String,
    #[serde(default)]
    pub sanitize: SanitizeConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            persist_media: false,
            custom_hosts: HashMap::new(),
            pricing_catalog: None,
            default_currency: default_currency(),
            sanitize: SanitizeConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Body sanitization settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SanitizeConfig {
    /// Strings at least this long that look like base64 are replaced
    #[serde(default = "default_base64_min_length")]
    pub base64_min_length: usize,
}

impl Default for SanitizeConfig {
    fn default() -> Self {
        Self {
            base64_min_length: default_base64_min_length(),
        }
    }
}
