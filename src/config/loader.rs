//! Configuration loading utilities
//!
//! Loads the meter configuration from YAML files and environment variables.

use super::models::*;
use super::validation::Validate;
use crate::core::types::Provider;
use crate::services::pricing::PricingCatalog;
use crate::utils::error::{MeterError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable prefix for every meter setting
pub const ENV_PREFIX: &str = "LLM_USAGE_";

impl MeterConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = std::fs::read_to_string(path)
            .map_err(|e| MeterError::config(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_yaml_str(&content)?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Parse and validate configuration from a YAML string
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: MeterConfig = serde_yaml::from_str(content)
            .map_err(|e| MeterError::config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every section, mapping failures to `MeterError::Config`
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(MeterError::config)
    }

    /// Load configuration from environment variables, reading `.env` first
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let mut config = Self::default();
        config.apply_env_from(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields from `LLM_USAGE_*` variables resolved through `lookup`
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        debug!("Applying configuration overrides from environment");
        let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

        if let Some(value) = var("PERSIST_MEDIA") {
            self.persist_media = parse_bool("PERSIST_MEDIA", &value)?;
        }
        if let Some(value) = var("PRICING_CATALOG") {
            self.pricing_catalog = Some(PathBuf::from(value));
        }
        if let Some(value) = var("CURRENCY") {
            self.default_currency = value.trim().to_uppercase();
        }
        if let Some(value) = var("BASE64_MIN_LENGTH") {
            self.sanitize.base64_min_length = value.trim().parse().map_err(|e| {
                MeterError::config(format!("Invalid base64 min length: {}", e))
            })?;
        }
        if let Some(value) = var("LOG_LEVEL") {
            self.logging.level = value;
        }
        if let Some(value) = var("LOG_JSON") {
            self.logging.json = parse_bool("LOG_JSON", &value)?;
        }
        if let Some(value) = var("CUSTOM_HOSTS") {
            for (name, hosts) in parse_custom_hosts(&value)? {
                self.custom_hosts.entry(name).or_default().extend(hosts);
            }
        }
        Ok(())
    }

    /// Build the pricing catalog: built-in tables plus the configured file
    pub fn load_catalog(&self) -> Result<PricingCatalog> {
        match &self.pricing_catalog {
            Some(path) => PricingCatalog::builtin_with_file(path),
            None => Ok(PricingCatalog::builtin()),
        }
    }
}

/// Parse `provider=host1|host2;provider2=host3`
pub fn parse_custom_hosts(value: &str) -> Result<HashMap<String, Vec<String>>> {
    let mut hosts: HashMap<String, Vec<String>> = HashMap::new();
    for entry in value.split(';').map(str::trim).filter(|e| !e.is_empty()) {
        let (name, list) = entry.split_once('=').ok_or_else(|| {
            MeterError::config(format!("Invalid custom host entry: {}", entry))
        })?;
        let provider: Provider = name.trim().parse().map_err(MeterError::config)?;
        hosts.entry(provider.as_str().to_string()).or_default().extend(
            list.split('|')
                .map(str::trim)
                .filter(|h| !h.is_empty())
                .map(str::to_string),
        );
    }
    Ok(hosts)
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(MeterError::config(format!(
            "Invalid boolean for {}{}: {}",
            ENV_PREFIX, name, other
        ))),
    }
}
