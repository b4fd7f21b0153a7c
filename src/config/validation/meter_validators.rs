//! Validators for the meter configuration

use super::trait_def::Validate;
use crate::config::models::*;
use crate::core::types::Provider;
use tracing::debug;
use tracing_subscriber::EnvFilter;

impl Validate for MeterConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating meter configuration");

        for (name, hosts) in &self.custom_hosts {
            name.parse::<Provider>()?;
            for host in hosts {
                if host.trim().is_empty() {
                    return Err(format!("Custom host for {} cannot be empty", name));
                }
                if host.contains('/') {
                    return Err(format!(
                        "Custom host {} for {} must be a hostname, not a URL or path",
                        host, name
                    ));
                }
            }
        }

        if self.default_currency.len() != 3
            || !self.default_currency.chars().all(|c| c.is_ascii_uppercase())
        {
            return Err(format!(
                "Default currency must be a three-letter ISO code, got {}",
                self.default_currency
            ));
        }

        if let Some(path) = &self.pricing_catalog {
            if path.as_os_str().is_empty() {
                return Err("Pricing catalog path cannot be empty".to_string());
            }
        }

        self.sanitize.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

impl Validate for SanitizeConfig {
    fn validate(&self) -> Result<(), String> {
        if self.base64_min_length == 0 {
            return Err("Sanitize base64_min_length must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Validate for LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        EnvFilter::try_new(&self.level)
            .map(|_| ())
            .map_err(|e| format!("Invalid log level {}: {}", self.level, e))
    }
}
