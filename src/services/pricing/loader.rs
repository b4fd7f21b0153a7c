//! Data loading functionality for the pricing catalog

use std::path::Path;

use tracing::{debug, info};

use super::catalog::PricingCatalog;
use super::types::CatalogFile;
use crate::utils::error::{MeterError, Result};

impl PricingCatalog {
    /// Parse a YAML catalog file
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let file: CatalogFile = serde_yaml::from_str(content)?;
        Self::from_catalog_file(file)
    }

    /// Parse a JSON catalog file
    pub fn from_json_str(content: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(content)?;
        Self::from_catalog_file(file)
    }

    /// Load a catalog from disk; `.json` files are JSON, anything else YAML
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let catalog = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_yaml_str(&content),
        }
        .map_err(|e| MeterError::config(format!("{}: {}", path.display(), e)))?;

        info!(
            "Loaded pricing catalog from {} ({} models)",
            path.display(),
            catalog.len()
        );
        Ok(catalog)
    }

    /// Built-in tables overlaid with a catalog file
    pub fn builtin_with_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let overlay = Self::from_file(path)?;
        let mut catalog = Self::builtin();
        catalog.overlay(overlay);
        Ok(catalog)
    }

    fn from_catalog_file(file: CatalogFile) -> Result<Self> {
        let mut catalog = Self::new();
        catalog.merge(file)?;
        debug!("Parsed pricing catalog with {} models", catalog.len());
        Ok(catalog)
    }
}
