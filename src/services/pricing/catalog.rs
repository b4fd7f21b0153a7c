//! In-memory pricing catalog
//!
//! Built once at startup and read-only afterwards. Model lookups tolerate
//! the name variations providers report: casing, date-stamped snapshots and
//! suffixed variants.

use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use super::types::{CatalogFile, ModelDefinition, ProviderPricing};
use crate::core::types::{ModelType, Provider};
use crate::utils::error::{MeterError, Result};

/// Trailing release dates: `-2024-08-06`, `-20250514`, `@20240620`
static DATE_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[-@](\d{4}-\d{2}-\d{2}|\d{8})$").expect("Invalid date suffix regex")
});

#[derive(Debug, Clone, Default)]
struct ProviderEntry {
    models: Vec<ModelDefinition>,
    by_name: HashMap<String, usize>,
    tool_prices: BTreeMap<String, f64>,
}

impl ProviderEntry {
    fn insert(&mut self, model: ModelDefinition) {
        let key = model.internal_name.to_lowercase();
        match self.by_name.get(&key) {
            Some(&idx) => self.models[idx] = model,
            None => {
                self.by_name.insert(key, self.models.len());
                self.models.push(model);
            }
        }
    }

    fn exact(&self, name: &str) -> Option<&ModelDefinition> {
        self.by_name.get(name).map(|&idx| &self.models[idx])
    }

    /// Longest catalog name that prefixes `name` at a `-` boundary
    fn longest_prefix(&self, name: &str, kind: Option<ModelType>) -> Option<&ModelDefinition> {
        let mut candidates: Vec<&ModelDefinition> = self
            .models
            .iter()
            .filter(|m| {
                let base = m.internal_name.to_lowercase();
                name.strip_prefix(base.as_str())
                    .is_some_and(|rest| rest.starts_with('-') || rest.starts_with(':'))
            })
            .collect();
        candidates.sort_by_key(|m| {
            (
                m.internal_name.len(),
                kind.is_some_and(|k| k == m.model_type),
            )
        });
        candidates.pop()
    }
}

/// Pricing catalog keyed by provider and model
#[derive(Debug, Clone, Default)]
pub struct PricingCatalog {
    providers: HashMap<Provider, ProviderEntry>,
}

impl PricingCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with the built-in price tables
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        for section in super::builtin::sections() {
            catalog.add_section(section);
        }
        catalog
    }

    /// Add or replace a model definition
    pub fn register(&mut self, provider: Provider, model: ModelDefinition) {
        self.providers.entry(provider).or_default().insert(model);
    }

    /// Set the per-call price of a tool kind, in cents
    pub fn register_tool_price(&mut self, provider: Provider, kind: impl Into<String>, cents: f64) {
        self.providers
            .entry(provider)
            .or_default()
            .tool_prices
            .insert(kind.into(), cents);
    }

    /// Merge a catalog file over the current entries
    pub fn merge(&mut self, file: CatalogFile) -> Result<()> {
        for section in &file.providers {
            validate_section(section)?;
        }
        for section in file.providers {
            self.add_section(section);
        }
        Ok(())
    }

    /// Layer every entry of `other` over this catalog
    pub fn overlay(&mut self, other: PricingCatalog) {
        for (provider, entry) in other.providers {
            for model in entry.models {
                self.register(provider, model);
            }
            for (kind, cents) in entry.tool_prices {
                self.register_tool_price(provider, kind, cents);
            }
        }
    }

    fn add_section(&mut self, section: ProviderPricing) {
        let provider = section.provider;
        debug!(
            provider = %provider,
            models = section.models.len(),
            "Loading pricing section"
        );
        for model in section.models {
            self.register(provider, model);
        }
        for (kind, cents) in section.tool_prices {
            self.register_tool_price(provider, kind, cents);
        }
    }

    /// Find a model definition.
    ///
    /// Tries the exact name, then without a `models/` prefix and lowercased,
    /// then without a trailing release date, then the longest catalog name
    /// prefixing it. `kind` breaks ties between equally long prefixes.
    /// Azure falls back to the OpenAI tables.
    pub fn find(
        &self,
        provider: Provider,
        model: &str,
        kind: Option<ModelType>,
    ) -> Option<&ModelDefinition> {
        self.find_in(provider, model, kind).or_else(|| match provider {
            Provider::Azure => self.find_in(Provider::OpenAI, model, kind),
            _ => None,
        })
    }

    fn find_in(
        &self,
        provider: Provider,
        model: &str,
        kind: Option<ModelType>,
    ) -> Option<&ModelDefinition> {
        let entry = self.providers.get(&provider)?;
        let normalized = model.trim().trim_start_matches("models/").to_lowercase();
        if normalized.is_empty() {
            return None;
        }

        entry
            .exact(&normalized)
            .or_else(|| {
                let undated = DATE_SUFFIX.replace(&normalized, "");
                entry.exact(&undated)
            })
            .or_else(|| entry.longest_prefix(&normalized, kind))
    }

    /// Per-call price of a tool kind, in cents
    pub fn tool_price(&self, provider: Provider, kind: &str) -> Option<f64> {
        let lookup = |p: Provider| {
            self.providers
                .get(&p)
                .and_then(|e| e.tool_prices.get(kind).copied())
        };
        lookup(provider).or_else(|| match provider {
            Provider::Azure => lookup(Provider::OpenAI),
            _ => None,
        })
    }

    /// Every model of a provider, in registration order
    pub fn models(&self, provider: Provider) -> &[ModelDefinition] {
        self.providers
            .get(&provider)
            .map(|e| e.models.as_slice())
            .unwrap_or(&[])
    }

    /// Every (provider, model) pair
    pub fn iter(&self) -> impl Iterator<Item = (Provider, &ModelDefinition)> {
        Provider::ALL
            .into_iter()
            .flat_map(move |p| self.models(p).iter().map(move |m| (p, m)))
    }

    pub fn len(&self) -> usize {
        self.providers.values().map(|e| e.models.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn validate_section(section: &ProviderPricing) -> Result<()> {
    for model in &section.models {
        if model.internal_name.trim().is_empty() {
            return Err(MeterError::validation(format!(
                "{} model with empty internal_name",
                section.provider
            )));
        }
        if model.tiers.is_empty() {
            warn!(
                provider = %section.provider,
                model = %model.internal_name,
                "Model has no pricing tiers and will cost nothing"
            );
        }
        if let Some(tier) = model.tiers.iter().find(|t| !t.is_valid()) {
            return Err(MeterError::validation(format!(
                "{}/{} tier {} has a negative or non-finite price",
                section.provider, model.internal_name, tier.name
            )));
        }
    }
    if let Some((kind, _)) = section
        .tool_prices
        .iter()
        .find(|(_, p)| !p.is_finite() || **p < 0.0)
    {
        return Err(MeterError::validation(format!(
            "{} tool price for {} is negative or non-finite",
            section.provider, kind
        )));
    }
    Ok(())
}
