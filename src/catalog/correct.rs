use std::collections::HashMap;

use serde_yaml::{Mapping, Value};
use thiserror::Error;

use crate::catalog::store::{key_to_string, Catalog, CatalogError};
use crate::catalog::DataSource;
use crate::core::normalize::Normalizer;
use crate::core::result::Payload;
use crate::core::types::{CatalogLayout, FormatId};

/// Problems with a curated file. Never fatal: the affected index degrades
/// to empty.
#[derive(Error, Debug)]
pub enum OverrideLoadWarning {
    #[error("Failed to read curated file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse curated file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid curated file structure: {0}")]
    InvalidStructure(String),
}

impl From<CatalogError> for OverrideLoadWarning {
    fn from(err: CatalogError) -> Self {
        Self::InvalidStructure(err.to_string())
    }
}

/// Lookup key: normalized, then case-folded
pub(crate) fn literal_key(normalizer: &dyn Normalizer, text: &str) -> String {
    normalizer.normalize(text).to_lowercase()
}

/// Exact-string index over the correct-matches table.
///
/// One entry per distinct case-folded literal; when two records list the
/// same literal the later one wins.
#[derive(Debug, Clone, Default)]
pub struct CorrectMatchIndex {
    entries: HashMap<String, Payload>,
}

impl CorrectMatchIndex {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from a curated source, degrading to an empty index on any failure
    pub fn build(
        source: &DataSource,
        catalog: &Catalog,
        normalizer: &dyn Normalizer,
    ) -> Self {
        match Self::try_build(source, catalog, normalizer) {
            Ok(index) => {
                tracing::debug!(literals = index.len(), "Built correct-match index");
                index
            }
            Err(warning) => {
                tracing::warn!("Ignoring correct matches ({source}): {warning}");
                Self::empty()
            }
        }
    }

    /// Build from a curated source, reporting why it could not be used
    pub fn try_build(
        source: &DataSource,
        catalog: &Catalog,
        normalizer: &dyn Normalizer,
    ) -> Result<Self, OverrideLoadWarning> {
        let Some(content) = source.read()? else {
            return Ok(Self::empty());
        };
        let value: Value = serde_yaml::from_str(&content)?;
        Self::from_value(&value, catalog, normalizer)
    }

    /// Flatten `[format →] brand → model → [literal]` into a single map
    pub fn from_value(
        value: &Value,
        catalog: &Catalog,
        normalizer: &dyn Normalizer,
    ) -> Result<Self, OverrideLoadWarning> {
        let mut index = Self::empty();

        // An empty document is an empty table
        if value.is_null() {
            return Ok(index);
        }
        let root = as_mapping(value, "top level")?;

        match catalog.layout() {
            CatalogLayout::Flat => index.add_brands(root, None, catalog, normalizer)?,
            CatalogLayout::Partitioned => {
                for (key, brands) in root {
                    let format = FormatId::new(key_to_string(key, "format")?);
                    if brands.is_null() {
                        continue;
                    }
                    let brands = as_mapping(brands, &format!("format '{format}'"))?;
                    index.add_brands(brands, Some(&format), catalog, normalizer)?;
                }
            }
        }

        Ok(index)
    }

    fn add_brands(
        &mut self,
        brands: &Mapping,
        format: Option<&FormatId>,
        catalog: &Catalog,
        normalizer: &dyn Normalizer,
    ) -> Result<(), OverrideLoadWarning> {
        for (brand_key, models) in brands {
            let brand = key_to_string(brand_key, "brand")?;
            let models = as_mapping(models, &format!("brand '{brand}'"))?;

            for (model_key, literals) in models {
                let model = key_to_string(model_key, "model")?;
                let payload = record_payload(&brand, &model, format, catalog);

                for literal in as_literals(literals, &brand, &model)? {
                    let key = literal_key(normalizer, &literal);
                    if key.is_empty() {
                        continue;
                    }
                    if let Some(previous) = self.entries.insert(key, payload.clone()) {
                        if previous != payload {
                            tracing::debug!(
                                literal = %literal,
                                replaced = %previous.brand,
                                "Correct-match literal listed twice, keeping the later record"
                            );
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// O(1) lookup of an already-normalized text
    pub fn lookup(&self, normalized: &str) -> Option<&Payload> {
        self.entries.get(&normalized.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Payload for a curated record, enriched from the catalog when the
/// brand/model exists there
fn record_payload(
    brand: &str,
    model: &str,
    format: Option<&FormatId>,
    catalog: &Catalog,
) -> Payload {
    let mut payload = Payload::new(brand).with_model(model);

    match catalog.find_entry(format, brand, model) {
        Some(entry) => {
            if let Some(f) = &entry.format {
                payload = payload.with_format(f.as_str());
            }
            payload = payload.with_attributes(entry.attributes.clone());
        }
        None => {
            if let Some(f) = format {
                payload = payload.with_format(f.as_str());
            }
        }
    }

    payload
}

fn as_mapping<'a>(value: &'a Value, what: &str) -> Result<&'a Mapping, OverrideLoadWarning> {
    value
        .as_mapping()
        .ok_or_else(|| OverrideLoadWarning::InvalidStructure(format!("{what} must be a mapping")))
}

fn as_literals(value: &Value, brand: &str, model: &str) -> Result<Vec<String>, OverrideLoadWarning> {
    let invalid = || {
        OverrideLoadWarning::InvalidStructure(format!(
            "'{brand} / {model}' must list literal strings"
        ))
    };

    match value {
        Value::Null => Ok(Vec::new()),
        Value::String(s) => Ok(vec![s.clone()]),
        Value::Sequence(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                Value::Number(n) => Ok(n.to_string()),
                _ => Err(invalid()),
            })
            .collect(),
        _ => Err(invalid()),
    }
}
