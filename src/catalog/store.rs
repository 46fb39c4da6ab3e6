use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};
use thiserror::Error;

use crate::core::result::Attributes;
use crate::core::types::{CatalogLayout, FormatId};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalog: {0}")]
    Parse(serde_yaml::Error),

    #[error("Invalid catalog structure: {0}")]
    InvalidStructure(String),

    #[error("Duplicate catalog key: {0}")]
    DuplicateKey(String),
}

impl From<serde_yaml::Error> for CatalogError {
    fn from(err: serde_yaml::Error) -> Self {
        // serde_yaml 0.9 rejects repeated mapping keys while building a
        // `Value` and reports them only through the message of its private
        // `DuplicateKeyError`: "duplicate entry with key ...". The test
        // `test_duplicate_model_key_is_fatal` pins that wording.
        let message = err.to_string();
        if message.contains(DUPLICATE_KEY_MESSAGE) {
            Self::DuplicateKey(message)
        } else {
            Self::Parse(err)
        }
    }
}

/// Message fragment of serde_yaml's duplicate mapping key error
const DUPLICATE_KEY_MESSAGE: &str = "duplicate entry";

/// Reserved key holding a pattern list
pub const PATTERNS_KEY: &str = "patterns";

/// Reserved model key holding the entry's format in flat catalogs
pub const FORMAT_KEY: &str = "format";

/// One brand/model (or brand-level) entry of a catalog
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub brand: String,

    /// `None` for brand-level entries
    pub model: Option<String>,

    /// Partition key, or the model's `format` attribute in flat catalogs
    pub format: Option<FormatId>,

    /// Raw pattern strings in catalog order
    pub patterns: Vec<String>,

    pub attributes: Attributes,
}

impl CatalogEntry {
    pub fn is_brand_level(&self) -> bool {
        self.model.is_none()
    }
}

/// A product catalog: brand → model → patterns, optionally partitioned by format
#[derive(Debug, Clone)]
pub struct Catalog {
    layout: CatalogLayout,

    /// All entries in catalog order
    entries: Vec<CatalogEntry>,

    /// Declared formats in order of first appearance
    formats: Vec<FormatId>,

    /// Index: (brand, model) -> indices into entries
    by_brand_model: HashMap<(String, String), Vec<usize>>,

    /// File the catalog was read from, if any
    source: Option<PathBuf>,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new(layout: CatalogLayout) -> Self {
        Self {
            layout,
            entries: Vec::new(),
            formats: Vec::new(),
            by_brand_model: HashMap::new(),
            source: None,
        }
    }

    /// Load a catalog from a YAML file
    pub fn load(path: &Path, layout: CatalogLayout) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut catalog = Self::from_yaml_str(&content, layout)?;
        catalog.source = Some(path.to_path_buf());
        tracing::info!(
            path = %path.display(),
            entries = catalog.len(),
            formats = catalog.formats.len(),
            "Loaded catalog"
        );
        Ok(catalog)
    }

    /// Parse a catalog from a YAML string
    pub fn from_yaml_str(yaml: &str, layout: CatalogLayout) -> Result<Self, CatalogError> {
        let value: Value = serde_yaml::from_str(yaml)?;
        Self::from_value(&value, layout)
    }

    /// Build a catalog from an already-parsed YAML document
    pub fn from_value(value: &Value, layout: CatalogLayout) -> Result<Self, CatalogError> {
        let root = value.as_mapping().ok_or_else(|| {
            CatalogError::InvalidStructure("top level must be a mapping".to_string())
        })?;

        let mut catalog = Self::new(layout);
        match layout {
            CatalogLayout::Flat => {
                for entry in parse_brands(root, None)? {
                    catalog.add_entry(entry);
                }
            }
            CatalogLayout::Partitioned => {
                let mut seen: HashSet<FormatId> = HashSet::new();
                for (key, body) in root {
                    let label = key_to_string(key, "format")?;
                    let format = FormatId::new(&label);
                    if !seen.insert(format.clone()) {
                        return Err(CatalogError::DuplicateKey(format!(
                            "format partition '{label}' collides with an existing partition"
                        )));
                    }
                    catalog.declare_format(format.clone());

                    // An empty partition is still a declared format
                    let brands = match body {
                        Value::Null => continue,
                        Value::Mapping(m) => m,
                        _ => {
                            return Err(CatalogError::InvalidStructure(format!(
                                "format '{label}' must map brands"
                            )))
                        }
                    };
                    for entry in parse_brands(brands, Some(&format))? {
                        catalog.add_entry(entry);
                    }
                }
            }
        }

        Ok(catalog)
    }

    /// Add an entry, indexing it by brand/model and declaring its format
    pub fn add_entry(&mut self, entry: CatalogEntry) {
        let index = self.entries.len();

        if let Some(format) = &entry.format {
            self.declare_format(format.clone());
        }

        if let Some(model) = &entry.model {
            self.by_brand_model
                .entry((entry.brand.clone(), model.clone()))
                .or_default()
                .push(index);
        }

        self.entries.push(entry);
    }

    fn declare_format(&mut self, format: FormatId) {
        if !self.formats.contains(&format) {
            self.formats.push(format);
        }
    }

    /// Find a model entry, optionally restricted to one format
    pub fn find_entry(
        &self,
        format: Option<&FormatId>,
        brand: &str,
        model: &str,
    ) -> Option<&CatalogEntry> {
        self.by_brand_model
            .get(&(brand.to_string(), model.to_string()))?
            .iter()
            .map(|&idx| &self.entries[idx])
            .find(|entry| format.map_or(true, |f| entry.format.as_ref() == Some(f)))
    }

    /// All entries in catalog order
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Entry at `index` in catalog order
    pub fn entry(&self, index: usize) -> Option<&CatalogEntry> {
        self.entries.get(index)
    }

    pub fn layout(&self) -> CatalogLayout {
        self.layout
    }

    /// Formats declared by the catalog (partition keys or entry formats)
    pub fn formats(&self) -> &[FormatId] {
        &self.formats
    }

    pub fn has_format(&self, format: &FormatId) -> bool {
        self.formats.contains(format)
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Number of entries in catalog
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if catalog is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Render a mapping key; YAML allows numeric model names such as `1912`
pub(crate) fn key_to_string(key: &Value, what: &str) -> Result<String, CatalogError> {
    match key {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(CatalogError::InvalidStructure(format!(
            "{what} key must be a scalar, found {key:?}"
        ))),
    }
}

fn parse_brands(brands: &Mapping, partition: Option<&FormatId>) -> Result<Vec<CatalogEntry>, CatalogError> {
    let mut entries = Vec::new();

    for (brand_key, brand_value) in brands {
        let brand = key_to_string(brand_key, "brand")?;
        let models = brand_value.as_mapping().ok_or_else(|| {
            CatalogError::InvalidStructure(format!("brand '{brand}' must be a mapping"))
        })?;

        for (model_key, model_value) in models {
            let name = key_to_string(model_key, "model")?;

            if name == PATTERNS_KEY {
                entries.push(CatalogEntry {
                    brand: brand.clone(),
                    model: None,
                    format: partition.cloned(),
                    patterns: parse_patterns(model_value, &brand)?,
                    attributes: Attributes::new(),
                });
                continue;
            }

            let fields = model_value.as_mapping().ok_or_else(|| {
                CatalogError::InvalidStructure(format!(
                    "model '{brand} / {name}' must be a mapping"
                ))
            })?;
            entries.push(parse_model(&brand, name, fields, partition)?);
        }
    }

    Ok(entries)
}

fn parse_model(
    brand: &str,
    model: String,
    fields: &Mapping,
    partition: Option<&FormatId>,
) -> Result<CatalogEntry, CatalogError> {
    let mut patterns = Vec::new();
    let mut format = partition.cloned();
    let mut attributes = Attributes::new();

    for (key, value) in fields {
        let name = key_to_string(key, "attribute")?;
        if name == PATTERNS_KEY {
            patterns = parse_patterns(value, &format!("{brand} / {model}"))?;
        } else if name == FORMAT_KEY && partition.is_none() {
            let label = value.as_str().ok_or_else(|| {
                CatalogError::InvalidStructure(format!(
                    "format of '{brand} / {model}' must be a string"
                ))
            })?;
            format = Some(FormatId::new(label));
        } else {
            attributes.insert(name, value.clone());
        }
    }

    Ok(CatalogEntry {
        brand: brand.to_string(),
        model: Some(model),
        format,
        patterns,
        attributes,
    })
}

fn parse_patterns(value: &Value, owner: &str) -> Result<Vec<String>, CatalogError> {
    let items = match value {
        Value::Null => return Ok(Vec::new()),
        Value::String(s) => return Ok(vec![s.clone()]),
        Value::Sequence(items) => items,
        _ => {
            return Err(CatalogError::InvalidStructure(format!(
                "patterns of '{owner}' must be a list of strings"
            )))
        }
    };

    items
        .iter()
        .map(|item| match item {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            _ => Err(CatalogError::InvalidStructure(format!(
                "pattern of '{owner}' must be a string, found {item:?}"
            ))),
        })
        .collect()
}
