//! Catalog loading, compilation and curated lookup tables.
//!
//! A catalog maps brand → model → patterns for one product domain. Blade
//! catalogs add one more level on top, keyed by format:
//!
//! ```yaml
//! DE:
//!   Feather:
//!     Hi-Stainless:
//!       patterns: ['feather.*(hi|stainless)']
//! Half DE:
//!   Perma-Sharp:
//!     SE:
//!       patterns: ['perma.*sharp.*se']
//! ```
//!
//! Next to the catalog live two curated tables:
//!
//! - **Correct matches** ([`correct::CorrectMatchIndex`]): literal strings
//!   known to resolve to one brand/model, looked up before any pattern.
//! - **Exclusions** ([`filtered::ExclusionList`]): literal strings that are
//!   not products, or are deliberately left unmatched.
//!
//! A missing or malformed catalog is fatal; curated tables degrade to empty.

use std::path::{Path, PathBuf};

use crate::core::types::Domain;

pub mod compiler;
pub mod correct;
pub mod filtered;
pub mod store;

/// Where a curated table comes from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DataSource {
    /// No table configured
    #[default]
    Missing,
    /// Read from disk on every rebuild
    File(PathBuf),
    /// In-memory YAML document
    Inline(String),
}

impl DataSource {
    /// Read the document; a missing file reads as no document
    pub fn read(&self) -> std::io::Result<Option<String>> {
        match self {
            Self::Missing => Ok(None),
            Self::Inline(content) => Ok(Some(content.clone())),
            Self::File(path) => match std::fs::read_to_string(path) {
                Ok(content) => Ok(Some(content)),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                    tracing::debug!(path = %path.display(), "Curated file not found");
                    Ok(None)
                }
                Err(err) => Err(err),
            },
        }
    }
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing => write!(f, "none"),
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Inline(_) => write!(f, "inline"),
        }
    }
}

/// Files backing one domain's engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSources {
    pub catalog: PathBuf,
    pub correct_matches: DataSource,
    pub exclusions: DataSource,
}

impl CatalogSources {
    /// Catalog only, no curated tables
    pub fn new(catalog: impl Into<PathBuf>) -> Self {
        Self {
            catalog: catalog.into(),
            correct_matches: DataSource::Missing,
            exclusions: DataSource::Missing,
        }
    }

    /// Conventional layout of a data directory:
    /// `<dir>/<domain plural>.yaml`, `<dir>/correct_matches/<domain>.yaml`,
    /// `<dir>/filtered/<domain>.yaml`
    pub fn from_data_dir(dir: &Path, domain: Domain) -> Self {
        let curated = format!("{}.yaml", domain.as_str());
        Self {
            catalog: dir.join(domain.catalog_file()),
            correct_matches: DataSource::File(dir.join("correct_matches").join(&curated)),
            exclusions: DataSource::File(dir.join("filtered").join(curated)),
        }
    }

    #[must_use]
    pub fn with_correct_matches(mut self, source: DataSource) -> Self {
        self.correct_matches = source;
        self
    }

    #[must_use]
    pub fn with_exclusions(mut self, source: DataSource) -> Self {
        self.exclusions = source;
        self
    }
}
