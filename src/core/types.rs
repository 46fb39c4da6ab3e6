use serde::{Deserialize, Serialize};

/// Canonical identifier of a format partition (e.g. `DE`, `HALF DE`).
///
/// Format labels are compared case-insensitively everywhere, so the
/// identifier stores the trimmed, upper-cased form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FormatId(String);

impl FormatId {
    pub fn new(s: impl AsRef<str>) -> Self {
        Self(s.as_ref().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FormatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for FormatId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Product domain a catalog (and engine) covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Razor,
    Blade,
    Brush,
    Soap,
}

impl Domain {
    /// Conventional catalog file name inside a data directory
    #[must_use]
    pub fn catalog_file(self) -> &'static str {
        match self {
            Self::Razor => "razors.yaml",
            Self::Blade => "blades.yaml",
            Self::Brush => "brushes.yaml",
            Self::Soap => "soaps.yaml",
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Razor => "razor",
            Self::Blade => "blade",
            Self::Brush => "brush",
            Self::Soap => "soap",
        }
    }

    /// Catalog layout used by this domain
    #[must_use]
    pub fn layout(self) -> CatalogLayout {
        match self {
            Self::Blade => CatalogLayout::Partitioned,
            Self::Razor | Self::Brush | Self::Soap => CatalogLayout::Flat,
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Shape of a catalog (and of its correct-matches table)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogLayout {
    /// brand → model → entry
    Flat,
    /// format → brand → model → entry
    Partitioned,
}

/// How a match was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Literal hit in the correct-matches table
    Exact,
    /// Model-level catalog pattern
    Regex,
    /// Brand-level catalog pattern, model unknown
    Brand,
    /// Derived from the text itself (dash split)
    Alias,
    /// Listed as not being a product at all
    Filtered,
    /// Known product mention deliberately left unmatched
    IntentionallyUnmatched,
    /// Payload implied by the context label
    AutoContext,
    /// Context makes this product irrelevant
    IrrelevantContext,
}

impl MatchKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Regex => "regex",
            Self::Brand => "brand",
            Self::Alias => "alias",
            Self::Filtered => "filtered",
            Self::IntentionallyUnmatched => "intentionally_unmatched",
            Self::AutoContext => "auto_context",
            Self::IrrelevantContext => "irrelevant_context",
        }
    }
}

impl std::fmt::Display for MatchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
