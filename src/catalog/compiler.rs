//! Pattern compilation.
//!
//! Turns a [`Catalog`] into ranked, ready-to-search pattern lists. Every
//! (entry × pattern string) pair becomes one [`CompiledPattern`]; patterns
//! the regex engine rejects are dropped and reported as warnings instead of
//! failing the load.
//!
//! ## Invariants
//!
//! - `model_patterns` and `brand_patterns` are sorted once, by score and then
//!   catalog position, and never reordered afterwards.
//! - Every index list (`by_format`, `global_order`) points into
//!   `model_patterns` and preserves that rank order, except `global_order`
//!   which is re-ranked with the global ranker's format bias.

use std::collections::HashMap;

use regex::{Regex, RegexBuilder};
use serde::Serialize;

use crate::catalog::store::Catalog;
use crate::core::types::FormatId;
use crate::matching::scoring::{PatternRanker, ScoreTuple};

/// A catalog pattern ready for matching
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pub brand: String,
    pub model: Option<String>,
    pub format: Option<FormatId>,

    /// Pattern text as written in the catalog
    pub raw: String,

    /// Case-insensitive compiled form of `raw`
    pub regex: Regex,

    /// Specificity without format bias
    pub score: ScoreTuple,

    /// Index of the owning entry in `Catalog::entries()`
    pub entry: usize,
}

impl CompiledPattern {
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// A pattern that failed to compile and was skipped
#[derive(Debug, Clone, Serialize)]
pub struct PatternWarning {
    pub brand: String,
    pub model: Option<String>,
    pub format: Option<FormatId>,
    pub pattern: String,
    pub message: String,
}

impl std::fmt::Display for PatternWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.brand)?;
        if let Some(model) = &self.model {
            write!(f, " / {model}")?;
        }
        if let Some(format) = &self.format {
            write!(f, " [{format}]")?;
        }
        write!(f, ": invalid pattern '{}': {}", self.pattern, self.message)
    }
}

/// Ranked pattern lists derived from one catalog
#[derive(Debug, Clone, Default)]
pub struct CompiledCatalog {
    /// Model-level patterns in rank order
    pub model_patterns: Vec<CompiledPattern>,

    /// Brand-level patterns in rank order
    pub brand_patterns: Vec<CompiledPattern>,

    /// Index: format -> positions in `model_patterns`, rank order
    by_format: HashMap<FormatId, Vec<usize>>,

    /// Positions in `model_patterns` ordered for format-agnostic search
    global_order: Vec<usize>,

    /// Patterns dropped at compile time
    pub warnings: Vec<PatternWarning>,
}

impl CompiledCatalog {
    /// Patterns of one format partition, most specific first
    pub fn in_format<'a>(&'a self, format: &FormatId) -> impl Iterator<Item = &'a CompiledPattern> {
        self.by_format
            .get(format)
            .into_iter()
            .flatten()
            .map(move |&idx| &self.model_patterns[idx])
    }

    /// All model patterns in global search order
    pub fn global(&self) -> impl Iterator<Item = &CompiledPattern> {
        self.global_order.iter().map(move |&idx| &self.model_patterns[idx])
    }

    /// Number of compiled patterns in a format partition
    pub fn format_len(&self, format: &FormatId) -> usize {
        self.by_format.get(format).map_or(0, Vec::len)
    }

    /// Total number of compiled patterns (model and brand level)
    pub fn len(&self) -> usize {
        self.model_patterns.len() + self.brand_patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Compiles catalogs into [`CompiledCatalog`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogCompiler {
    /// Ranker for the format-agnostic order
    global_ranker: PatternRanker,
}

impl CatalogCompiler {
    pub fn new(global_ranker: PatternRanker) -> Self {
        Self { global_ranker }
    }

    /// Compile every pattern of the catalog
    pub fn compile(&self, catalog: &Catalog) -> CompiledCatalog {
        let ranker = PatternRanker::new();
        let mut model_patterns = Vec::new();
        let mut brand_patterns = Vec::new();
        let mut warnings = Vec::new();

        for (entry_idx, entry) in catalog.entries().iter().enumerate() {
            for raw in &entry.patterns {
                match RegexBuilder::new(raw).case_insensitive(true).build() {
                    Ok(regex) => {
                        let pattern = CompiledPattern {
                            brand: entry.brand.clone(),
                            model: entry.model.clone(),
                            format: entry.format.clone(),
                            raw: raw.clone(),
                            regex,
                            score: ranker.score(raw, entry.format.as_ref()),
                            entry: entry_idx,
                        };
                        if entry.is_brand_level() {
                            brand_patterns.push(pattern);
                        } else {
                            model_patterns.push(pattern);
                        }
                    }
                    Err(err) => {
                        let warning = PatternWarning {
                            brand: entry.brand.clone(),
                            model: entry.model.clone(),
                            format: entry.format.clone(),
                            pattern: raw.clone(),
                            message: err.to_string(),
                        };
                        tracing::warn!("Skipping {warning}");
                        warnings.push(warning);
                    }
                }
            }
        }

        // Stable sort: equal scores keep catalog order
        model_patterns.sort_by_key(|p| p.score);
        brand_patterns.sort_by_key(|p| p.score);

        let mut by_format: HashMap<FormatId, Vec<usize>> = HashMap::new();
        for (idx, pattern) in model_patterns.iter().enumerate() {
            if let Some(format) = &pattern.format {
                by_format.entry(format.clone()).or_default().push(idx);
            }
        }

        let mut global_order: Vec<usize> = (0..model_patterns.len()).collect();
        global_order.sort_by_key(|&idx| {
            let p = &model_patterns[idx];
            (self.global_ranker.score(&p.raw, p.format.as_ref()), idx)
        });

        tracing::debug!(
            model_patterns = model_patterns.len(),
            brand_patterns = brand_patterns.len(),
            dropped = warnings.len(),
            "Compiled catalog patterns"
        );

        CompiledCatalog {
            model_patterns,
            brand_patterns,
            by_format,
            global_order,
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::CatalogLayout;

    const BLADES: &str = r"
DE:
  Personna:
    Lab Blue:
      patterns: ['personna.*lab.*blue']
  Feather:
    Hi-Stainless:
      patterns: ['feather', '(unclosed']
Injector:
  Personna:
    Injector:
      patterns: ['personna']
Hair Shaper:
  Personna:
    Hair Shaper:
      patterns: ['personna.*hair.*shaper']
";

    fn compiled(ranker: PatternRanker) -> CompiledCatalog {
        let catalog = Catalog::from_yaml_str(BLADES, CatalogLayout::Partitioned).unwrap();
        CatalogCompiler::new(ranker).compile(&catalog)
    }

    #[test]
    fn test_invalid_pattern_is_dropped_with_warning() {
        let compiled = compiled(PatternRanker::new());
        assert_eq!(compiled.model_patterns.len(), 4);
        assert_eq!(compiled.warnings.len(), 1);
        assert_eq!(compiled.warnings[0].pattern, "(unclosed");
        assert_eq!(compiled.warnings[0].model.as_deref(), Some("Hi-Stainless"));
    }

    #[test]
    fn test_patterns_are_case_insensitive() {
        let compiled = compiled(PatternRanker::new());
        let feather = compiled
            .in_format(&FormatId::new("DE"))
            .find(|p| p.brand == "Feather")
            .unwrap();
        assert!(feather.is_match("FEATHER Hi-Stainless"));
    }

    #[test]
    fn test_model_patterns_sorted_by_specificity() {
        let compiled = compiled(PatternRanker::new());
        let raws: Vec<&str> = compiled.model_patterns.iter().map(|p| p.raw.as_str()).collect();
        assert_eq!(
            raws,
            vec!["personna.*hair.*shaper", "personna.*lab.*blue", "personna", "feather"]
        );
        assert!(compiled
            .model_patterns
            .windows(2)
            .all(|w| w[0].score <= w[1].score));
    }

    #[test]
    fn test_partition_index() {
        let compiled = compiled(PatternRanker::new());
        assert_eq!(compiled.format_len(&FormatId::new("de")), 2);
        assert_eq!(compiled.format_len(&FormatId::new("AC")), 0);
        assert_eq!(compiled.in_format(&FormatId::new("AC")).count(), 0);
    }

    #[test]
    fn test_global_order_pushes_de_back() {
        let compiled = compiled(PatternRanker::deprioritizing_de());
        let formats: Vec<&str> = compiled
            .global()
            .map(|p| p.format.as_ref().unwrap().as_str())
            .collect();
        assert_eq!(formats, vec!["HAIR SHAPER", "INJECTOR", "DE", "DE"]);
    }
}
