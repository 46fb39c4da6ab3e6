use crate::catalog::compiler::{CatalogCompiler, CompiledCatalog, CompiledPattern, PatternWarning};
use crate::catalog::correct::CorrectMatchIndex;
use crate::catalog::filtered::{Exclusion, ExclusionList};
use crate::catalog::store::{Catalog, CatalogError};
use crate::catalog::{CatalogSources, DataSource};
use crate::core::normalize::{BasicNormalizer, Normalizer};
use crate::core::result::{MatchResult, Outcome, Payload};
use crate::core::types::{Domain, FormatId};
use crate::matching::cache::Generational;
use crate::matching::format::{FormatResolver, Resolution, ShortCircuit};
use crate::matching::scoring::PatternRanker;
use crate::matching::split::dash_split;

/// Configuration for the matching engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchingConfig {
    /// Rank DE patterns last in format-agnostic search
    pub deprioritize_de_in_global: bool,
    /// Try brand-level patterns when no model pattern matches
    pub brand_fallback: bool,
    /// Split `Brand - Model` text as a last resort
    pub dash_split: bool,
}

impl MatchingConfig {
    /// Policy used for a product domain
    #[must_use]
    pub fn for_domain(domain: Domain) -> Self {
        match domain {
            Domain::Blade => Self {
                deprioritize_de_in_global: true,
                ..Self::default()
            },
            Domain::Soap => Self {
                dash_split: true,
                ..Self::default()
            },
            Domain::Razor | Domain::Brush => Self::default(),
        }
    }
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            deprioritize_de_in_global: false,
            brand_fallback: true,
            dash_split: false,
        }
    }
}

/// Per-call options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchOptions {
    /// Skip the correct-matches table and go straight to pattern search
    pub bypass_override: bool,
}

/// State derived from the catalog and curated tables, rebuilt per generation
#[derive(Debug)]
struct CacheState {
    compiled: CompiledCatalog,
    correct: CorrectMatchIndex,
    exclusions: ExclusionList,
}

/// Where pattern search is allowed to look
enum Scope {
    /// Formats in probe order: target first, then its fallback chain
    Formats(Vec<FormatId>),
    Global,
}

/// The main matching engine.
///
/// One engine serves one product domain. It is single-threaded: build one
/// per worker rather than sharing it.
pub struct MatchEngine {
    domain: Domain,
    catalog: Catalog,
    resolver: FormatResolver,
    correct_matches: DataSource,
    exclusions: DataSource,
    normalizer: Box<dyn Normalizer>,
    config: MatchingConfig,
    cache: Generational<CacheState>,
}

impl MatchEngine {
    /// Create an engine over an in-memory catalog with no curated tables
    pub fn new(domain: Domain, catalog: Catalog) -> Self {
        let resolver = FormatResolver::for_domain(domain, catalog.formats());
        Self {
            domain,
            catalog,
            resolver,
            correct_matches: DataSource::Missing,
            exclusions: DataSource::Missing,
            normalizer: Box::new(BasicNormalizer),
            config: MatchingConfig::for_domain(domain),
            cache: Generational::new(),
        }
    }

    /// Load the catalog and wire up the curated tables.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read or is malformed.
    /// Curated tables are read lazily and never fail construction.
    pub fn load(domain: Domain, sources: &CatalogSources) -> Result<Self, CatalogError> {
        let catalog = Catalog::load(&sources.catalog, domain.layout())?;
        Ok(Self::new(domain, catalog)
            .with_correct_matches(sources.correct_matches.clone())
            .with_exclusions(sources.exclusions.clone()))
    }

    #[must_use]
    pub fn with_correct_matches(mut self, source: DataSource) -> Self {
        self.correct_matches = source;
        self.cache.invalidate();
        self
    }

    #[must_use]
    pub fn with_exclusions(mut self, source: DataSource) -> Self {
        self.exclusions = source;
        self.cache.invalidate();
        self
    }

    #[must_use]
    pub fn with_normalizer(mut self, normalizer: impl Normalizer + 'static) -> Self {
        self.normalizer = Box::new(normalizer);
        self.cache.invalidate();
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: MatchingConfig) -> Self {
        self.config = config;
        self.cache.invalidate();
        self
    }

    /// Match one mention with default options
    pub fn find_match(&self, text: &str, context: Option<&str>) -> MatchResult {
        self.find_match_with(text, context, MatchOptions::default())
    }

    /// Match one mention.
    ///
    /// `context` is a label from an upstream stage, typically the format of
    /// the razor the blade was used in.
    pub fn find_match_with(
        &self,
        text: &str,
        context: Option<&str>,
        options: MatchOptions,
    ) -> MatchResult {
        let normalized = self.normalizer.normalize(text);
        let outcome = self.classify(&normalized, context, options);
        MatchResult::new(text, normalized, outcome)
    }

    /// Match a batch of mentions sharing one context
    pub fn find_matches<'a>(
        &self,
        texts: impl IntoIterator<Item = &'a str>,
        context: Option<&str>,
    ) -> Vec<MatchResult> {
        texts
            .into_iter()
            .map(|text| self.find_match(text, context))
            .collect()
    }

    fn classify(&self, normalized: &str, context: Option<&str>, options: MatchOptions) -> Outcome {
        if normalized.is_empty() {
            return Outcome::NoMatch;
        }

        // Step 1: Context rules that settle the outcome without searching
        let resolution = context.map_or(Resolution::Global, |label| self.resolver.resolve(label));
        let scope = match resolution {
            Resolution::ShortCircuit(short_circuit) => {
                tracing::debug!(context = ?context, "Context short-circuits matching");
                return match short_circuit {
                    ShortCircuit::AutoContext(payload) => Outcome::AutoContext(payload),
                    ShortCircuit::Irrelevant => Outcome::IrrelevantContext,
                };
            }
            Resolution::Target(target) => {
                let mut formats = vec![target.clone()];
                formats.extend(self.resolver.fallback_chain(&target));
                Scope::Formats(formats)
            }
            Resolution::Global => Scope::Global,
        };

        let state = self.state();

        // Step 2: Correct-matches table; a curated literal always wins
        if !options.bypass_override {
            if let Some(payload) = state.correct.lookup(normalized) {
                return Outcome::Exact(payload.clone());
            }
        }

        // Step 3: Curated exclusions
        if let Some(exclusion) = state.exclusions.lookup(normalized) {
            return match exclusion {
                Exclusion::Filtered => Outcome::Filtered,
                Exclusion::IntentionallyUnmatched => Outcome::IntentionallyUnmatched,
            };
        }

        // Step 4: Model patterns, target format then fallbacks, or global
        if let Some(pattern) = self.search_models(&state.compiled, &scope, normalized) {
            return Outcome::Regex {
                payload: self.payload_for(pattern),
                pattern: pattern.raw.clone(),
            };
        }

        // Step 5: Brand-level patterns
        if self.config.brand_fallback {
            if let Some(pattern) = search_brands(&state.compiled, &scope, normalized) {
                return Outcome::Brand {
                    payload: self.payload_for(pattern),
                    pattern: pattern.raw.clone(),
                };
            }
        }

        // Step 6: Brand - model split
        if self.config.dash_split {
            if let Some((brand, model)) = dash_split(normalized) {
                let brand = search_brands(&state.compiled, &Scope::Global, brand)
                    .map_or(brand, |pattern| pattern.brand.as_str());
                return Outcome::Alias(Payload::new(brand).with_model(model));
            }
        }

        Outcome::NoMatch
    }

    fn search_models<'s>(
        &self,
        compiled: &'s CompiledCatalog,
        scope: &Scope,
        text: &str,
    ) -> Option<&'s CompiledPattern> {
        match scope {
            Scope::Global => {
                tracing::debug!(domain = %self.domain, "Global pattern search");
                first_match(compiled.global(), text)
            }
            Scope::Formats(formats) => formats.iter().enumerate().find_map(|(i, format)| {
                let hit = first_match(compiled.in_format(format), text);
                if hit.is_some() && i > 0 {
                    tracing::debug!(
                        target_format = %formats[0],
                        fallback = %format,
                        "Matched in fallback format"
                    );
                }
                hit
            }),
        }
    }

    fn payload_for(&self, pattern: &CompiledPattern) -> Payload {
        let mut payload = Payload::new(&pattern.brand);
        if let Some(model) = &pattern.model {
            payload = payload.with_model(model);
        }
        if let Some(format) = &pattern.format {
            payload = payload.with_format(format.as_str());
        }
        if let Some(entry) = self.catalog.entry(pattern.entry) {
            payload = payload.with_attributes(entry.attributes.clone());
        }
        payload
    }

    fn state(&self) -> &CacheState {
        self.cache.get_or_rebuild(|generation| self.rebuild(generation))
    }

    fn rebuild(&self, generation: u64) -> CacheState {
        let ranker = if self.config.deprioritize_de_in_global {
            PatternRanker::deprioritizing_de()
        } else {
            PatternRanker::new()
        };
        let compiled = CatalogCompiler::new(ranker).compile(&self.catalog);
        let correct =
            CorrectMatchIndex::build(&self.correct_matches, &self.catalog, self.normalizer.as_ref());
        let exclusions = ExclusionList::build(&self.exclusions, self.normalizer.as_ref());

        tracing::info!(
            domain = %self.domain,
            generation,
            patterns = compiled.len(),
            dropped = compiled.warnings.len(),
            correct_matches = correct.len(),
            exclusions = exclusions.len(),
            "Built matcher caches"
        );

        CacheState {
            compiled,
            correct,
            exclusions,
        }
    }

    /// Drop compiled patterns and curated indexes; the next match rebuilds
    /// them, re-reading curated files from disk
    pub fn invalidate(&mut self) {
        self.cache.invalidate();
        tracing::debug!(generation = self.cache.generation(), "Invalidated matcher caches");
    }

    /// Re-read the catalog file and invalidate all caches.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog can no longer be loaded; the engine
    /// keeps its previous catalog in that case.
    pub fn reload_catalog(&mut self) -> Result<(), CatalogError> {
        if let Some(path) = self.catalog.source() {
            let catalog = Catalog::load(path, self.domain.layout())?;
            self.resolver = FormatResolver::for_domain(self.domain, catalog.formats());
            self.catalog = catalog;
        }
        self.invalidate();
        Ok(())
    }

    /// Compiled pattern lists for diagnostics
    pub fn compiled(&self) -> &CompiledCatalog {
        &self.state().compiled
    }

    /// Patterns dropped because they failed to compile
    pub fn pattern_warnings(&self) -> &[PatternWarning] {
        &self.state().compiled.warnings
    }

    pub fn correct_matches(&self) -> &CorrectMatchIndex {
        &self.state().correct
    }

    pub fn exclusions(&self) -> &ExclusionList {
        &self.state().exclusions
    }

    /// Current cache generation; bumped by every invalidation
    pub fn generation(&self) -> u64 {
        self.cache.generation()
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn resolver(&self) -> &FormatResolver {
        &self.resolver
    }

    pub fn config(&self) -> MatchingConfig {
        self.config
    }
}

fn first_match<'a>(
    patterns: impl IntoIterator<Item = &'a CompiledPattern>,
    text: &str,
) -> Option<&'a CompiledPattern> {
    patterns.into_iter().find(|pattern| pattern.is_match(text))
}

/// Brand-level search: formats in probe order, then format-less brands
fn search_brands<'s>(compiled: &'s CompiledCatalog, scope: &Scope, text: &str) -> Option<&'s CompiledPattern> {
    match scope {
        Scope::Global => first_match(&compiled.brand_patterns, text),
        Scope::Formats(formats) => formats
            .iter()
            .map(Some)
            .chain(std::iter::once(None))
            .find_map(|format| {
                first_match(
                    compiled
                        .brand_patterns
                        .iter()
                        .filter(|pattern| pattern.format.as_ref() == format),
                    text,
                )
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{CatalogLayout, MatchKind};

    const SOAPS: &str = r"
Stirling:
  patterns: ['stirling']
  Bay Rum:
    patterns: ['stirling.*bay\s*rum']
    base: tallow
Barrister and Mann:
  patterns: ['barrister', '\bb\s*&\s*m\b']
  Seville:
    patterns: ['seville']
";

    fn soap_engine() -> MatchEngine {
        let catalog = Catalog::from_yaml_str(SOAPS, CatalogLayout::Flat).unwrap();
        MatchEngine::new(Domain::Soap, catalog)
    }

    #[test]
    fn test_model_pattern_carries_attributes() {
        let engine = soap_engine();
        let result = engine.find_match("Stirling Bay Rum", None);
        assert_eq!(result.kind(), Some(MatchKind::Regex));
        let matched = result.matched().unwrap();
        assert_eq!(matched.brand, "Stirling");
        assert_eq!(matched.model.as_deref(), Some("Bay Rum"));
        assert_eq!(
            matched.attributes.get("base"),
            Some(&serde_yaml::Value::from("tallow"))
        );
        assert_eq!(result.pattern(), Some(r"stirling.*bay\s*rum"));
    }

    #[test]
    fn test_brand_fallback() {
        let engine = soap_engine();
        let result = engine.find_match("Stirling Executive Man", None);
        assert_eq!(result.kind(), Some(MatchKind::Brand));
        let matched = result.matched().unwrap();
        assert_eq!(matched.brand, "Stirling");
        assert!(matched.model.is_none());
        assert_eq!(result.pattern(), Some("stirling"));
    }

    #[test]
    fn test_dash_split_canonicalises_brand() {
        let engine = soap_engine()
            .with_config(MatchingConfig {
                brand_fallback: false,
                ..MatchingConfig::for_domain(Domain::Soap)
            });
        let result = engine.find_match("B&M - Fougère Angelique", None);
        assert_eq!(result.kind(), Some(MatchKind::Alias));
        let matched = result.matched().unwrap();
        assert_eq!(matched.brand, "Barrister and Mann");
        assert_eq!(matched.model.as_deref(), Some("Fougère Angelique"));
        assert!(result.pattern().is_none());
    }

    #[test]
    fn test_dash_split_unknown_brand() {
        let engine = soap_engine();
        let result = engine.find_match("Declaration Grooming - Sellout", None);
        assert_eq!(result.kind(), Some(MatchKind::Alias));
        assert_eq!(result.matched().unwrap().brand, "Declaration Grooming");
    }

    #[test]
    fn test_dash_split_disabled_for_razors() {
        let catalog = Catalog::from_yaml_str(SOAPS, CatalogLayout::Flat).unwrap();
        let engine = MatchEngine::new(Domain::Razor, catalog);
        let result = engine.find_match("Declaration Grooming - Sellout", None);
        assert_eq!(result.kind(), None);
    }

    #[test]
    fn test_empty_input_is_no_match() {
        let engine = soap_engine();
        let result = engine.find_match("  ** ", None);
        assert!(result.matched().is_none());
        assert_eq!(result.kind(), None);
        assert_eq!(result.original, "  ** ");
        assert_eq!(result.normalized, "");
    }

    #[test]
    fn test_correct_matches_precede_exclusions() {
        let engine = soap_engine()
            .with_exclusions(DataSource::Inline(
                "filtered: [none, stirling bay rum]\nintentionally_unmatched: [mystery puck]\n".into(),
            ))
            .with_correct_matches(DataSource::Inline("Stirling:\n  Bay Rum: [stirling bay rum]\n".into()));
        assert_eq!(engine.find_match("None", None).kind(), Some(MatchKind::Filtered));
        assert_eq!(
            engine.find_match("Mystery Puck", None).kind(),
            Some(MatchKind::IntentionallyUnmatched)
        );

        let result = engine.find_match("STIRLING Bay Rum", None);
        assert_eq!(result.kind(), Some(MatchKind::Exact));
        assert_eq!(result.matched().unwrap().model.as_deref(), Some("Bay Rum"));

        // Without the override the exclusion applies
        let bypassed = engine.find_match_with(
            "Stirling Bay Rum",
            None,
            MatchOptions {
                bypass_override: true,
            },
        );
        assert_eq!(bypassed.kind(), Some(MatchKind::Filtered));
    }

    #[test]
    fn test_bypass_override() {
        let engine = soap_engine()
            .with_correct_matches(DataSource::Inline("Barrister and Mann:\n  Seville: [stirling bay rum]\n".into()));
        let exact = engine.find_match("Stirling Bay Rum", None);
        assert_eq!(exact.kind(), Some(MatchKind::Exact));
        assert_eq!(exact.matched().unwrap().brand, "Barrister and Mann");

        let bypassed = engine.find_match_with(
            "Stirling Bay Rum",
            None,
            MatchOptions {
                bypass_override: true,
            },
        );
        assert_eq!(bypassed.kind(), Some(MatchKind::Regex));
        assert_eq!(bypassed.matched().unwrap().brand, "Stirling");
    }

    #[test]
    fn test_invalidate_starts_new_generation() {
        let mut engine = soap_engine();
        let _ = engine.find_match("Stirling", None);
        let before = engine.generation();
        engine.invalidate();
        assert_eq!(engine.generation(), before + 1);
        assert_eq!(engine.find_match("Stirling", None).kind(), Some(MatchKind::Brand));
    }

    #[test]
    fn test_reload_without_source_only_invalidates() {
        let mut engine = soap_engine();
        let before = engine.generation();
        engine.reload_catalog().unwrap();
        assert_eq!(engine.generation(), before + 1);
        assert_eq!(engine.catalog().len(), 4);
    }

    #[test]
    fn test_find_matches_batch() {
        let engine = soap_engine();
        let results = engine.find_matches(["Seville", "zzz"], None);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].kind(), Some(MatchKind::Regex));
        assert_eq!(results[1].kind(), None);
    }
}
