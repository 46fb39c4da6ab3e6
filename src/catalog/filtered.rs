use std::collections::HashMap;

use serde::Deserialize;

use crate::catalog::correct::{literal_key, OverrideLoadWarning};
use crate::catalog::DataSource;
use crate::core::normalize::Normalizer;

/// Why an input is excluded from matching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    /// Not a product mention at all
    Filtered,
    /// A product mention curated as deliberately unmatched
    IntentionallyUnmatched,
}

#[derive(Debug, Default, Deserialize)]
struct ExclusionFile {
    #[serde(default)]
    filtered: Vec<String>,
    #[serde(default)]
    intentionally_unmatched: Vec<String>,
}

/// Literal inputs that are recognised but never matched
#[derive(Debug, Clone, Default)]
pub struct ExclusionList {
    entries: HashMap<String, Exclusion>,
}

impl ExclusionList {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from a curated source, degrading to an empty list on any failure
    pub fn build(source: &DataSource, normalizer: &dyn Normalizer) -> Self {
        match Self::try_build(source, normalizer) {
            Ok(list) => list,
            Err(warning) => {
                tracing::warn!("Ignoring exclusions ({source}): {warning}");
                Self::empty()
            }
        }
    }

    pub fn try_build(
        source: &DataSource,
        normalizer: &dyn Normalizer,
    ) -> Result<Self, OverrideLoadWarning> {
        let Some(content) = source.read()? else {
            return Ok(Self::empty());
        };
        let file: Option<ExclusionFile> = serde_yaml::from_str(&content)?;
        let file = file.unwrap_or_default();

        let mut list = Self::empty();
        for literal in &file.filtered {
            list.insert(literal_key(normalizer, literal), Exclusion::Filtered);
        }
        // Curated "unmatched" entries are more specific than plain filters
        for literal in &file.intentionally_unmatched {
            list.insert(
                literal_key(normalizer, literal),
                Exclusion::IntentionallyUnmatched,
            );
        }
        Ok(list)
    }

    fn insert(&mut self, key: String, exclusion: Exclusion) {
        if !key.is_empty() {
            self.entries.insert(key, exclusion);
        }
    }

    /// Look up an already-normalized text
    pub fn lookup(&self, normalized: &str) -> Option<Exclusion> {
        self.entries.get(&normalized.to_lowercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::normalize::BasicNormalizer;

    #[test]
    fn test_lookup() {
        let yaml = "filtered:\n  - n/a\n  - none\nintentionally_unmatched:\n  - grandpa's razor\n";
        let list = ExclusionList::try_build(&DataSource::Inline(yaml.into()), &BasicNormalizer).unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list.lookup("N/A"), Some(Exclusion::Filtered));
        assert_eq!(
            list.lookup("Grandpa's Razor"),
            Some(Exclusion::IntentionallyUnmatched)
        );
        assert_eq!(list.lookup("Feather"), None);
    }

    #[test]
    fn test_empty_document() {
        let list = ExclusionList::try_build(&DataSource::Inline(String::new()), &BasicNormalizer).unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn test_malformed_degrades() {
        let list = ExclusionList::build(&DataSource::Inline("filtered: 3\n".into()), &BasicNormalizer);
        assert!(list.is_empty());
    }
}
