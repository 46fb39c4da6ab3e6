use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::types::MatchKind;

/// Opaque per-entry attributes carried from the catalog to the result
/// (e.g. `grind`, `fiber`, `year`).
pub type Attributes = BTreeMap<String, serde_yaml::Value>;

/// The matched product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    pub brand: String,

    /// Absent for brand-only matches and context sentinels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: Attributes,
}

impl Payload {
    pub fn new(brand: impl Into<String>) -> Self {
        Self {
            brand: brand.into(),
            model: None,
            format: None,
            attributes: Attributes::new(),
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    #[must_use]
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }
}

/// What the engine concluded about one input.
///
/// Each variant fixes whether a payload and a winning pattern exist, so a
/// kind can never be observed with a missing payload it requires.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Exact(Payload),
    Regex { payload: Payload, pattern: String },
    Brand { payload: Payload, pattern: String },
    Alias(Payload),
    AutoContext(Payload),
    Filtered,
    IntentionallyUnmatched,
    IrrelevantContext,
    NoMatch,
}

impl Outcome {
    /// Match kind, `None` when nothing matched
    #[must_use]
    pub fn kind(&self) -> Option<MatchKind> {
        match self {
            Self::Exact(_) => Some(MatchKind::Exact),
            Self::Regex { .. } => Some(MatchKind::Regex),
            Self::Brand { .. } => Some(MatchKind::Brand),
            Self::Alias(_) => Some(MatchKind::Alias),
            Self::AutoContext(_) => Some(MatchKind::AutoContext),
            Self::Filtered => Some(MatchKind::Filtered),
            Self::IntentionallyUnmatched => Some(MatchKind::IntentionallyUnmatched),
            Self::IrrelevantContext => Some(MatchKind::IrrelevantContext),
            Self::NoMatch => None,
        }
    }

    #[must_use]
    pub fn payload(&self) -> Option<&Payload> {
        match self {
            Self::Exact(payload)
            | Self::Alias(payload)
            | Self::AutoContext(payload)
            | Self::Regex { payload, .. }
            | Self::Brand { payload, .. } => Some(payload),
            Self::Filtered | Self::IntentionallyUnmatched | Self::IrrelevantContext | Self::NoMatch => {
                None
            }
        }
    }

    #[must_use]
    pub fn pattern(&self) -> Option<&str> {
        match self {
            Self::Regex { pattern, .. } | Self::Brand { pattern, .. } => Some(pattern),
            _ => None,
        }
    }
}

/// Result of matching one input string
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    /// Input exactly as supplied
    pub original: String,

    /// Input after normalization; every lookup operates on this form
    pub normalized: String,

    pub outcome: Outcome,
}

impl MatchResult {
    pub fn new(original: impl Into<String>, normalized: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            original: original.into(),
            normalized: normalized.into(),
            outcome,
        }
    }

    #[must_use]
    pub fn kind(&self) -> Option<MatchKind> {
        self.outcome.kind()
    }

    #[must_use]
    pub fn matched(&self) -> Option<&Payload> {
        self.outcome.payload()
    }

    #[must_use]
    pub fn pattern(&self) -> Option<&str> {
        self.outcome.pattern()
    }

    #[must_use]
    pub fn is_match(&self) -> bool {
        self.matched().is_some()
    }

    /// Flat record view used for serialization
    #[must_use]
    pub fn record(&self) -> MatchRecord<'_> {
        MatchRecord {
            original: &self.original,
            normalized: &self.normalized,
            matched: self.matched(),
            match_type: self.kind(),
            pattern: self.pattern(),
        }
    }
}

/// Serialized shape of a [`MatchResult`] handed to downstream consumers
#[derive(Debug, Serialize)]
pub struct MatchRecord<'a> {
    pub original: &'a str,
    pub normalized: &'a str,
    pub matched: Option<&'a Payload>,
    pub match_type: Option<MatchKind>,
    pub pattern: Option<&'a str>,
}

impl Serialize for MatchResult {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.record().serialize(serializer)
    }
}
