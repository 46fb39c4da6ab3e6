//! Context label → format partition resolution.
//!
//! An upstream stage (usually the razor match) hands the engine a context
//! label such as `Shavette (AC)`. The resolver turns it into one of:
//!
//! - a concrete target format plus an ordered fallback chain,
//! - global mode, when the label names a family rather than a format,
//! - a short-circuit, when the label settles the outcome on its own.
//!
//! Blade catalogs use the fixed table below. Every other domain resolves
//! labels literally with no fallback.

use std::collections::HashSet;

use crate::core::result::Payload;
use crate::core::types::{Domain, FormatId};

/// Default blade format, last resort for specialised formats
pub const DEFAULT_BLADE_FORMAT: &str = "DE";

/// Half-width variant of the default format
pub const HALF_BLADE_FORMAT: &str = "HALF DE";

/// Brand reported for blades of cartridge and disposable razors
pub const CARTRIDGE_SENTINEL_BRAND: &str = "Cartridge/Disposable";

/// Blade formats with a defined fallback
const BLADE_FORMATS: &[&str] = &[
    "DE",
    "HALF DE",
    "AC",
    "GEM",
    "INJECTOR",
    "HAIR SHAPER",
    "FHS",
    "A77",
];

/// Razor format label → blade format
const BLADE_EQUIVALENCES: &[(&str, &str)] = &[
    ("SHAVETTE (DE)", "DE"),
    ("SHAVETTE (HALF DE)", "HALF DE"),
    ("SHAVETTE (AC)", "AC"),
    ("SHAVETTE (HAIR SHAPER)", "HAIR SHAPER"),
    ("SHAVETTE (A77)", "A77"),
    ("SHAVETTE (GEM)", "GEM"),
];

/// Labels naming a family of razors that take several blade formats
const BLADE_GENERIC_FAMILIES: &[&str] = &["SHAVETTE", "SHAVETTE (UNSPECIFIED)"];

/// Razors whose blades are part of the razor itself
const BLADE_AUTO_CONTEXTS: &[&str] = &["CARTRIDGE", "DISPOSABLE", "CARTRIDGE/DISPOSABLE"];

/// Razors that take no blade at all
const BLADE_IRRELEVANT_CONTEXTS: &[&str] = &["STRAIGHT", "STRAIGHT RAZOR"];

/// Outcome decided by the context label alone
#[derive(Debug, Clone, PartialEq)]
pub enum ShortCircuit {
    /// Fixed sentinel payload
    AutoContext(Payload),
    /// The product is structurally irrelevant for this context
    Irrelevant,
}

/// How a context label should be searched
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Search this format first, then its fallback chain
    Target(FormatId),
    /// No specific target: format-agnostic search
    Global,
    /// Skip pattern search entirely
    ShortCircuit(ShortCircuit),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rules {
    /// Labels name formats directly, no fallback
    Literal,
    Blade,
}

/// Maps context labels to target formats and fallback chains
#[derive(Debug, Clone)]
pub struct FormatResolver {
    rules: Rules,
    declared: HashSet<FormatId>,
}

impl FormatResolver {
    /// Resolver for a domain over the catalog's declared formats
    pub fn for_domain(domain: Domain, declared: &[FormatId]) -> Self {
        let rules = match domain {
            Domain::Blade => Rules::Blade,
            Domain::Razor | Domain::Brush | Domain::Soap => Rules::Literal,
        };
        Self {
            rules,
            declared: declared.iter().cloned().collect(),
        }
    }

    /// Resolve a context label
    pub fn resolve(&self, label: &str) -> Resolution {
        let label = FormatId::new(label);
        if label.as_str().is_empty() {
            return Resolution::Global;
        }

        match self.rules {
            Rules::Literal => Resolution::Target(label),
            Rules::Blade => self.resolve_blade(label),
        }
    }

    fn resolve_blade(&self, label: FormatId) -> Resolution {
        let name = label.as_str();

        if BLADE_AUTO_CONTEXTS.contains(&name) {
            let payload = Payload::new(CARTRIDGE_SENTINEL_BRAND).with_format(name);
            return Resolution::ShortCircuit(ShortCircuit::AutoContext(payload));
        }
        if BLADE_IRRELEVANT_CONTEXTS.contains(&name) {
            return Resolution::ShortCircuit(ShortCircuit::Irrelevant);
        }

        if let Some((_, target)) = BLADE_EQUIVALENCES.iter().find(|(from, _)| *from == name) {
            return Resolution::Target(FormatId::new(target));
        }

        if BLADE_GENERIC_FAMILIES.contains(&name) && !self.declared.contains(&label) {
            return Resolution::Global;
        }

        Resolution::Target(label)
    }

    /// Target format for a label, `None` when it short-circuits or is generic
    pub fn target_format(&self, label: &str) -> Option<FormatId> {
        match self.resolve(label) {
            Resolution::Target(format) => Some(format),
            Resolution::Global | Resolution::ShortCircuit(_) => None,
        }
    }

    /// Formats probed, in order, after `target` yields no match.
    ///
    /// Only formats the catalog declares are included.
    pub fn fallback_chain(&self, target: &FormatId) -> Vec<FormatId> {
        let chain: Vec<FormatId> = match self.rules {
            Rules::Literal => Vec::new(),
            Rules::Blade => match target.as_str() {
                HALF_BLADE_FORMAT => vec![FormatId::new(DEFAULT_BLADE_FORMAT)],
                DEFAULT_BLADE_FORMAT => vec![FormatId::new(HALF_BLADE_FORMAT)],
                other if BLADE_FORMATS.contains(&other) => {
                    vec![FormatId::new(DEFAULT_BLADE_FORMAT)]
                }
                _ => Vec::new(),
            },
        };

        chain
            .into_iter()
            .filter(|format| format != target && self.declared.contains(format))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blade_resolver(formats: &[&str]) -> FormatResolver {
        let declared: Vec<FormatId> = formats.iter().map(|f| FormatId::new(f)).collect();
        FormatResolver::for_domain(Domain::Blade, &declared)
    }

    #[test]
    fn test_direct_and_equivalent_targets() {
        let resolver = blade_resolver(&["DE", "AC"]);
        assert_eq!(resolver.resolve("AC"), Resolution::Target(FormatId::new("AC")));
        assert_eq!(
            resolver.resolve("Shavette (AC)"),
            Resolution::Target(FormatId::new("AC"))
        );
        assert_eq!(
            resolver.resolve("shavette (half de)"),
            Resolution::Target(FormatId::new("HALF DE"))
        );
    }

    #[test]
    fn test_generic_family_goes_global() {
        let resolver = blade_resolver(&["DE", "AC"]);
        assert_eq!(resolver.resolve("Shavette"), Resolution::Global);
        assert_eq!(resolver.resolve("Shavette (Unspecified)"), Resolution::Global);
        assert_eq!(resolver.target_format("Shavette"), None);
        assert_eq!(resolver.resolve("  "), Resolution::Global);
    }

    #[test]
    fn test_generic_family_declared_as_format_is_a_target() {
        let resolver = blade_resolver(&["DE", "SHAVETTE"]);
        assert_eq!(
            resolver.resolve("Shavette"),
            Resolution::Target(FormatId::new("SHAVETTE"))
        );
    }

    #[test]
    fn test_short_circuits() {
        let resolver = blade_resolver(&["DE"]);
        match resolver.resolve("Cartridge") {
            Resolution::ShortCircuit(ShortCircuit::AutoContext(payload)) => {
                assert_eq!(payload.brand, CARTRIDGE_SENTINEL_BRAND);
                assert_eq!(payload.format.as_deref(), Some("CARTRIDGE"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(
            resolver.resolve("Straight"),
            Resolution::ShortCircuit(ShortCircuit::Irrelevant)
        );
    }

    #[test]
    fn test_unknown_label_is_literal_target() {
        let resolver = blade_resolver(&["DE"]);
        let target = resolver.target_format("Rolls Razor").unwrap();
        assert_eq!(target, FormatId::new("ROLLS RAZOR"));
        assert!(resolver.fallback_chain(&target).is_empty());
    }

    #[test]
    fn test_half_and_base_fall_back_to_each_other() {
        let resolver = blade_resolver(&["DE", "HALF DE"]);
        assert_eq!(
            resolver.fallback_chain(&FormatId::new("HALF DE")),
            vec![FormatId::new("DE")]
        );
        assert_eq!(
            resolver.fallback_chain(&FormatId::new("DE")),
            vec![FormatId::new("HALF DE")]
        );
    }

    #[test]
    fn test_specialised_formats_fall_back_to_default() {
        let resolver = blade_resolver(&["DE", "GEM"]);
        for target in ["AC", "GEM", "INJECTOR", "HAIR SHAPER", "FHS", "A77"] {
            assert_eq!(
                resolver.fallback_chain(&FormatId::new(target)),
                vec![FormatId::new("DE")],
                "{target}"
            );
        }
    }

    #[test]
    fn test_chain_limited_to_declared_formats() {
        let resolver = blade_resolver(&["AC"]);
        assert!(resolver.fallback_chain(&FormatId::new("AC")).is_empty());
        assert!(resolver.fallback_chain(&FormatId::new("HALF DE")).is_empty());
    }

    #[test]
    fn test_literal_rules() {
        let declared = vec![FormatId::new("DE")];
        let resolver = FormatResolver::for_domain(Domain::Razor, &declared);
        assert_eq!(
            resolver.resolve("straight"),
            Resolution::Target(FormatId::new("STRAIGHT"))
        );
        assert!(resolver.fallback_chain(&FormatId::new("DE")).is_empty());
    }
}
