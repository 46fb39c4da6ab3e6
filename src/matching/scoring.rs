use serde::Serialize;

use crate::core::types::FormatId;

/// Format that the ranker pushes back when asked to deprioritize it
pub const DEPRIORITIZED_FORMAT: &str = "DE";

/// Token joining the required parts of a pattern
const WILDCARD_JOIN: &str = ".*";

const METACHARACTERS: &[char] = &[
    '\\', '^', '$', '.', '|', '?', '*', '+', '(', ')', '[', ']', '{', '}',
];

/// Negate a count for ascending sort order
#[inline]
fn neg(count: usize) -> i64 {
    i64::try_from(count).map_or(i64::MIN, |c| -c)
}

/// Specificity of a pattern, compared lexicographically.
///
/// Smaller is more specific. Field order is the comparison order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ScoreTuple {
    /// 0 by default, 1 for deprioritized formats
    pub format_bias: u8,

    /// Negative pattern length in characters
    pub length: i64,

    /// Negative count of `.*`-separated required fragments
    pub required_parts: i64,

    /// Negative count of regex metacharacters
    pub metacharacters: i64,

    /// Negative count of word-boundary and whitespace tokens
    pub boundaries: i64,
}

impl std::fmt::Display for ScoreTuple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({}, {}, {}, {}, {})",
            self.format_bias, self.length, self.required_parts, self.metacharacters, self.boundaries
        )
    }
}

/// Computes deterministic specificity scores for catalog patterns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatternRanker {
    deprioritize_de: bool,
}

impl PatternRanker {
    /// Ranker without any format bias
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ranker that orders DE patterns behind every other format
    #[must_use]
    pub fn deprioritizing_de() -> Self {
        Self {
            deprioritize_de: true,
        }
    }

    /// Score a raw pattern belonging to `format`
    #[must_use]
    pub fn score(&self, raw: &str, format: Option<&FormatId>) -> ScoreTuple {
        let format_bias = u8::from(
            self.deprioritize_de
                && format.is_some_and(|f| f.as_str() == DEPRIORITIZED_FORMAT),
        );

        ScoreTuple {
            format_bias,
            length: neg(raw.chars().count()),
            required_parts: neg(required_parts(raw)),
            metacharacters: neg(raw.chars().filter(|c| METACHARACTERS.contains(c)).count()),
            boundaries: neg(boundary_tokens(raw)),
        }
    }
}

/// Number of literal anchors: fragments between `.*` wildcards, ignoring
/// the empty fragments produced by leading or trailing wildcards.
pub fn required_parts(raw: &str) -> usize {
    raw.split(WILDCARD_JOIN).filter(|part| !part.is_empty()).count()
}

/// Count of `\b`, `\s` and literal space tokens
pub fn boundary_tokens(raw: &str) -> usize {
    raw.matches(r"\b").count() + raw.matches(r"\s").count() + raw.matches(' ').count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_parts() {
        assert_eq!(required_parts("feather"), 1);
        assert_eq!(required_parts("personna.*hair.*shaper"), 3);
        assert_eq!(required_parts(".*feather.*"), 1);
        assert_eq!(required_parts(".*"), 0);
    }

    #[test]
    fn test_boundary_tokens() {
        assert_eq!(boundary_tokens(r"\btech\b"), 2);
        assert_eq!(boundary_tokens(r"super\s*speed"), 1);
        assert_eq!(boundary_tokens("lab blue"), 1);
    }

    #[test]
    fn test_longer_pattern_ranks_first() {
        let ranker = PatternRanker::new();
        let long = ranker.score("personna hair shaper", None);
        let short = ranker.score("personna", None);
        assert!(long < short);
    }

    #[test]
    fn test_more_parts_breaks_length_tie() {
        let ranker = PatternRanker::new();
        // Same length, the second has two required anchors
        let one = ranker.score("abcdefgh", None);
        let two = ranker.score("abc.*fgh", None);
        assert_eq!(one.length, two.length);
        assert!(two < one);
    }

    #[test]
    fn test_de_bias_dominates_length() {
        let ranker = PatternRanker::deprioritizing_de();
        let de = ranker.score("personna.*lab.*blue", Some(&FormatId::new("DE")));
        let injector = ranker.score("personna", Some(&FormatId::new("Injector")));
        assert!(injector < de);

        // Without deprioritization length wins
        let plain = PatternRanker::new();
        assert!(
            plain.score("personna.*lab.*blue", Some(&FormatId::new("DE")))
                < plain.score("personna", Some(&FormatId::new("Injector")))
        );
    }

    #[test]
    fn test_half_de_is_not_deprioritized() {
        let ranker = PatternRanker::deprioritizing_de();
        let score = ranker.score("x", Some(&FormatId::new("Half DE")));
        assert_eq!(score.format_bias, 0);
    }

    #[test]
    fn test_score_is_deterministic() {
        let ranker = PatternRanker::deprioritizing_de();
        let a = ranker.score(r"\bgem\b.*ptfe", Some(&FormatId::new("GEM")));
        let b = ranker.score(r"\bgem\b.*ptfe", Some(&FormatId::new("GEM")));
        assert_eq!(a, b);
    }
}
