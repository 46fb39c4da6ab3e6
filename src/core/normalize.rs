//! Input normalization.
//!
//! Product mentions arrive as free-form markdown fragments. The engine never
//! looks at the raw string: every lookup (exclusions, correct matches,
//! patterns) runs against the normalized form. Normalizers must be
//! idempotent, `normalize(normalize(s)) == normalize(s)`, because curated
//! literals are passed through the same normalizer before indexing.

use once_cell::sync::Lazy;
use regex::Regex;

/// Markdown link: keep the label, drop the target
static MARKDOWN_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\[\]]*)\]\([^()]*\)").expect("static regex is valid"));

/// Converts a raw mention into the form the engine matches against
pub trait Normalizer {
    fn normalize(&self, text: &str) -> String;
}

/// Default normalizer: strips markdown links and emphasis, collapses
/// whitespace and trims decorative punctuation at both ends.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicNormalizer;

impl BasicNormalizer {
    fn single_pass(text: &str) -> String {
        let unlinked = MARKDOWN_LINK.replace_all(text, "$1");
        let stripped = unlinked
            .replace("~~", "")
            .replace("__", "")
            .replace(['*', '`'], "");

        let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");

        collapsed
            .trim_start_matches(|c: char| c.is_whitespace() || "-:;,|>#•".contains(c))
            .trim_end_matches(|c: char| c.is_whitespace() || ":;,|".contains(c))
            .to_string()
    }
}

impl Normalizer for BasicNormalizer {
    /// Repeats [`Self::single_pass`] until the text stops changing. After
    /// the first pass every change strictly shortens the text, so this ends.
    fn normalize(&self, text: &str) -> String {
        let mut current = Self::single_pass(text);
        loop {
            let next = Self::single_pass(&current);
            if next == current {
                return current;
            }
            current = next;
        }
    }
}
