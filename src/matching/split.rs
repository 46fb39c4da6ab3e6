//! `Brand - Scent` splitting for soap-like mentions that no pattern covers.

/// Separators tried in order; the first one present wins
const SEPARATORS: &[&str] = &[" - ", " – ", " — "];

/// Split `text` at the first dash separator into (brand, model).
///
/// Both halves must be non-empty after trimming.
pub fn dash_split(text: &str) -> Option<(&str, &str)> {
    SEPARATORS.iter().find_map(|sep| {
        let (brand, model) = text.split_once(sep)?;
        let (brand, model) = (brand.trim(), model.trim());
        (!brand.is_empty() && !model.is_empty()).then_some((brand, model))
    })
}
