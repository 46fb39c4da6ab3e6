//! Matching engine, specificity ranking and format resolution.
//!
//! This module provides the core matching functionality:
//!
//! - [`MatchEngine`]: Main entry point, one per product domain
//! - [`PatternRanker`]: Deterministic specificity score for catalog patterns
//! - [`FormatResolver`]: Context label → target format and fallback chain
//!
//! ## Matching Algorithm
//!
//! Each input is normalized, then tried against, in order:
//!
//! 1. **Context rules**: labels such as `Cartridge` or `Straight` decide the
//!    outcome without any search
//! 2. **Correct matches**: curated literals with a known brand/model
//! 3. **Exclusions**: curated literals that are not products
//! 4. **Model patterns**: the target format, then its fallback chain; or every
//!    format at once when the context is missing or generic
//! 5. **Brand patterns**: brand known, model unknown
//! 6. **Dash split**: `Brand - Scent` for soaps
//!
//! Within one search the first pattern, in rank order, whose regex matches
//! wins. Rank order is the [`ScoreTuple`](scoring::ScoreTuple): longer
//! patterns, then more required fragments, then more syntax, then more
//! word boundaries.
//!
//! ## Example
//!
//! ```rust,no_run
//! use shave_match::{CatalogSources, Domain, MatchEngine};
//! use std::path::Path;
//!
//! let sources = CatalogSources::from_data_dir(Path::new("data"), Domain::Blade);
//! let engine = MatchEngine::load(Domain::Blade, &sources).unwrap();
//!
//! let result = engine.find_match("Feather", Some("Shavette (AC)"));
//! if let Some(blade) = result.matched() {
//!     println!("{} {:?} [{:?}]", blade.brand, blade.model, blade.format);
//! }
//! ```

pub mod cache;
pub mod engine;
pub mod format;
pub mod scoring;
pub mod split;

pub use engine::{MatchEngine, MatchOptions, MatchingConfig};
pub use format::{FormatResolver, Resolution};
pub use scoring::{PatternRanker, ScoreTuple};
