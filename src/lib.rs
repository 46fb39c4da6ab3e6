//! # shave-match
//!
//! A library for classifying free-form shaving product mentions (razors,
//! blades, brushes, soaps) against curated catalogs.
//!
//! Shave logs name products loosely: "feather", "**Feather** Hi-Stainless",
//! "Personna hair shaper". `shave-match` resolves each mention to a
//! brand/model/format record and reports how the match was made, so that
//! downstream aggregation can trust (or audit) it.
//!
//! ## Features
//!
//! - **Exact overrides**: curated literals resolve in O(1) before any regex
//! - **Specificity ranking**: deterministic tie-break so the most specific
//!   catalog pattern wins
//! - **Format-aware search**: the razor's format selects which blade
//!   partition is searched, with defined fallbacks
//! - **Global mode**: ambiguous razor formats search every partition without
//!   favouring the largest one
//! - **Lazy caches**: compiled patterns and curated indexes are rebuilt on
//!   demand after invalidation
//!
//! ## Example
//!
//! ```rust,no_run
//! use shave_match::{Catalog, Domain, MatchEngine};
//! use std::path::Path;
//!
//! let catalog = Catalog::load(Path::new("data/blades.yaml"), Domain::Blade.layout()).unwrap();
//! let engine = MatchEngine::new(Domain::Blade, catalog);
//!
//! let result = engine.find_match("Feather", Some("AC"));
//! println!("{:?} {:?}", result.kind(), result.matched());
//! ```
//!
//! ## Modules
//!
//! - [`catalog`]: Catalog loading, pattern compilation, curated tables
//! - [`core`]: Core data types and normalization
//! - [`matching`]: Matching engine, ranking and format resolution
//! - [`cli`]: Command-line interface implementation

pub mod catalog;
pub mod cli;
pub mod core;
pub mod matching;

// Re-export commonly used types for convenience
pub use catalog::store::{Catalog, CatalogError};
pub use catalog::{CatalogSources, DataSource};
pub use core::result::{MatchResult, Outcome, Payload};
pub use core::types::*;
pub use matching::engine::{MatchEngine, MatchOptions, MatchingConfig};
