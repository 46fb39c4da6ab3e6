//! Core data types for product mention matching.
//!
//! This module provides the fundamental types used throughout the library:
//!
//! - [`FormatId`]: Canonical, case-insensitive format partition key
//! - [`Domain`], [`CatalogLayout`]: Which catalog an engine serves and its shape
//! - [`MatchKind`]: How a match was obtained
//! - [`Payload`], [`Outcome`], [`MatchResult`]: What the engine returns
//! - [`Normalizer`]: Input clean-up applied before every lookup
//!
//! ## Match kinds
//!
//! | Kind                      | Payload | Pattern |
//! |---------------------------|---------|---------|
//! | `exact`                   | yes     | no      |
//! | `regex`                   | yes     | yes     |
//! | `brand`                   | yes     | yes     |
//! | `alias`                   | yes     | no      |
//! | `auto_context`            | yes     | no      |
//! | `filtered`                | no      | no      |
//! | `intentionally_unmatched` | no      | no      |
//! | `irrelevant_context`      | no      | no      |
//! | none                      | no      | no      |
//!
//! [`FormatId`]: types::FormatId
//! [`Domain`]: types::Domain
//! [`CatalogLayout`]: types::CatalogLayout
//! [`MatchKind`]: types::MatchKind
//! [`Payload`]: result::Payload
//! [`Outcome`]: result::Outcome
//! [`MatchResult`]: result::MatchResult
//! [`Normalizer`]: normalize::Normalizer

pub mod normalize;
pub mod result;
pub mod types;
