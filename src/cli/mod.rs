//! Command-line interface for shave-match.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **match**: Classify product mentions against a domain catalog
//! - **catalog**: Inspect compiled patterns, formats and dropped patterns
//!
//! ## Usage
//!
//! ```text
//! # Classify a blade used in an AC shavette
//! shave-match match --domain blade --context "Shavette (AC)" "Feather Pro"
//!
//! # Classify one mention per stdin line, JSON output
//! cut -f2 blades.tsv | shave-match --format json match --domain blade -
//!
//! # Show ranked patterns of one partition
//! shave-match catalog --domain blade patterns --partition "Half DE"
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::catalog::{CatalogSources, DataSource};
use crate::core::types::Domain;

pub mod catalog;
pub mod classify;

#[derive(Parser)]
#[command(name = "shave-match")]
#[command(version)]
#[command(about = "Classify shaving product mentions against curated catalogs")]
#[command(
    long_about = "shave-match resolves free-form razor, blade, brush and soap mentions to catalog brand/model records.\n\nEach result reports how it was obtained:\n- exact: curated correct-matches literal\n- regex / brand: catalog pattern (model-level or brand-level)\n- alias: brand/model split from the text\n- filtered, intentionally_unmatched, auto_context, irrelevant_context: curated or context rules"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify product mentions
    Match(classify::MatchArgs),

    /// Inspect a compiled catalog
    Catalog(catalog::CatalogArgs),
}

/// Where a domain's catalog and curated tables live
#[derive(clap::Args)]
pub struct SourceArgs {
    /// Product domain
    #[arg(short, long)]
    pub domain: Domain,

    /// Data directory holding catalogs, correct_matches/ and filtered/
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Catalog file (overrides the data-directory convention)
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Correct-matches file (overrides the data-directory convention)
    #[arg(long)]
    pub correct_matches: Option<PathBuf>,

    /// Exclusions file (overrides the data-directory convention)
    #[arg(long)]
    pub exclusions: Option<PathBuf>,
}

impl SourceArgs {
    pub fn sources(&self) -> CatalogSources {
        let mut sources = CatalogSources::from_data_dir(&self.data_dir, self.domain);
        if let Some(path) = &self.catalog {
            sources.catalog = path.clone();
        }
        if let Some(path) = &self.correct_matches {
            sources.correct_matches = DataSource::File(path.clone());
        }
        if let Some(path) = &self.exclusions {
            sources.exclusions = DataSource::File(path.clone());
        }
        sources
    }
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}
