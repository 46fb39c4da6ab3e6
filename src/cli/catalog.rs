use clap::{Args, Subcommand};

use crate::catalog::compiler::CompiledPattern;
use crate::cli::{OutputFormat, SourceArgs};
use crate::core::types::FormatId;
use crate::matching::engine::MatchEngine;

#[derive(Args)]
pub struct CatalogArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(subcommand)]
    pub command: CatalogCommands,
}

#[derive(Subcommand)]
pub enum CatalogCommands {
    /// List model patterns in match order
    Patterns {
        /// Restrict to one format partition (e.g. "Half DE")
        #[arg(long)]
        partition: Option<String>,
    },

    /// List declared formats with pattern counts and fallback chains
    Formats,

    /// List patterns that failed to compile
    Warnings,
}

/// Execute catalog subcommand
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded, a requested partition
/// is not declared, or output cannot be serialized.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: CatalogArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let sources = args.source.sources();
    let engine = MatchEngine::load(args.source.domain, &sources)?;

    if verbose {
        eprintln!(
            "Loaded {} catalog from {} ({} entries)",
            args.source.domain,
            sources.catalog.display(),
            engine.catalog().len()
        );
    }

    match args.command {
        CatalogCommands::Patterns { partition } => {
            run_patterns(&engine, partition.map(|p| FormatId::new(&p)), format)
        }
        CatalogCommands::Formats => run_formats(&engine, format),
        CatalogCommands::Warnings => run_warnings(&engine, format),
    }
}

fn run_patterns(
    engine: &MatchEngine,
    partition: Option<FormatId>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let compiled = engine.compiled();
    let patterns: Vec<&CompiledPattern> = match &partition {
        Some(id) => {
            if !engine.catalog().has_format(id) {
                anyhow::bail!("Format '{id}' is not declared in the catalog");
            }
            compiled.in_format(id).collect()
        }
        None => compiled.global().collect(),
    };

    match format {
        OutputFormat::Text => {
            let scope = partition.as_ref().map_or_else(|| "global".to_string(), ToString::to_string);
            println!("Model patterns, {scope} order ({} patterns)\n", patterns.len());

            let brand_width = patterns
                .iter()
                .map(|p| p.brand.len().min(30))
                .max()
                .unwrap_or(5)
                .max(5);
            println!(
                "{:>4} {:<8} {:<brand_w$} {:<24} {:<24} Pattern",
                "Rank",
                "Format",
                "Brand",
                "Model",
                "Score",
                brand_w = brand_width
            );
            println!("{}", "-".repeat(brand_width + 85));

            for (rank, p) in patterns.iter().enumerate() {
                println!(
                    "{:>4} {:<8} {:<brand_w$} {:<24} {:<24} {}",
                    rank + 1,
                    p.format.as_ref().map_or("-", FormatId::as_str),
                    truncate(&p.brand, brand_width),
                    truncate(p.model.as_deref().unwrap_or("-"), 24),
                    p.score.to_string(),
                    p.raw,
                    brand_w = brand_width
                );
            }
        }
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = patterns
                .iter()
                .enumerate()
                .map(|(rank, p)| {
                    serde_json::json!({
                        "rank": rank + 1,
                        "brand": p.brand,
                        "model": p.model,
                        "format": p.format,
                        "pattern": p.raw,
                        "score": p.score,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("rank\tformat\tbrand\tmodel\tpattern\tscore");
            for (rank, p) in patterns.iter().enumerate() {
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}",
                    rank + 1,
                    p.format.as_ref().map_or("", FormatId::as_str),
                    p.brand,
                    p.model.as_deref().unwrap_or(""),
                    p.raw,
                    p.score
                );
            }
        }
    }

    Ok(())
}

fn run_formats(engine: &MatchEngine, format: OutputFormat) -> anyhow::Result<()> {
    let compiled = engine.compiled();
    let formats = engine.catalog().formats();

    match format {
        OutputFormat::Text => {
            println!("Formats ({})\n", formats.len());
            println!("{:<16} {:>8}  Fallbacks", "Format", "Patterns");
            println!("{}", "-".repeat(48));
            for id in formats {
                let chain = engine.resolver().fallback_chain(id);
                let chain = if chain.is_empty() {
                    "-".to_string()
                } else {
                    join_formats(&chain)
                };
                println!("{:<16} {:>8}  {}", id, compiled.format_len(id), chain);
            }
        }
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = formats
                .iter()
                .map(|id| {
                    serde_json::json!({
                        "format": id,
                        "patterns": compiled.format_len(id),
                        "fallbacks": engine.resolver().fallback_chain(id),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("format\tpatterns\tfallbacks");
            for id in formats {
                println!(
                    "{}\t{}\t{}",
                    id,
                    compiled.format_len(id),
                    join_formats(&engine.resolver().fallback_chain(id))
                );
            }
        }
    }

    Ok(())
}

fn run_warnings(engine: &MatchEngine, format: OutputFormat) -> anyhow::Result<()> {
    let warnings = engine.pattern_warnings();

    match format {
        OutputFormat::Text => {
            if warnings.is_empty() {
                println!("All catalog patterns compiled");
            } else {
                println!("{} pattern(s) skipped:\n", warnings.len());
                for warning in warnings {
                    println!("  - {warning}");
                }
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(warnings)?),
        OutputFormat::Tsv => {
            println!("format\tbrand\tmodel\tpattern\tmessage");
            for w in warnings {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    w.format.as_ref().map_or("", FormatId::as_str),
                    w.brand,
                    w.model.as_deref().unwrap_or(""),
                    w.pattern,
                    w.message.replace(['\t', '\n'], " ")
                );
            }
        }
    }

    Ok(())
}

fn join_formats(formats: &[FormatId]) -> String {
    formats
        .iter()
        .map(FormatId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
