use std::io::{self, BufRead};

use clap::Args;

use crate::cli::{OutputFormat, SourceArgs};
use crate::core::result::MatchResult;
use crate::matching::engine::{MatchEngine, MatchOptions};

#[derive(Args)]
pub struct MatchArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Mentions to classify. Use '-' to read one mention per stdin line
    #[arg(required = true)]
    pub inputs: Vec<String>,

    /// Context label from an upstream match, e.g. the razor's format
    #[arg(long)]
    pub context: Option<String>,

    /// Skip the correct-matches table
    #[arg(long)]
    pub bypass_correct: bool,
}

/// Execute match subcommand
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded or stdin cannot be read.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: MatchArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let sources = args.source.sources();
    let engine = MatchEngine::load(args.source.domain, &sources)?;

    if verbose {
        eprintln!(
            "Loaded {} catalog with {} entries ({} formats)",
            args.source.domain,
            engine.catalog().len(),
            engine.catalog().formats().len()
        );
        let dropped = engine.pattern_warnings().len();
        if dropped > 0 {
            eprintln!("Warning: {dropped} catalog pattern(s) failed to compile and were skipped");
        }
    }

    let inputs = read_inputs(&args.inputs)?;
    let options = MatchOptions {
        bypass_override: args.bypass_correct,
    };
    let results: Vec<MatchResult> = inputs
        .iter()
        .map(|text| engine.find_match_with(text, args.context.as_deref(), options))
        .collect();

    match format {
        OutputFormat::Text => print_text_results(&results),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
        OutputFormat::Tsv => print_tsv_results(&results),
    }

    Ok(())
}

/// Expand '-' into stdin lines; blank lines are skipped
fn read_inputs(args: &[String]) -> anyhow::Result<Vec<String>> {
    let mut inputs = Vec::new();
    for arg in args {
        if arg == "-" {
            for line in io::stdin().lock().lines() {
                let line = line?;
                if !line.trim().is_empty() {
                    inputs.push(line);
                }
            }
        } else {
            inputs.push(arg.clone());
        }
    }
    Ok(inputs)
}

fn print_text_results(results: &[MatchResult]) {
    for (i, result) in results.iter().enumerate() {
        if i > 0 {
            println!();
        }

        println!("{}", result.original);
        let kind = result.kind().map_or("none", |k| k.as_str());
        println!("   Match: {kind}");

        if let Some(matched) = result.matched() {
            println!("   Brand: {}", matched.brand);
            if let Some(model) = &matched.model {
                println!("   Model: {model}");
            }
            if let Some(format) = &matched.format {
                println!("   Format: {format}");
            }
            for (key, value) in &matched.attributes {
                println!("   {key}: {}", render_value(value));
            }
        }
        if let Some(pattern) = result.pattern() {
            println!("   Pattern: {pattern}");
        }
    }
}

fn print_tsv_results(results: &[MatchResult]) {
    println!("original\tnormalized\tmatch_type\tbrand\tmodel\tformat\tpattern");
    for result in results {
        let matched = result.matched();
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            result.original,
            result.normalized,
            result.kind().map_or("", |k| k.as_str()),
            matched.map_or("", |m| m.brand.as_str()),
            matched.and_then(|m| m.model.as_deref()).unwrap_or(""),
            matched.and_then(|m| m.format.as_deref()).unwrap_or(""),
            result.pattern().unwrap_or(""),
        );
    }
}

fn render_value(value: &serde_yaml::Value) -> String {
    match value {
        serde_yaml::Value::String(s) => s.clone(),
        other => serde_json::to_string(other).unwrap_or_else(|_| format!("{other:?}")),
    }
}
