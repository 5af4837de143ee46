//! Search command implementation.
//!
//! Scans merged archives for identifiers and prints or exports the lines
//! around every match.

use crate::display::Format;
use anyhow::{Context, Result, bail};
use boxmerge_lib::{DEFAULT_OFFSETS, SearchResults, export_matches, search_archives};
use clap::Args;
use std::path::PathBuf;

/// Options of the `search` command.
#[derive(Debug, Args)]
pub(crate) struct SearchArgs {
    /// Identifiers to look for (e.g., animal IDs). Prompted for when omitted.
    identifiers: Vec<String>,

    /// Directory of merged archives
    #[arg(short, long, default_value = "Results")]
    dir: PathBuf,

    /// Relative line offsets to collect around each match, comma separated
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, default_values_t = DEFAULT_OFFSETS)]
    offsets: Vec<isize>,

    /// Export matches into this directory, one file per identifier
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Export format
    #[arg(short, long, value_enum, default_value = "csv")]
    format: Format,
}

/// Search merged archives.
pub(crate) fn search(args: SearchArgs, quiet: bool) -> Result<()> {
    let identifiers = if args.identifiers.is_empty() {
        let id = inquire::Text::new("Identifier to search for:")
            .prompt()
            .context("Failed to read identifier")?;
        vec![id.trim().to_string()]
    } else {
        args.identifiers
    };

    let mut found_any = false;
    for identifier in &identifiers {
        let results = search_archives(&args.dir, identifier, &args.offsets)
            .with_context(|| format!("Search for {identifier} failed"))?;
        found_any |= !results.is_empty();

        if !quiet {
            print_results(&results);
        }

        if let Some(out_dir) = &args.output_dir {
            let path = export_matches(&results, out_dir, args.format.into())
                .with_context(|| format!("Failed to export matches for {identifier}"))?;
            if !quiet {
                println!("Matches written to: {}", path.display());
            }
        }
    }

    if !found_any {
        bail!("No identifier was found in {}", args.dir.display());
    }
    Ok(())
}

fn print_results(results: &SearchResults) {
    if results.is_empty() {
        println!("{}: not found", results.identifier);
        return;
    }

    println!("{}: {} match(es)", results.identifier, results.len());
    for found in &results.matches {
        let location = match (&found.room, &found.box_label) {
            (Some(room), Some(box_label)) => format!("{room}/{box_label}"),
            _ => found.file.display().to_string(),
        };
        println!("-----------------");
        println!("{location} line {}", found.line);
        for line in &found.context {
            println!("  {line}");
        }
    }
    println!("-----------------");
}
