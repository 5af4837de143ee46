//! Display utilities and output formatting for the boxmerge CLI.

use boxmerge_lib::{
    Estimator, ExportFormat, ProgressBasis, ProgressSnapshot, RunSummary, SizeEstimate,
};
use clap::ValueEnum;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

/// Export format for search results.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum Format {
    Csv,
    Json,
}

impl From<Format> for ExportFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Csv => Self::Csv,
            Format::Json => Self::Json,
        }
    }
}

/// Creates the merge progress bar, counting bytes or days.
pub(crate) fn progress_bar(basis: ProgressBasis, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let template = match basis {
        ProgressBasis::Bytes(_) => {
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({percent}%) {msg}"
        }
        ProgressBasis::Days(_) => {
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} days ({percent}%) {msg}"
        }
    };

    let pb = ProgressBar::new(basis.total());
    pb.set_style(
        ProgressStyle::default_bar()
            .template(template)
            .expect("Invalid progress template")
            .progress_chars("=>-"),
    );
    pb
}

/// Moves the bar to the counters in `snapshot`.
pub(crate) fn update_bar(pb: &ProgressBar, snapshot: ProgressSnapshot, basis: ProgressBasis) {
    let position = match basis {
        ProgressBasis::Bytes(_) => snapshot.bytes,
        ProgressBasis::Days(_) => snapshot.days,
    };
    // files may have grown since they were sized
    if pb.length().is_some_and(|len| position > len) {
        pb.set_length(position);
    }
    pb.set_position(position);
    pb.set_message(format!("{} units done", snapshot.units));
}

/// Prints the size estimate of a planned run.
pub(crate) fn print_estimate(estimate: &SizeEstimate) {
    match (estimate.day_files, estimate.total_bytes) {
        (Some(files), Some(bytes)) => {
            println!("  Day files found: {files}");
            println!("  Estimated size: {}", Estimator::format_bytes(bytes));
        }
        _ => println!("  Estimated size: unavailable"),
    }
}

/// Prints the outcome of a merge run.
pub(crate) fn print_summary(summary: &RunSummary, output_dir: &Path) {
    println!(
        "\nMerge complete in {}:",
        Estimator::format_duration(summary.elapsed)
    );
    println!("  Units merged: {}", summary.merged.len());
    println!("  Units failed: {}", summary.failed.len());
    println!("  Days written: {}", summary.days_written());
    println!("  Days empty:   {}", summary.days_empty());
    println!("  Days skipped: {}", summary.days_skipped());
    println!(
        "  Written: {} to {}",
        Estimator::format_bytes(summary.total_bytes()),
        output_dir.display()
    );

    if !summary.failed.is_empty() {
        println!("\nFailed units:");
        for failure in &summary.failed {
            println!(
                "  {}/{}: {}",
                failure.unit.room(),
                failure.unit.box_label(),
                failure.error
            );
        }
    }
}

/// Formats the warning for share release steps that failed.
pub(crate) fn release_warning(failures: usize) -> Option<String> {
    (failures > 0).then(|| {
        format!("Warning: {failures} share release step(s) failed; see log for details")
    })
}

/// Prints the release warning to stderr unless quiet.
pub(crate) fn print_release_warning(failures: usize, quiet: bool) {
    if quiet {
        return;
    }
    if let Some(warning) = release_warning(failures) {
        eprintln!("{warning}");
    }
}
