//! Plan command implementation.
//!
//! Lists the units a merge would claim, in claim order, and sizes the run
//! when the share is available.

use crate::commands::source::SourceArgs;
use crate::display;
use anyhow::Result;
use boxmerge_lib::prelude::*;
use clap::Args;
use std::iter;

/// Options of the `plan` command.
#[derive(Debug, Args)]
pub(crate) struct PlanArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Do not size the run on the share
    #[arg(long)]
    no_estimate: bool,
}

/// Show the merge plan.
pub(crate) async fn plan(args: PlanArgs, quiet: bool) -> Result<()> {
    let range = args.source.range()?;
    let layout = args.source.layout()?;

    let dispatcher = Dispatcher::new(&layout, range);
    let units: Vec<MergeUnit> = iter::from_fn(|| dispatcher.claim_next()).collect();

    println!("Merge plan:");
    println!("  Base: {}", layout.base);
    println!("  Date range: {range} ({} days)", range.total_days());
    println!("  Units: {}", units.len());
    println!();
    println!("{:<10} {:<12} {}", "ROOM", "BOX", "OUTPUT");
    println!("{}", "-".repeat(40));
    for unit in &units {
        println!(
            "{:<10} {:<12} {}",
            unit.room(),
            unit.box_label(),
            unit.output_name()
        );
    }
    println!();

    if args.no_estimate {
        return Ok(());
    }
    if args.source.mount.is_none() {
        println!("  Estimated size: skipped (no --mount given)");
        return Ok(());
    }

    let share = args.source.connect().await?;
    let estimate = Estimator::default()
        .estimate(&share, &layout.base, &units)
        .await;
    display::print_estimate(&estimate);
    let release_errors = teardown(&share).await;
    display::print_release_warning(release_errors.len(), quiet);

    Ok(())
}
