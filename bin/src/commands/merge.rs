//! Merge command implementation.
//!
//! Fetches every unit's day files from the share and writes one archive per
//! (room, box) into the output directory.

use crate::commands::source::SourceArgs;
use crate::display;
use anyhow::{Context, Result, bail};
use boxmerge_lib::prelude::*;
use boxmerge_lib::{ProgressSnapshot, SizeEstimate};
use clap::Args;
use indicatif::ProgressBar;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::info;

/// How often the progress bar is refreshed.
const REFRESH_INTERVAL: Duration = Duration::from_millis(200);

/// Options of the `merge` command.
#[derive(Debug, Args)]
pub(crate) struct MergeArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Concurrent workers. Defaults to the number of CPUs.
    #[arg(short, long)]
    workers: Option<usize>,

    /// Read chunk size in KiB
    #[arg(long, default_value_t = 16)]
    chunk_kb: usize,

    /// Largest read chunk size in KiB
    #[arg(long, default_value_t = 1024)]
    max_chunk_kb: usize,

    /// Attempts per open and per read before a day is skipped
    #[arg(long, default_value_t = 1)]
    read_attempts: u32,

    /// Directory receiving the merged archives. Emptied before the run.
    #[arg(short, long, default_value = "Results")]
    output_dir: PathBuf,

    /// Stop handing out units after the first unit that cannot be written
    #[arg(long)]
    fail_fast: bool,

    /// Skip sizing the share; progress then counts days instead of bytes
    #[arg(long)]
    no_estimate: bool,
}

/// Run a merge.
pub(crate) async fn merge(args: MergeArgs, quiet: bool) -> Result<()> {
    let range = args.source.range()?;
    let layout = args.source.layout()?;
    let workers = args.workers.unwrap_or_else(num_cpus::get);
    if workers == 0 {
        bail!("--workers must be at least 1");
    }

    let share = Arc::new(args.source.connect().await?);
    let units = layout.units(range);

    let estimate = if args.no_estimate {
        SizeEstimate::days_only(units.len(), (units.len() * range.total_days()) as u64)
    } else {
        Estimator::default()
            .estimate(share.as_ref(), &layout.base, &units)
            .await
    };
    let basis = estimate.basis();

    let fetch = FetchConfig {
        chunk_size: ChunkSize::from_kib(args.chunk_kb, args.max_chunk_kb),
        retry: RetryPolicy::attempts(args.read_attempts),
    };
    let job = MergeJob::new(layout.base.clone(), args.output_dir.clone())
        .with_fetch(fetch)
        .with_pool(PoolConfig {
            workers,
            fail_fast: args.fail_fast,
        });

    info!(
        units = units.len(),
        %range,
        workers,
        chunk_size = fetch.chunk_size.get(),
        output = %args.output_dir.display(),
        "starting merge"
    );

    let progress = Progress::new();
    let bar = display::progress_bar(basis, quiet);
    let ticker = spawn_ticker(bar.clone(), progress.clone(), basis);

    let dispatcher = Arc::new(Dispatcher::new(&layout, range));
    let result = run_merge(share.clone(), dispatcher, &job, progress.clone()).await;

    ticker.abort();
    display::update_bar(&bar, progress.snapshot(), basis);
    bar.finish_and_clear();

    let release_errors = teardown(share.as_ref()).await;
    display::print_release_warning(release_errors.len(), quiet);

    let summary = result.context("Merge run aborted")?;
    if !quiet {
        display::print_summary(&summary, &args.output_dir);
    }

    if !summary.is_success() {
        bail!(
            "{} of {} units could not be merged",
            summary.failed.len(),
            summary.units()
        );
    }
    Ok(())
}

/// Refreshes the bar from the shared counters until aborted.
fn spawn_ticker(bar: ProgressBar, progress: Progress, basis: ProgressBasis) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(REFRESH_INTERVAL);
        let mut last = ProgressSnapshot::default();
        loop {
            interval.tick().await;
            let snapshot = progress.snapshot();
            if snapshot != last {
                display::update_bar(&bar, snapshot, basis);
                last = snapshot;
            }
            bar.tick();
        }
    })
}
