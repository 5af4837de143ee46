//! Worker pool driving a merge run.

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use boxmerge_fetch::{FetchConfig, RemoteShare};
use boxmerge_types::MergeUnit;
use tokio::task::JoinSet;
use tracing::{Instrument, error, info, info_span, warn};

use crate::{
    Dispatcher, MergeError, Progress, RunSummary, UnitFailure, UnitMerger, UnitReport,
    reset_output_dir,
};

/// Worker pool settings.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Number of concurrent workers.
    pub workers: usize,
    /// Stop claiming new units after the first unit failure and return it.
    pub fail_fast: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: num_cpus::get(),
            fail_fast: false,
        }
    }
}

/// Everything a merge run needs besides the share and the units.
#[derive(Debug, Clone)]
pub struct MergeJob {
    /// Remote directory holding the per-room backups.
    pub base: String,
    /// Directory receiving one archive per unit. Reset at run start.
    pub output_dir: PathBuf,
    /// Chunk size and retry policy for day fetches.
    pub fetch: FetchConfig,
    /// Worker pool settings.
    pub pool: PoolConfig,
}

impl MergeJob {
    /// Creates a job with default fetch and pool settings.
    #[must_use]
    pub fn new(base: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            output_dir: output_dir.into(),
            fetch: FetchConfig::default(),
            pool: PoolConfig::default(),
        }
    }

    /// Sets the fetch settings.
    #[must_use]
    pub fn with_fetch(mut self, fetch: FetchConfig) -> Self {
        self.fetch = fetch;
        self
    }

    /// Sets the pool settings.
    #[must_use]
    pub fn with_pool(mut self, pool: PoolConfig) -> Self {
        self.pool = pool;
        self
    }
}

enum UnitOutcome {
    Merged(UnitReport),
    Failed(UnitFailure),
}

/// The unit whose failure halted dispatch, recorded when it happens rather
/// than when its worker is joined.
#[derive(Debug, Default)]
struct FirstFailure(OnceLock<MergeUnit>);

impl FirstFailure {
    /// Records `unit` unless a failure was already recorded.
    fn record(&self, unit: &MergeUnit) {
        let _ = self.0.set(unit.clone());
    }

    /// Removes the recorded failure from `failed`.
    fn take_from(&self, failed: &mut Vec<UnitFailure>) -> Option<UnitFailure> {
        let first = self.0.get()?;
        let index = failed.iter().position(|f| &f.unit == first)?;
        Some(failed.remove(index))
    }
}

/// Runs the merge: resets the output directory, then lets `job.pool.workers`
/// workers claim units from `dispatcher` until none are left.
///
/// Each worker merges one unit at a time. A unit whose archive cannot be
/// written is recorded as failed and the others continue, unless
/// `fail_fast` is set, in which case dispatch halts, in-flight units finish
/// and the failure is returned. The share is not released here; see
/// [`crate::teardown`].
///
/// # Errors
///
/// Returns [`MergeError::OutputDir`] if the output directory cannot be reset,
/// [`MergeError::Worker`] if a worker panics, and
/// [`MergeError::UnitFailed`] on the first unit failure when `fail_fast` is
/// set.
pub async fn run_merge<S>(
    share: Arc<S>,
    dispatcher: Arc<Dispatcher>,
    job: &MergeJob,
    progress: Progress,
) -> Result<RunSummary, MergeError>
where
    S: RemoteShare + 'static,
{
    let started = Instant::now();
    reset_output_dir(&job.output_dir).await?;

    let workers = job.pool.workers.max(1);
    info!(
        workers,
        units = dispatcher.total(),
        range = %dispatcher.range(),
        output_dir = %job.output_dir.display(),
        "starting merge"
    );

    let merger = Arc::new(UnitMerger::new(
        share,
        job.base.clone(),
        job.fetch,
        job.output_dir.clone(),
        progress.clone(),
    ));

    let first_failure = Arc::new(FirstFailure::default());
    let mut set = JoinSet::new();
    for worker in 0..workers {
        let dispatcher = Arc::clone(&dispatcher);
        let merger = Arc::clone(&merger);
        let progress = progress.clone();
        let first_failure = job.pool.fail_fast.then(|| Arc::clone(&first_failure));
        set.spawn(
            async move { work(&dispatcher, &merger, &progress, first_failure.as_deref()).await }
                .instrument(info_span!("worker", id = worker)),
        );
    }

    let mut summary = RunSummary::default();
    let mut worker_error = None;
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(outcomes) => {
                for outcome in outcomes {
                    match outcome {
                        UnitOutcome::Merged(report) => summary.merged.push(report),
                        UnitOutcome::Failed(failure) => summary.failed.push(failure),
                    }
                }
            }
            Err(e) => {
                error!(error = %e, "worker task failed; halting dispatch");
                dispatcher.halt();
                if worker_error.is_none() {
                    worker_error = Some(MergeError::Worker(e.to_string()));
                }
            }
        }
    }
    summary.elapsed = started.elapsed();

    if let Some(e) = worker_error {
        return Err(e);
    }
    if let Some(failure) = first_failure.take_from(&mut summary.failed) {
        return Err(MergeError::UnitFailed {
            unit: failure.unit.to_string(),
            source: Box::new(failure.error),
        });
    }

    info!(
        merged = summary.merged.len(),
        failed = summary.failed.len(),
        bytes = summary.total_bytes(),
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "merge finished"
    );
    Ok(summary)
}

async fn work<S: RemoteShare>(
    dispatcher: &Dispatcher,
    merger: &UnitMerger<S>,
    progress: &Progress,
    first_failure: Option<&FirstFailure>,
) -> Vec<UnitOutcome> {
    let mut outcomes = Vec::new();

    while let Some(unit) = dispatcher.claim_next() {
        let span = info_span!("unit", room = unit.room(), box_label = unit.box_label());
        match merger.merge(&unit).instrument(span).await {
            Ok(report) => {
                info!(
                    unit = %unit,
                    bytes = report.bytes_written,
                    days = report.days_written,
                    skipped = report.days_skipped,
                    "merged unit"
                );
                outcomes.push(UnitOutcome::Merged(report));
            }
            Err(e) => {
                warn!(unit = %unit, error = %e, "unit failed");
                if let Some(first) = first_failure {
                    first.record(&unit);
                    dispatcher.halt();
                }
                outcomes.push(UnitOutcome::Failed(UnitFailure { unit, error: e }));
            }
        }
        progress.unit_done();
    }

    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxmerge_fetch::MemoryShare;
    use boxmerge_types::{DateRange, RoomLayout, day_path};
    use chrono::NaiveDate;
    use std::path::Path;
    use tempfile::TempDir;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    fn two_days() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        )
        .unwrap()
    }

    fn job(output_dir: &Path, workers: usize, fail_fast: bool) -> MergeJob {
        MergeJob {
            base: "base".to_string(),
            output_dir: output_dir.to_path_buf(),
            fetch: FetchConfig::default(),
            pool: PoolConfig { workers, fail_fast },
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_two_room_scenario() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("Results");
        let range = two_days();
        let share = Arc::new(MemoryShare::new());
        let payload = b"A1 day one payload\n".to_vec();
        share.insert(day_path("base", "A", "1", range.start), payload.clone());

        let layout = RoomLayout::from_positional(
            "base",
            &strings(&["A", "B"]),
            &strings(&["1", "2", "3", "4"]),
        )
        .unwrap();
        let dispatcher = Arc::new(Dispatcher::new(&layout, range));
        let progress = Progress::new();

        let summary = run_merge(
            Arc::clone(&share),
            dispatcher,
            &job(&out, 3, false),
            progress.clone(),
        )
        .await
        .unwrap();

        let mut files: Vec<_> = std::fs::read_dir(&out)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        files.sort();
        assert_eq!(files, vec!["A_1.txt", "A_2.txt", "B_3.txt", "B_4.txt"]);

        assert_eq!(std::fs::read(out.join("A_1.txt")).unwrap(), payload);
        for empty in ["A_2.txt", "B_3.txt", "B_4.txt"] {
            assert_eq!(std::fs::metadata(out.join(empty)).unwrap().len(), 0);
        }

        assert!(summary.is_success());
        assert_eq!(summary.units(), 4);
        assert_eq!(summary.total_bytes(), payload.len() as u64);
        assert_eq!(progress.snapshot().bytes, payload.len() as u64);
        assert_eq!(progress.snapshot().days, 8);
        assert_eq!(progress.snapshot().units, 4);
        assert_eq!(summary.report_for("A_1.txt").unwrap().days_skipped, 1);
        assert_eq!(share.open_handles(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_every_unit_merged_once_with_more_units_than_workers() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out");
        let range = two_days();
        let share = Arc::new(MemoryShare::new());

        let rooms: Vec<String> = (0..20).map(|i| format!("R{i}")).collect();
        let boxes: Vec<String> = (0..40).map(|i| format!("B{i}")).collect();
        let mut expected_total = 0u64;
        for (i, room) in rooms.iter().enumerate() {
            for box_label in &boxes[i * 2..i * 2 + 2] {
                for day in range.days() {
                    let data = format!("{room}/{box_label}/{day}\n");
                    expected_total += data.len() as u64;
                    share.insert(day_path("base", room, box_label, day), data);
                }
            }
        }
        let layout = RoomLayout::from_positional("base", &rooms, &boxes).unwrap();
        let progress = Progress::new();

        let summary = run_merge(
            Arc::clone(&share),
            Arc::new(Dispatcher::new(&layout, range)),
            &job(&out, 5, false),
            progress.clone(),
        )
        .await
        .unwrap();

        assert_eq!(summary.merged.len(), 40);
        let mut names: Vec<_> = summary.merged.iter().map(|r| r.unit.output_name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 40);
        assert_eq!(progress.snapshot().bytes, expected_total);
        assert_eq!(summary.total_bytes(), expected_total);

        let r7 = std::fs::read_to_string(out.join("R7_B15.txt")).unwrap();
        assert_eq!(r7, "R7/B15/2024-01-01\nR7/B15/2024-01-02\n");
    }

    #[tokio::test]
    async fn test_unit_failure_does_not_stop_other_units() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out");
        let share = Arc::new(MemoryShare::new());
        // "x/y" puts the archive under a directory that does not exist
        let dispatcher = Arc::new(Dispatcher::positional(
            strings(&["A", "B"]),
            strings(&["x/y", "2", "3", "4"]),
            two_days(),
        ));

        let summary = run_merge(share, dispatcher, &job(&out, 2, false), Progress::new())
            .await
            .unwrap();

        assert!(!summary.is_success());
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].unit.box_label(), "x/y");
        assert_eq!(summary.merged.len(), 3);
        assert!(out.join("B_4.txt").exists());
    }

    #[tokio::test]
    async fn test_fail_fast_halts_dispatch() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out");
        let share = Arc::new(MemoryShare::new());
        let dispatcher = Arc::new(Dispatcher::positional(
            strings(&["A", "B"]),
            strings(&["x/y", "2", "3", "4"]),
            two_days(),
        ));

        let err = run_merge(share, Arc::clone(&dispatcher), &job(&out, 1, true), Progress::new())
            .await
            .unwrap_err();

        assert!(matches!(err, MergeError::UnitFailed { .. }));
        assert!(dispatcher.is_halted());
        assert_eq!(dispatcher.claimed(), 1);
        assert!(!out.join("A_2.txt").exists());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_fail_fast_with_several_workers_returns_a_failed_unit() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out");
        let dispatcher = Arc::new(Dispatcher::positional(
            strings(&["A", "B"]),
            strings(&["x/y", "p/q", "3", "4"]),
            two_days(),
        ));

        let err = run_merge(
            Arc::new(MemoryShare::new()),
            Arc::clone(&dispatcher),
            &job(&out, 2, true),
            Progress::new(),
        )
        .await
        .unwrap_err();

        let MergeError::UnitFailed { unit, source } = err else {
            panic!("expected a unit failure, got {err:?}");
        };
        assert!(unit.starts_with("A/x/y") || unit.starts_with("A/p/q"), "{unit}");
        assert!(matches!(*source, MergeError::Sink { .. }));
        assert!(dispatcher.is_halted());
    }

    #[test]
    fn test_first_failure_is_taken_regardless_of_join_order() {
        let unit = |b: &str| MergeUnit::new("A", b, two_days());
        let failure = |b: &str| UnitFailure {
            unit: unit(b),
            error: MergeError::Worker(b.to_string()),
        };
        let first = FirstFailure::default();
        first.record(&unit("2"));
        first.record(&unit("1"));

        let mut failed = vec![failure("1"), failure("2"), failure("3")];
        let taken = first.take_from(&mut failed).unwrap();

        assert_eq!(taken.unit.box_label(), "2");
        assert_eq!(failed.len(), 2);
        assert!(FirstFailure::default().take_from(&mut failed).is_none());
    }

    #[tokio::test]
    async fn test_unusable_output_dir_is_run_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let dispatcher = Arc::new(Dispatcher::positional(
            strings(&["A"]),
            strings(&["1", "2"]),
            two_days(),
        ));

        let err = run_merge(
            Arc::new(MemoryShare::new()),
            Arc::clone(&dispatcher),
            &job(&blocker.join("out"), 2, false),
            Progress::new(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, MergeError::OutputDir { .. }));
        assert_eq!(dispatcher.claimed(), 0);
    }

    #[tokio::test]
    async fn test_rerun_produces_identical_archives() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out");
        let range = two_days();
        let share = Arc::new(MemoryShare::new());
        share.insert(day_path("base", "A", "1", range.start), vec![1u8; 40_000]);
        share.insert(day_path("base", "A", "2", range.end), vec![2u8; 17]);
        let layout =
            RoomLayout::from_positional("base", &strings(&["A"]), &strings(&["1", "2"])).unwrap();

        let mut runs = Vec::new();
        for _ in 0..2 {
            run_merge(
                Arc::clone(&share),
                Arc::new(Dispatcher::new(&layout, range)),
                &job(&out, 2, false),
                Progress::new(),
            )
            .await
            .unwrap();
            runs.push((
                std::fs::read(out.join("A_1.txt")).unwrap(),
                std::fs::read(out.join("A_2.txt")).unwrap(),
            ));
        }

        assert_eq!(runs[0], runs[1]);
        assert_eq!(runs[0].0.len(), 40_000);
    }
}
