//! Merging one unit's day files into its archive.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use boxmerge_fetch::{DayFetch, FetchConfig, RemoteShare, fetch_day};
use boxmerge_types::MergeUnit;
use tracing::{debug, trace};

use crate::{MergeError, OutputSink, Progress};

/// Result of merging one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitReport {
    /// The merged unit.
    pub unit: MergeUnit,
    /// Archive path.
    pub path: PathBuf,
    /// Payload bytes appended.
    pub bytes_written: u64,
    /// Days whose payload was appended.
    pub days_written: u64,
    /// Days whose file existed but was empty.
    pub days_empty: u64,
    /// Days that were missing or could not be read.
    pub days_skipped: u64,
}

impl UnitReport {
    fn new(unit: &MergeUnit, path: &Path) -> Self {
        Self {
            unit: unit.clone(),
            path: path.to_path_buf(),
            bytes_written: 0,
            days_written: 0,
            days_empty: 0,
            days_skipped: 0,
        }
    }
}

/// Concatenates a unit's day files, in date order, into its archive.
#[derive(Debug)]
pub struct UnitMerger<S> {
    share: Arc<S>,
    base: String,
    fetch: FetchConfig,
    output_dir: PathBuf,
    progress: Progress,
}

impl<S: RemoteShare> UnitMerger<S> {
    /// Creates a merger reading from `share` under `base` and writing
    /// archives into `output_dir`.
    #[must_use]
    pub fn new(
        share: Arc<S>,
        base: impl Into<String>,
        fetch: FetchConfig,
        output_dir: impl Into<PathBuf>,
        progress: Progress,
    ) -> Self {
        Self {
            share,
            base: base.into(),
            fetch,
            output_dir: output_dir.into(),
            progress,
        }
    }

    /// Merges every day of `unit` into `<output_dir>/<room>_<box>.txt`.
    ///
    /// Missing, unreadable and empty days contribute nothing. The archive is
    /// opened before the first day and closed exactly once after the last,
    /// also when writing fails part way.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::Sink`] if the archive cannot be created, written
    /// or closed.
    pub async fn merge(&self, unit: &MergeUnit) -> Result<UnitReport, MergeError> {
        let path = unit.output_path(&self.output_dir);
        let mut sink = OutputSink::create(&path).await?;

        let merged = self.merge_days(unit, &mut sink).await;
        let closed = sink.close().await;

        let report = merged?;
        closed?;
        Ok(report)
    }

    async fn merge_days(
        &self,
        unit: &MergeUnit,
        sink: &mut OutputSink,
    ) -> Result<UnitReport, MergeError> {
        let mut report = UnitReport::new(unit, sink.path());

        for day in unit.range().days() {
            let path = unit.day_path(&self.base, day);
            let fetched = fetch_day(self.share.as_ref(), &path, &self.fetch).await;

            match fetched {
                DayFetch::Data(bytes) => {
                    sink.append(&bytes).await?;
                    report.bytes_written += bytes.len() as u64;
                    report.days_written += 1;
                    self.progress.report(bytes.len() as u64);
                    trace!(%day, bytes = bytes.len(), "appended day");
                }
                DayFetch::Empty => report.days_empty += 1,
                DayFetch::Missing => report.days_skipped += 1,
                DayFetch::Unreadable(e) => {
                    debug!(%day, error = %e, "skipping unreadable day");
                    report.days_skipped += 1;
                }
            }
            self.progress.day_done();
        }

        Ok(report)
    }
}
