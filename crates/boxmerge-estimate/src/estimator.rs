//! Advisory sizing of a merge run.

use std::time::Duration;

use boxmerge_fetch::{RemoteShare, ShareError};
use boxmerge_types::{MergeUnit, box_dir, date_from_day_file};
use tracing::{debug, warn};

/// Default time allowed for listing the share.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Unit progress is measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressBasis {
    /// Payload bytes, with the estimated total.
    Bytes(u64),
    /// Days processed, with the total day count.
    Days(u64),
}

impl ProgressBasis {
    /// Returns the total the progress counter runs up to.
    #[must_use]
    pub const fn total(&self) -> u64 {
        match self {
            Self::Bytes(total) | Self::Days(total) => *total,
        }
    }
}

/// Result of sizing a merge run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeEstimate {
    /// Number of units.
    pub units: usize,
    /// Number of (unit, day) fetches the run will attempt.
    pub total_days: u64,
    /// Number of day files found inside the range, if listing succeeded.
    pub day_files: Option<u64>,
    /// Sum of their sizes, if listing succeeded.
    pub total_bytes: Option<u64>,
}

impl SizeEstimate {
    /// An estimate without byte information.
    #[must_use]
    pub const fn days_only(units: usize, total_days: u64) -> Self {
        Self {
            units,
            total_days,
            day_files: None,
            total_bytes: None,
        }
    }

    /// Picks how progress should be measured: bytes when a non-zero byte
    /// total is known, days otherwise.
    #[must_use]
    pub const fn basis(&self) -> ProgressBasis {
        match self.total_bytes {
            Some(bytes) if bytes > 0 => ProgressBasis::Bytes(bytes),
            _ => ProgressBasis::Days(self.total_days),
        }
    }
}

/// Size estimator for merge runs.
#[derive(Debug, Clone)]
pub struct Estimator {
    timeout: Duration,
}

impl Estimator {
    /// Creates an estimator that gives up listing after `timeout`.
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Returns the listing timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Estimates the bytes a merge of `units` will fetch.
    ///
    /// Never fails: any listing error or a timeout yields an estimate with
    /// only day counts.
    pub async fn estimate<S>(&self, share: &S, base: &str, units: &[MergeUnit]) -> SizeEstimate
    where
        S: RemoteShare + ?Sized,
    {
        let total_days: u64 = units.iter().map(|u| u.range().total_days() as u64).sum();

        match tokio::time::timeout(self.timeout, sum_units(share, base, units)).await {
            Ok(Ok((files, bytes))) => SizeEstimate {
                units: units.len(),
                total_days,
                day_files: Some(files),
                total_bytes: Some(bytes),
            },
            Ok(Err(e)) => {
                warn!(error = %e, "could not size share; counting days instead");
                SizeEstimate::days_only(units.len(), total_days)
            }
            Err(_) => {
                warn!(timeout = ?self.timeout, "sizing share timed out; counting days instead");
                SizeEstimate::days_only(units.len(), total_days)
            }
        }
    }

    /// Formats bytes in human-readable form (e.g., "1.5 GB", "250 MB").
    #[must_use]
    pub fn format_bytes(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = 1024 * KB;
        const GB: u64 = 1024 * MB;
        const TB: u64 = 1024 * GB;

        if bytes >= TB {
            format!("{:.2} TB", bytes as f64 / TB as f64)
        } else if bytes >= GB {
            format!("{:.2} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.2} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.2} KB", bytes as f64 / KB as f64)
        } else {
            format!("{} B", bytes)
        }
    }

    /// Formats duration in human-readable form (e.g., "2h 30m", "45m").
    #[must_use]
    pub fn format_duration(duration: Duration) -> String {
        let total_secs = duration.as_secs();
        let hours = total_secs / 3600;
        let minutes = (total_secs % 3600) / 60;
        let seconds = total_secs % 60;

        if hours > 0 {
            if minutes > 0 {
                format!("{}h {}m", hours, minutes)
            } else {
                format!("{}h", hours)
            }
        } else if minutes > 0 {
            if seconds > 0 && minutes < 10 {
                format!("{}m {}s", minutes, seconds)
            } else {
                format!("{}m", minutes)
            }
        } else {
            format!("{}s", seconds)
        }
    }
}

impl Default for Estimator {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

/// Sums day files of every unit. Box directories that do not exist count as
/// empty.
async fn sum_units<S>(share: &S, base: &str, units: &[MergeUnit]) -> Result<(u64, u64), ShareError>
where
    S: RemoteShare + ?Sized,
{
    let mut files = 0;
    let mut bytes = 0;

    for unit in units {
        let root = box_dir(base, unit.room(), unit.box_label());
        let mut pending = vec![root];

        while let Some(dir) = pending.pop() {
            let entries = match share.list(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.is_not_found() => {
                    debug!(dir, "no such directory");
                    continue;
                }
                Err(e) => return Err(e),
            };

            for entry in entries {
                if entry.is_dir {
                    pending.push(format!("{dir}/{}", entry.name));
                } else if date_from_day_file(&entry.name).is_some_and(|d| unit.range().contains(d))
                {
                    files += 1;
                    bytes += entry.size;
                }
            }
        }
    }

    Ok((files, bytes))
}
