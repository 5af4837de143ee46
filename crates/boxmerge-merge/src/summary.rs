//! Run summaries.

use std::time::Duration;

use boxmerge_types::MergeUnit;

use crate::{MergeError, UnitReport};

/// A unit that could not be merged.
#[derive(Debug)]
pub struct UnitFailure {
    /// The unit.
    pub unit: MergeUnit,
    /// Why it failed.
    pub error: MergeError,
}

/// Outcome of a whole merge run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Units merged, in completion order.
    pub merged: Vec<UnitReport>,
    /// Units that failed, in completion order.
    pub failed: Vec<UnitFailure>,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

impl RunSummary {
    /// Returns true if every claimed unit was merged.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Returns the number of units finished either way.
    #[must_use]
    pub fn units(&self) -> usize {
        self.merged.len() + self.failed.len()
    }

    /// Returns the payload bytes written across all units.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.merged.iter().map(|r| r.bytes_written).sum()
    }

    /// Returns the number of days appended across all units.
    #[must_use]
    pub fn days_written(&self) -> u64 {
        self.merged.iter().map(|r| r.days_written).sum()
    }

    /// Returns the number of empty days across all units.
    #[must_use]
    pub fn days_empty(&self) -> u64 {
        self.merged.iter().map(|r| r.days_empty).sum()
    }

    /// Returns the number of missing or unreadable days across all units.
    #[must_use]
    pub fn days_skipped(&self) -> u64 {
        self.merged.iter().map(|r| r.days_skipped).sum()
    }

    /// Returns the merged report for a unit's archive name, if present.
    #[must_use]
    pub fn report_for(&self, output_name: &str) -> Option<&UnitReport> {
        self.merged
            .iter()
            .find(|r| r.unit.output_name() == output_name)
    }
}
