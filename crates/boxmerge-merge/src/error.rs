//! Merge pipeline errors.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the merge pipeline.
///
/// Per-day fetch problems never appear here; they are skipped by the merger.
#[derive(Error, Debug)]
pub enum MergeError {
    /// The output directory could not be reset. Fatal for the run.
    #[error("Failed to prepare output directory '{path}': {source}")]
    OutputDir {
        /// The output directory.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A unit's archive could not be created, written or closed. Fatal for
    /// that unit only.
    #[error("Failed to write archive '{path}': {source}")]
    Sink {
        /// The archive path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A unit failed and the run was configured to stop on the first failure.
    #[error("Merge of {unit} failed: {source}")]
    UnitFailed {
        /// The unit that failed.
        unit: String,
        /// Why it failed.
        source: Box<MergeError>,
    },

    /// A worker task panicked or was cancelled.
    #[error("Worker task failed: {0}")]
    Worker(String),
}

impl MergeError {
    /// Returns true if this error ends the whole run rather than one unit.
    #[must_use]
    pub const fn is_run_fatal(&self) -> bool {
        !matches!(self, Self::Sink { .. })
    }
}
