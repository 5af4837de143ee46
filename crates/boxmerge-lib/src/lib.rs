//! Concurrent merger of daily behaviour-box logs from a remote file share.
//!
//! This is a facade crate that re-exports functionality from the boxmerge
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```ignore
//! use boxmerge_lib::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let share = Arc::new(MountedShare::connect("/mnt/lab", None, None).await?);
//!     let range = DateRange::new(
//!         chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
//!         chrono::NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
//!     )?;
//!
//!     let layout = RoomLayout::builtin();
//!     let dispatcher = Arc::new(Dispatcher::new(layout, range));
//!     let job = MergeJob::new(&layout.base, "Results");
//!
//!     let summary = run_merge(share.clone(), dispatcher, &job, Progress::new()).await?;
//!     println!("merged {} units", summary.merged.len());
//!     teardown(share.as_ref()).await;
//!     Ok(())
//! }
//! ```

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/lynchlab/boxmerge/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use boxmerge_types::*;

// Re-export share access
pub use boxmerge_fetch::{
    Credentials, DayFetch, FetchConfig, MemoryShare, MountedShare, RemoteEntry, RemoteShare,
    RetryPolicy, ShareError, ShareStage, ShareTarget, fetch_day,
};

// Re-export the merge pipeline
#[cfg(feature = "merge")]
pub use boxmerge_merge::{
    Dispatcher, MergeError, MergeJob, OutputSink, PoolConfig, Progress, ProgressSnapshot,
    RunSummary, UnitFailure, UnitMerger, UnitReport, reset_output_dir, run_merge, teardown,
};

// Re-export estimation
#[cfg(feature = "estimate")]
pub use boxmerge_estimate::{Estimator, ProgressBasis, SizeEstimate};

// Re-export search
#[cfg(feature = "search")]
pub use boxmerge_search::{
    CsvExporter, DEFAULT_OFFSETS, ExportError, ExportFormat, Exporter, JsonExporter,
    SearchError, SearchMatch, SearchResults, export_matches, search_archives,
};

/// Prelude module for convenient imports.
///
/// ```
/// use boxmerge_lib::prelude::*;
/// ```
pub mod prelude {
    pub use boxmerge_types::{
        BoxmergeError, ChunkSize, DateRange, DateRangeError, LayoutError, MergeUnit, Result,
        Room, RoomLayout,
    };

    pub use boxmerge_fetch::{
        Credentials, FetchConfig, MemoryShare, MountedShare, RemoteShare, RetryPolicy,
        ShareError, ShareTarget,
    };

    #[cfg(feature = "merge")]
    pub use boxmerge_merge::{
        Dispatcher, MergeError, MergeJob, PoolConfig, Progress, RunSummary, run_merge, teardown,
    };

    #[cfg(feature = "estimate")]
    pub use boxmerge_estimate::{Estimator, ProgressBasis};

    #[cfg(feature = "search")]
    pub use boxmerge_search::{ExportFormat, export_matches, search_archives};
}
