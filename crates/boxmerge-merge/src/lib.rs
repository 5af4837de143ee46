//! Concurrent fetch-and-merge pipeline for boxmerge.
//!
//! - [`Dispatcher`] - Hands out merge units, each exactly once
//! - [`UnitMerger`] - Concatenates one unit's day files into its archive
//! - [`Progress`] - Byte and day counters shared by all workers
//! - [`OutputSink`] - Append-only archive file of one unit
//! - [`run_merge`] - Worker pool driving the above to completion
//! - [`teardown`] - Ordered release of the shared share

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/lynchlab/boxmerge/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod dispatcher;
mod error;
mod merger;
mod pool;
mod progress;
mod sink;
mod summary;
mod teardown;

pub use dispatcher::Dispatcher;
pub use error::MergeError;
pub use merger::{UnitMerger, UnitReport};
pub use pool::{MergeJob, PoolConfig, run_merge};
pub use progress::{Progress, ProgressSnapshot};
pub use sink::{OutputSink, reset_output_dir};
pub use summary::{RunSummary, UnitFailure};
pub use teardown::teardown;
