//! Advisory pre-run size estimation for boxmerge.
//!
//! - [`Estimator`] - Sums remote day file sizes for a set of merge units
//! - [`SizeEstimate`] - What the estimator found
//! - [`ProgressBasis`] - Whether progress is measured in bytes or days

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/lynchlab/boxmerge/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod estimator;

pub use estimator::{Estimator, ProgressBasis, SizeEstimate};
