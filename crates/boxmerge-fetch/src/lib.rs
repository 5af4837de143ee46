//! Remote share access and chunked day file fetching for boxmerge.
//!
//! This crate provides the fetch side of the merge pipeline:
//!
//! - [`RemoteShare`] - Open/read/close/list interface of the network share
//! - [`fetch_day`] - Chunked sequential read of one day file into a [`DayFetch`]
//! - [`MountedShare`] - A share mounted into the local filesystem
//! - [`MemoryShare`] - In-memory share with fault injection

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/lynchlab/boxmerge/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod day;
mod memory;
mod mounted;
mod share;

pub use day::{DayFetch, FetchConfig, RetryPolicy, fetch_day};
pub use memory::{MemoryHandle, MemoryShare};
pub use mounted::{Credentials, MountedShare, ShareTarget};
pub use share::{RemoteEntry, RemoteShare, ShareError, ShareStage};
