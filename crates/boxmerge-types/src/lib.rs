//! Core types for the boxmerge log archive merger.
//!
//! This crate provides the fundamental data structures used throughout boxmerge:
//!
//! - [`DateRange`] - Inclusive date range with day iteration
//! - [`MergeUnit`] - One (room, box) pair whose daily files are concatenated
//! - [`RoomLayout`] - Ordered rooms and their boxes
//! - [`ChunkSize`] - Clamped read chunk size
//! - [`day_path`] / [`output_file_name`] - Remote and local naming conventions

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/lynchlab/boxmerge/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod chunk;
mod date_range;
mod error;
mod layout;
mod paths;
mod unit;

pub use chunk::ChunkSize;
pub use date_range::{DateRange, DayIterator, epoch};
pub use error::{BoxmergeError, DateRangeError, LayoutError, Result};
pub use layout::{BOXES_PER_ROOM, Room, RoomLayout};
pub use paths::{
    DEFAULT_BASE, box_dir, date_from_day_file, day_path, output_file_name, parse_output_file_name,
};
pub use unit::MergeUnit;
