//! Error types for boxmerge.

use chrono::NaiveDate;
use thiserror::Error;

/// Result type alias for boxmerge operations.
pub type Result<T> = std::result::Result<T, BoxmergeError>;

/// Errors that can abort a boxmerge run.
#[derive(Error, Debug)]
pub enum BoxmergeError {
    /// Invalid date range.
    #[error(transparent)]
    DateRange(#[from] DateRangeError),

    /// Malformed room/box layout.
    #[error(transparent)]
    Layout(#[from] LayoutError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error while reading a layout file.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error for invalid date ranges.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateRangeError {
    /// Start date is after end date.
    #[error("Invalid date range: {start} > {end}")]
    InvalidRange {
        /// The start date.
        start: NaiveDate,
        /// The end date.
        end: NaiveDate,
    },
}

/// Error for room/box layouts that cannot be turned into merge units.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// No rooms were configured.
    #[error("Layout has no rooms")]
    Empty,

    /// The positional box list is too short for the room list.
    #[error("Layout needs {expected} boxes for {rooms} rooms, got {actual}")]
    MissingBoxes {
        /// Number of rooms.
        rooms: usize,
        /// Number of boxes required.
        expected: usize,
        /// Number of boxes supplied.
        actual: usize,
    },

    /// A room was configured without boxes.
    #[error("Room {0} has no boxes")]
    RoomWithoutBoxes(String),

    /// A room or box name cannot be used as a path component.
    #[error("Invalid name {0:?}: must be non-empty and contain no path separators")]
    InvalidName(String),
}
