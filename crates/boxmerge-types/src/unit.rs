//! Merge units.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::{DateRange, day_path, output_file_name};

/// One (room, box) pair whose daily files are concatenated into one archive.
///
/// Units are created once at enumeration time and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MergeUnit {
    room: String,
    box_label: String,
    range: DateRange,
}

impl MergeUnit {
    /// Creates a new merge unit.
    #[must_use]
    pub fn new(room: impl Into<String>, box_label: impl Into<String>, range: DateRange) -> Self {
        Self {
            room: room.into(),
            box_label: box_label.into(),
            range,
        }
    }

    /// Returns the room name.
    #[must_use]
    pub fn room(&self) -> &str {
        &self.room
    }

    /// Returns the box label.
    #[must_use]
    pub fn box_label(&self) -> &str {
        &self.box_label
    }

    /// Returns the inclusive date range.
    #[must_use]
    pub const fn range(&self) -> DateRange {
        self.range
    }

    /// Returns the remote path of this unit's file for `day`.
    #[must_use]
    pub fn day_path(&self, base: &str, day: NaiveDate) -> String {
        day_path(base, &self.room, &self.box_label, day)
    }

    /// Returns the archive file name, `{room}_{box}.txt`.
    #[must_use]
    pub fn output_name(&self) -> String {
        output_file_name(&self.room, &self.box_label)
    }

    /// Returns the archive path inside `output_dir`.
    #[must_use]
    pub fn output_path(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(self.output_name())
    }
}

impl std::fmt::Display for MergeUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{} ({})", self.room, self.box_label, self.range)
    }
}
