//! Remote path and output file naming conventions.

use chrono::{Datelike, NaiveDate};

/// Default remote directory holding the per-room backups.
pub const DEFAULT_BASE: &str = "WLynch_Labs/Data Backup";

/// Date stamp format used in day file names.
const DAY_STAMP: &str = "%Y-%m-%d";

/// Builds the remote directory for one box: `{base}/{room}/{box}`.
#[must_use]
pub fn box_dir(base: &str, room: &str, box_label: &str) -> String {
    let base = base.trim_end_matches('/');
    if base.is_empty() {
        format!("{room}/{box_label}")
    } else {
        format!("{base}/{room}/{box_label}")
    }
}

/// Builds the remote path of one day's file.
///
/// Path format: `{base}/{room}/{box}/{year}/!{YYYY-MM-DD}`
///
/// # Example
///
/// ```
/// use boxmerge_types::day_path;
/// use chrono::NaiveDate;
///
/// let day = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
/// assert_eq!(
///     day_path("WLynch_Labs/Data Backup", "G126", "1-16", day),
///     "WLynch_Labs/Data Backup/G126/1-16/2024/!2024-03-07"
/// );
/// ```
#[must_use]
pub fn day_path(base: &str, room: &str, box_label: &str, day: NaiveDate) -> String {
    format!(
        "{}/{}/!{}",
        box_dir(base, room, box_label),
        day.year(),
        day.format(DAY_STAMP)
    )
}

/// Parses the date out of a day file name such as `!2024-03-07`.
#[must_use]
pub fn date_from_day_file(name: &str) -> Option<NaiveDate> {
    let stamp = name.strip_prefix('!')?;
    NaiveDate::parse_from_str(stamp, DAY_STAMP).ok()
}

/// Returns the merged archive file name for a unit: `{room}_{box}.txt`.
#[must_use]
pub fn output_file_name(room: &str, box_label: &str) -> String {
    format!("{room}_{box_label}.txt")
}

/// Splits a merged archive file name back into its room and box.
///
/// Returns `None` for names that do not follow `{room}_{box}.txt`.
#[must_use]
pub fn parse_output_file_name(name: &str) -> Option<(&str, &str)> {
    let stem = name.strip_suffix(".txt")?;
    stem.split_once('_')
        .filter(|(room, box_label)| !room.is_empty() && !box_label.is_empty())
}
