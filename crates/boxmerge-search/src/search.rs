//! Line scan of merged archives.

use std::path::{Path, PathBuf};

use boxmerge_types::parse_output_file_name;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Relative line offsets collected around a match when none are given:
/// two lines before and three lines after.
pub const DEFAULT_OFFSETS: [isize; 2] = [-2, 3];

/// Errors that can occur while searching.
#[derive(Error, Debug)]
pub enum SearchError {
    /// The search root is not a readable directory.
    #[error("Cannot search {path}: {source}")]
    Root {
        /// Directory that was searched.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The identifier is empty.
    #[error("Search identifier must not be empty")]
    EmptyIdentifier,
}

/// One line containing the identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchMatch {
    /// Room parsed from the archive name, if it follows `<room>_<box>.txt`.
    pub room: Option<String>,
    /// Box parsed from the archive name.
    #[serde(rename = "box")]
    pub box_label: Option<String>,
    /// Archive the match was found in.
    pub file: PathBuf,
    /// 1-based line number of the matching line.
    pub line: usize,
    /// Trimmed lines at the requested offsets that exist in the file.
    pub context: Vec<String>,
}

/// All matches for one identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResults {
    /// The identifier searched for.
    pub identifier: String,
    /// Matches in file path order, then line order.
    pub matches: Vec<SearchMatch>,
}

impl SearchResults {
    /// Returns true when the identifier was not found anywhere.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Returns the number of matching lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// Returns the largest context length of any match.
    #[must_use]
    pub fn max_context(&self) -> usize {
        self.matches.iter().map(|m| m.context.len()).max().unwrap_or(0)
    }
}

/// Searches every file below `dir` for lines containing `identifier`.
///
/// Files are visited in sorted path order. Files that cannot be read or are
/// not valid UTF-8 are skipped.
///
/// # Errors
///
/// Returns an error if `dir` is not a readable directory or the identifier
/// is empty.
pub fn search_archives(
    dir: &Path,
    identifier: &str,
    offsets: &[isize],
) -> Result<SearchResults, SearchError> {
    if identifier.is_empty() {
        return Err(SearchError::EmptyIdentifier);
    }
    std::fs::read_dir(dir)
        .map(drop)
        .map_err(|source| SearchError::Root {
            path: dir.to_path_buf(),
            source,
        })?;

    let mut matches = Vec::new();
    let mut files = 0usize;

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                debug!(file = %path.display(), error = %e, "skipping file");
                continue;
            }
        };
        files += 1;

        let (room, box_label) = parse_archive_name(path);
        let lines: Vec<&str> = content.lines().collect();

        for (index, line) in lines.iter().enumerate() {
            if !line.contains(identifier) {
                continue;
            }
            let context = offsets
                .iter()
                .filter_map(|offset| index.checked_add_signed(*offset))
                .filter_map(|target| lines.get(target))
                .map(|l| l.trim().to_string())
                .collect();

            matches.push(SearchMatch {
                room: room.clone(),
                box_label: box_label.clone(),
                file: path.to_path_buf(),
                line: index + 1,
                context,
            });
        }
    }

    info!(identifier, files, matches = matches.len(), "search complete");

    Ok(SearchResults {
        identifier: identifier.to_string(),
        matches,
    })
}

/// Parses room and box from an archive's file name.
fn parse_archive_name(path: &Path) -> (Option<String>, Option<String>) {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(parse_output_file_name)
        .map_or((None, None), |(room, box_label)| {
            (Some(room.to_string()), Some(box_label.to_string()))
        })
}
