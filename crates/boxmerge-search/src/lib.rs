//! Identifier search over merged boxmerge archives.
//!
//! - [`search_archives`] - Finds every line containing an identifier
//! - [`CsvExporter`] - CSV export
//! - [`JsonExporter`] - JSON array export
//! - [`export_matches`] - Writes one export file per identifier

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/lynchlab/boxmerge/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod csv;
mod exporter;
mod json;
mod search;

pub use crate::csv::CsvExporter;
pub use exporter::{ExportError, ExportFormat, Exporter, export_matches};
pub use json::JsonExporter;
pub use search::{DEFAULT_OFFSETS, SearchError, SearchMatch, SearchResults, search_archives};
