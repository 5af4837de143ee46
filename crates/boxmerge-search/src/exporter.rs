//! Export of search results.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::{CsvExporter, JsonExporter, SearchResults};

/// Export file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExportFormat {
    /// CSV with a header row.
    #[default]
    Csv,
    /// Pretty-printed JSON array.
    Json,
}

impl ExportFormat {
    /// Returns the file extension for this format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    /// Returns all available formats.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Csv, Self::Json]
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(ExportError::UnknownFormat(s.to_string())),
        }
    }
}

/// Errors that can occur during export.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Unknown export format.
    #[error("Unknown format: {0}")]
    UnknownFormat(String),

    /// The identifier cannot be used as a file name.
    #[error("Identifier {0:?} cannot be used as a file name")]
    InvalidIdentifier(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Trait for search result exporters.
pub trait Exporter: Send + Sync {
    /// Writes the matches of one identifier to the output.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_results<W: Write + Send>(
        &self,
        results: &SearchResults,
        writer: W,
    ) -> Result<(), ExportError>;

    /// Returns the file extension for this format.
    fn extension(&self) -> &str;
}

/// Writes `results` to `<out_dir>/<identifier>.<ext>` and returns the path.
///
/// The output directory is created if needed and an existing export for the
/// same identifier is replaced.
///
/// # Errors
///
/// Returns an error if the identifier is not a valid file name or writing
/// fails.
pub fn export_matches(
    results: &SearchResults,
    out_dir: &Path,
    format: ExportFormat,
) -> Result<PathBuf, ExportError> {
    let identifier = results.identifier.as_str();
    if identifier.is_empty()
        || identifier == "."
        || identifier == ".."
        || identifier.contains(['/', '\\'])
    {
        return Err(ExportError::InvalidIdentifier(identifier.to_string()));
    }

    std::fs::create_dir_all(out_dir)?;
    let path = out_dir.join(format!("{identifier}.{}", format.extension()));
    let mut writer = BufWriter::new(File::create(&path)?);

    match format {
        ExportFormat::Csv => CsvExporter::new().write_results(results, &mut writer)?,
        ExportFormat::Json => JsonExporter::new().write_results(results, &mut writer)?,
    }
    writer.flush()?;

    info!(identifier, path = %path.display(), matches = results.len(), "exported matches");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SearchMatch;
    use tempfile::TempDir;

    fn results(identifier: &str) -> SearchResults {
        SearchResults {
            identifier: identifier.to_string(),
            matches: vec![SearchMatch {
                room: Some("G126".to_string()),
                box_label: Some("1-16".to_string()),
                file: PathBuf::from("Results/G126_1-16.txt"),
                line: 4,
                context: vec!["before".to_string(), "after".to_string()],
            }],
        }
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert!("parquet".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_export_writes_one_file_per_identifier() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("matches");

        let csv = export_matches(&results("M1"), &out, ExportFormat::Csv).unwrap();
        let json = export_matches(&results("M2"), &out, ExportFormat::Json).unwrap();

        assert_eq!(csv, out.join("M1.csv"));
        assert_eq!(json, out.join("M2.json"));
        let written = std::fs::read_to_string(csv).unwrap();
        assert!(written.starts_with("room,box,file,line,context_1,context_2\n"));
        assert!(written.contains("G126,1-16,Results/G126_1-16.txt,4,before,after"));
    }

    #[test]
    fn test_export_rejects_path_like_identifiers() {
        let dir = TempDir::new().unwrap();
        for bad in ["", "..", "a/b", "a\\b"] {
            let err = export_matches(&results(bad), dir.path(), ExportFormat::Json).unwrap_err();
            assert!(matches!(err, ExportError::InvalidIdentifier(_)));
        }
    }
}
