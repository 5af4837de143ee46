//! JSON export.

use std::io::Write;

use crate::{ExportError, Exporter, SearchResults};

/// JSON exporter writing the matches as an array.
#[derive(Debug, Clone)]
pub struct JsonExporter {
    /// Whether to pretty-print.
    pretty: bool,
}

impl JsonExporter {
    /// Creates a new JSON exporter (pretty-printed).
    #[must_use]
    pub const fn new() -> Self {
        Self { pretty: true }
    }

    /// Sets whether to pretty-print output.
    #[must_use]
    pub const fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Default for JsonExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Exporter for JsonExporter {
    fn write_results<W: Write + Send>(
        &self,
        results: &SearchResults,
        mut writer: W,
    ) -> Result<(), ExportError> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut writer, &results.matches)?;
        } else {
            serde_json::to_writer(&mut writer, &results.matches)?;
        }
        writeln!(writer)?;
        Ok(())
    }

    fn extension(&self) -> &str {
        "json"
    }
}
