//! CSV export.

use std::borrow::Cow;
use std::io::Write;

use crate::{ExportError, Exporter, SearchResults};

/// CSV exporter.
///
/// Writes `room,box,file,line,context_1..context_n`, where `n` is the largest
/// context length of any match. Shorter rows are padded with empty fields.
#[derive(Debug, Clone)]
pub struct CsvExporter {
    /// Field delimiter (default: comma).
    delimiter: char,
    /// Whether to include header row.
    include_header: bool,
}

impl CsvExporter {
    /// Creates a new CSV exporter with default settings.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            delimiter: ',',
            include_header: true,
        }
    }

    /// Sets the field delimiter.
    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets whether to include a header row.
    #[must_use]
    pub const fn with_header(mut self, include: bool) -> Self {
        self.include_header = include;
        self
    }

    /// Quotes a field when it contains the delimiter, a quote or a line break.
    fn field<'a>(&self, value: &'a str) -> Cow<'a, str> {
        if value.contains([self.delimiter, '"', '\n', '\r']) {
            Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
        } else {
            Cow::Borrowed(value)
        }
    }
}

impl Default for CsvExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Exporter for CsvExporter {
    fn write_results<W: Write + Send>(
        &self,
        results: &SearchResults,
        mut writer: W,
    ) -> Result<(), ExportError> {
        let d = self.delimiter;
        let columns = results.max_context();

        if self.include_header {
            write!(writer, "room{d}box{d}file{d}line")?;
            for i in 1..=columns {
                write!(writer, "{d}context_{i}")?;
            }
            writeln!(writer)?;
        }

        for found in &results.matches {
            let file = found.file.to_string_lossy();
            write!(
                writer,
                "{}{d}{}{d}{}{d}{}",
                self.field(found.room.as_deref().unwrap_or_default()),
                self.field(found.box_label.as_deref().unwrap_or_default()),
                self.field(&file),
                found.line
            )?;
            for i in 0..columns {
                let value = found.context.get(i).map_or("", String::as_str);
                write!(writer, "{d}{}", self.field(value))?;
            }
            writeln!(writer)?;
        }

        Ok(())
    }

    fn extension(&self) -> &str {
        "csv"
    }
}
