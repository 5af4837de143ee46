//! Archive output files.

use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::MergeError;

/// Deletes `dir` with everything in it, then recreates it empty.
///
/// # Errors
///
/// Returns [`MergeError::OutputDir`] if the directory cannot be removed or
/// created.
pub async fn reset_output_dir(dir: &Path) -> Result<(), MergeError> {
    let output_dir_error = |source| MergeError::OutputDir {
        path: dir.to_path_buf(),
        source,
    };

    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => info!(dir = %dir.display(), "cleared previous output"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(output_dir_error(e)),
    }
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(output_dir_error)
}

/// Append-only archive of one merge unit.
///
/// Created fresh (truncated) before the unit's first day and owned by the
/// worker merging that unit until [`OutputSink::close`].
#[derive(Debug)]
pub struct OutputSink {
    path: PathBuf,
    file: File,
    written: u64,
}

impl OutputSink {
    /// Creates or truncates the archive at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::Sink`] if the file cannot be created.
    pub async fn create(path: impl Into<PathBuf>) -> Result<Self, MergeError> {
        let path = path.into();
        match File::create(&path).await {
            Ok(file) => Ok(Self {
                path,
                file,
                written: 0,
            }),
            Err(source) => Err(MergeError::Sink { path, source }),
        }
    }

    /// Appends `data` to the archive.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::Sink`] if the write fails.
    pub async fn append(&mut self, data: &[u8]) -> Result<(), MergeError> {
        match self.file.write_all(data).await {
            Ok(()) => {
                self.written += data.len() as u64;
                Ok(())
            }
            Err(source) => Err(self.error(source)),
        }
    }

    /// Returns the number of bytes appended so far.
    #[must_use]
    pub const fn written(&self) -> u64 {
        self.written
    }

    /// Returns the archive path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flushes and closes the archive, returning the bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::Sink`] if flushing fails.
    pub async fn close(mut self) -> Result<u64, MergeError> {
        if let Err(source) = self.file.flush().await {
            return Err(self.error(source));
        }
        if let Err(source) = self.file.sync_all().await {
            return Err(self.error(source));
        }
        Ok(self.written)
    }

    fn error(&self, source: std::io::Error) -> MergeError {
        MergeError::Sink {
            path: self.path.clone(),
            source,
        }
    }
}
