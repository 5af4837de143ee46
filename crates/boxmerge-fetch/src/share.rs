//! The remote share interface consumed by the merge pipeline.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Connection layers of a share, released in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShareStage {
    /// The tree (share) handle.
    Tree,
    /// The authenticated session.
    Session,
    /// The transport connection.
    Connection,
}

impl ShareStage {
    /// All stages in teardown order.
    pub const TEARDOWN_ORDER: [Self; 3] = [Self::Tree, Self::Session, Self::Connection];

    /// Returns the stage as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Tree => "tree",
            Self::Session => "session",
            Self::Connection => "connection",
        }
    }
}

impl std::fmt::Display for ShareStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry of a remote directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    /// File or directory name, without the parent path.
    pub name: String,
    /// Size in bytes (zero for directories).
    pub size: u64,
    /// Whether the entry is a directory.
    pub is_dir: bool,
}

impl RemoteEntry {
    /// Creates a file entry.
    #[must_use]
    pub fn file(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            is_dir: false,
        }
    }

    /// Creates a directory entry.
    #[must_use]
    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size: 0,
            is_dir: true,
        }
    }
}

/// Errors reported by a remote share.
#[derive(Error, Debug)]
pub enum ShareError {
    /// The path does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Access to the path was refused.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// An I/O error while opening, reading or listing a path.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// The remote path.
        path: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The share root could not be reached.
    #[error("Unable to access share root {root}: {reason}")]
    ShareRoot {
        /// The share root that was requested.
        root: String,
        /// Why it could not be used.
        reason: String,
    },

    /// The path escapes the share root.
    #[error("Invalid remote path: {0}")]
    InvalidPath(String),

    /// The share has already been released.
    #[error("Share is closed")]
    Closed,

    /// Releasing a connection layer failed.
    #[error("Failed to release {stage}: {reason}")]
    Release {
        /// The layer being released.
        stage: ShareStage,
        /// Why the release failed.
        reason: String,
    },
}

impl ShareError {
    /// Classifies an I/O error against a remote path.
    #[must_use]
    pub fn from_io(path: &str, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_string()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_string()),
            _ => Self::Io {
                path: path.to_string(),
                source,
            },
        }
    }

    /// Returns true if the error means the path does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// A network file share as seen by the merge pipeline.
///
/// One share value is shared by every worker, so implementations must allow
/// independent handles to be opened and read concurrently. Every operation is
/// fallible and none is retried underneath; retry policy lives in
/// [`crate::fetch_day`].
#[async_trait]
pub trait RemoteShare: Send + Sync {
    /// An open file on the share.
    type Handle: Send;

    /// Opens a file for reading. Paths are `/`-separated and relative to the
    /// share root; matching is exact.
    async fn open(&self, path: &str) -> Result<Self::Handle, ShareError>;

    /// Reads up to `len` bytes at `offset`. A short or empty result means
    /// there is no more data.
    async fn read(
        &self,
        handle: &mut Self::Handle,
        offset: u64,
        len: usize,
    ) -> Result<Bytes, ShareError>;

    /// Closes a handle.
    async fn close(&self, handle: Self::Handle) -> Result<(), ShareError>;

    /// Lists a directory.
    async fn list(&self, path: &str) -> Result<Vec<RemoteEntry>, ShareError>;

    /// Releases one connection layer. Called once per stage, in
    /// [`ShareStage::TEARDOWN_ORDER`].
    async fn release(&self, _stage: ShareStage) -> Result<(), ShareError> {
        Ok(())
    }
}
