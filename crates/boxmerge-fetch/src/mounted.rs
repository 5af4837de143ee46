//! A share mounted into the local filesystem.

use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::debug;

use crate::{RemoteEntry, RemoteShare, ShareError, ShareStage};

/// Address of a network share, e.g. `\\server\share`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareTarget {
    /// Server host name.
    pub server: String,
    /// Share name on the server.
    pub share: String,
}

impl ShareTarget {
    /// Creates a new share target.
    #[must_use]
    pub fn new(server: impl Into<String>, share: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            share: share.into(),
        }
    }
}

impl std::fmt::Display for ShareTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, r"\\{}\{}", self.server, self.share)
    }
}

/// Share credentials. Held in memory only; the password is never printed.
#[derive(Clone)]
pub struct Credentials {
    /// User name.
    pub username: String,
    password: String,
}

impl Credentials {
    /// Creates credentials.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns the password.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A network share reached through a local mount point.
///
/// Authentication is performed by the operating system when the share is
/// mounted; credentials passed to [`MountedShare::connect`] only identify
/// the user in logs. Releasing the tree stage closes the share to new opens.
#[derive(Debug)]
pub struct MountedShare {
    root: PathBuf,
    target: Option<ShareTarget>,
    closed: AtomicBool,
}

impl MountedShare {
    /// Connects to the share mounted at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`ShareError::ShareRoot`] if `root` is not a readable directory.
    pub async fn connect(
        root: impl Into<PathBuf>,
        target: Option<ShareTarget>,
        credentials: Option<&Credentials>,
    ) -> Result<Self, ShareError> {
        let root = root.into();
        let share_root_error = |reason: String| ShareError::ShareRoot {
            root: root.display().to_string(),
            reason,
        };

        let metadata = tokio::fs::metadata(&root)
            .await
            .map_err(|e| share_root_error(e.to_string()))?;
        if !metadata.is_dir() {
            return Err(share_root_error("not a directory".to_string()));
        }
        // the root must be listable, not just present
        tokio::fs::read_dir(&root)
            .await
            .map(drop)
            .map_err(|e| share_root_error(e.to_string()))?;

        debug!(
            root = %root.display(),
            target = ?target.as_ref().map(ToString::to_string),
            user = credentials.map(|c| c.username.as_str()),
            "connected to mounted share"
        );

        Ok(Self {
            root,
            target,
            closed: AtomicBool::new(false),
        })
    }

    /// Returns the local mount point.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the share address, if known.
    #[must_use]
    pub const fn target(&self) -> Option<&ShareTarget> {
        self.target.as_ref()
    }

    /// Maps a `/`-separated share path onto the mount point.
    fn resolve(&self, path: &str) -> Result<PathBuf, ShareError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(ShareError::Closed);
        }
        let mut resolved = self.root.clone();
        for part in path.split('/').filter(|p| !p.is_empty()) {
            let mut components = Path::new(part).components();
            match (components.next(), components.next()) {
                (Some(Component::Normal(c)), None) => resolved.push(c),
                _ => return Err(ShareError::InvalidPath(path.to_string())),
            }
        }
        Ok(resolved)
    }
}

#[async_trait]
impl RemoteShare for MountedShare {
    type Handle = File;

    async fn open(&self, path: &str) -> Result<File, ShareError> {
        let local = self.resolve(path)?;
        File::open(&local)
            .await
            .map_err(|e| ShareError::from_io(path, e))
    }

    async fn read(&self, handle: &mut File, offset: u64, len: usize) -> Result<Bytes, ShareError> {
        let io_error = |source| ShareError::Io {
            path: "<open file>".to_string(),
            source,
        };

        handle
            .seek(std::io::SeekFrom::Start(offset))
            .await
            .map_err(io_error)?;

        let mut buf = BytesMut::zeroed(len);
        let mut filled = 0;
        while filled < len {
            let n = handle.read(&mut buf[filled..]).await.map_err(io_error)?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        buf.truncate(filled);
        Ok(buf.freeze())
    }

    async fn close(&self, handle: File) -> Result<(), ShareError> {
        drop(handle);
        Ok(())
    }

    async fn list(&self, path: &str) -> Result<Vec<RemoteEntry>, ShareError> {
        let local = self.resolve(path)?;
        let mut dir = tokio::fs::read_dir(&local)
            .await
            .map_err(|e| ShareError::from_io(path, e))?;

        let mut entries = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| ShareError::from_io(path, e))?
        {
            let metadata = entry
                .metadata()
                .await
                .map_err(|e| ShareError::from_io(path, e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            entries.push(if metadata.is_dir() {
                RemoteEntry::dir(name)
            } else {
                RemoteEntry::file(name, metadata.len())
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn release(&self, stage: ShareStage) -> Result<(), ShareError> {
        if stage == ShareStage::Tree {
            self.closed.store(true, Ordering::Release);
        }
        debug!(%stage, root = %self.root.display(), "released mounted share stage");
        Ok(())
    }
}
