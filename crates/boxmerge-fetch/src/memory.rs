//! In-memory share.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use bytes::Bytes;

use crate::{RemoteEntry, RemoteShare, ShareError, ShareStage};

#[derive(Debug, Default)]
struct State {
    files: BTreeMap<String, Bytes>,
    denied: HashSet<String>,
    fail_reads_from: HashMap<String, u64>,
    flaky_reads: HashMap<String, u32>,
    reads: HashMap<String, usize>,
    failing_stages: HashSet<ShareStage>,
    released: Vec<ShareStage>,
}

/// A share held entirely in memory.
///
/// Used for dry runs, benchmarks and tests. Faults can be injected per path
/// (refused opens, failing or flaky reads) and per release stage.
#[derive(Debug, Default)]
pub struct MemoryShare {
    state: Mutex<State>,
    open_handles: AtomicUsize,
}

/// An open file of a [`MemoryShare`].
#[derive(Debug, Clone)]
pub struct MemoryHandle {
    path: String,
    data: Bytes,
}

impl MemoryShare {
    /// Creates an empty share.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores a file at `path`, replacing any previous contents.
    pub fn insert(&self, path: impl Into<String>, data: impl Into<Bytes>) {
        self.state().files.insert(path.into(), data.into());
    }

    /// Makes opening `path` fail with a permission error.
    pub fn deny(&self, path: impl Into<String>) {
        self.state().denied.insert(path.into());
    }

    /// Makes every read of `path` at or past `offset` fail.
    pub fn fail_reads_from(&self, path: impl Into<String>, offset: u64) {
        self.state().fail_reads_from.insert(path.into(), offset);
    }

    /// Makes the next `failures` reads of `path` fail.
    pub fn flaky_reads(&self, path: impl Into<String>, failures: u32) {
        self.state().flaky_reads.insert(path.into(), failures);
    }

    /// Makes releasing `stage` fail.
    pub fn fail_release(&self, stage: ShareStage) {
        self.state().failing_stages.insert(stage);
    }

    /// Returns the stages released so far, in call order.
    #[must_use]
    pub fn released(&self) -> Vec<ShareStage> {
        self.state().released.clone()
    }

    /// Returns how many read calls were made against `path`.
    #[must_use]
    pub fn reads(&self, path: &str) -> usize {
        self.state().reads.get(path).copied().unwrap_or(0)
    }

    /// Returns the number of handles opened and not yet closed.
    #[must_use]
    pub fn open_handles(&self) -> usize {
        self.open_handles.load(Ordering::SeqCst)
    }

    /// Returns the number of stored files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state().files.len()
    }

    /// Returns true if no files are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RemoteShare for MemoryShare {
    type Handle = MemoryHandle;

    async fn open(&self, path: &str) -> Result<MemoryHandle, ShareError> {
        let state = self.state();
        if state.denied.contains(path) {
            return Err(ShareError::PermissionDenied(path.to_string()));
        }
        let data = state
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| ShareError::NotFound(path.to_string()))?;
        self.open_handles.fetch_add(1, Ordering::SeqCst);
        Ok(MemoryHandle {
            path: path.to_string(),
            data,
        })
    }

    async fn read(
        &self,
        handle: &mut MemoryHandle,
        offset: u64,
        len: usize,
    ) -> Result<Bytes, ShareError> {
        let mut state = self.state();
        *state.reads.entry(handle.path.clone()).or_default() += 1;

        if let Some(remaining) = state.flaky_reads.get_mut(&handle.path) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(ShareError::Io {
                    path: handle.path.clone(),
                    source: std::io::Error::other("injected transient read failure"),
                });
            }
        }
        if state
            .fail_reads_from
            .get(&handle.path)
            .is_some_and(|from| offset >= *from)
        {
            return Err(ShareError::Io {
                path: handle.path.clone(),
                source: std::io::Error::other("injected read failure"),
            });
        }

        let total = handle.data.len();
        let start = usize::try_from(offset).map_or(total, |o| o.min(total));
        let end = start.saturating_add(len).min(total);
        Ok(handle.data.slice(start..end))
    }

    async fn close(&self, _handle: MemoryHandle) -> Result<(), ShareError> {
        self.open_handles.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }

    async fn list(&self, path: &str) -> Result<Vec<RemoteEntry>, ShareError> {
        let prefix = path.trim_end_matches('/');
        let state = self.state();
        let mut entries: BTreeMap<String, RemoteEntry> = BTreeMap::new();

        for (file, data) in &state.files {
            let rest = if prefix.is_empty() {
                Some(file.as_str())
            } else {
                file.strip_prefix(prefix).and_then(|r| r.strip_prefix('/'))
            };
            let Some(rest) = rest else { continue };

            match rest.split_once('/') {
                Some((dir, _)) => {
                    entries
                        .entry(dir.to_string())
                        .or_insert_with(|| RemoteEntry::dir(dir));
                }
                None => {
                    entries.insert(rest.to_string(), RemoteEntry::file(rest, data.len() as u64));
                }
            }
        }

        if entries.is_empty() && !prefix.is_empty() {
            return Err(ShareError::NotFound(path.to_string()));
        }
        Ok(entries.into_values().collect())
    }

    async fn release(&self, stage: ShareStage) -> Result<(), ShareError> {
        let mut state = self.state();
        state.released.push(stage);
        if state.failing_stages.contains(&stage) {
            return Err(ShareError::Release {
                stage,
                reason: "injected release failure".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_slices() {
        let share = MemoryShare::new();
        share.insert("f", b"abcdef".to_vec());

        let mut handle = share.open("f").await.unwrap();
        assert_eq!(share.open_handles(), 1);
        assert_eq!(share.read(&mut handle, 0, 4).await.unwrap().as_ref(), b"abcd");
        assert_eq!(share.read(&mut handle, 4, 4).await.unwrap().as_ref(), b"ef");
        assert!(share.read(&mut handle, 6, 4).await.unwrap().is_empty());
        assert!(share.read(&mut handle, 600, 4).await.unwrap().is_empty());
        share.close(handle).await.unwrap();
        assert_eq!(share.open_handles(), 0);
    }

    #[tokio::test]
    async fn test_list_directories_and_files() {
        let share = MemoryShare::new();
        share.insert("base/A/1/2024/!2024-01-01", vec![0u8; 10]);
        share.insert("base/A/1/2024/!2024-01-02", vec![0u8; 5]);
        share.insert("base/A/2/2023/!2023-12-31", vec![0u8; 1]);

        let rooms = share.list("base/A").await.unwrap();
        assert_eq!(rooms, vec![RemoteEntry::dir("1"), RemoteEntry::dir("2")]);

        let days = share.list("base/A/1/2024/").await.unwrap();
        assert_eq!(
            days,
            vec![
                RemoteEntry::file("!2024-01-01", 10),
                RemoteEntry::file("!2024-01-02", 5)
            ]
        );

        assert!(share.list("base/B").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_release_records_and_fails() {
        let share = MemoryShare::new();
        share.fail_release(ShareStage::Session);

        assert!(share.release(ShareStage::Tree).await.is_ok());
        assert!(share.release(ShareStage::Session).await.is_err());
        assert_eq!(share.released(), vec![ShareStage::Tree, ShareStage::Session]);
    }
}
