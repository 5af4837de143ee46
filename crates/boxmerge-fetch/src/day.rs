//! Chunked fetching of a single day file.

use boxmerge_types::ChunkSize;
use bytes::{Bytes, BytesMut};
use tracing::debug;

use crate::{RemoteShare, ShareError};

/// How many times a share operation is attempted before giving up.
///
/// There is no backoff between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    attempts: u32,
}

impl RetryPolicy {
    /// Single attempt, no retries.
    pub const NONE: Self = Self { attempts: 1 };

    /// Creates a policy with the given number of attempts (at least one).
    #[must_use]
    pub fn attempts(attempts: u32) -> Self {
        Self {
            attempts: attempts.max(1),
        }
    }

    /// Returns the number of attempts.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::NONE
    }
}

/// Configuration for fetching day files.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchConfig {
    /// Bytes requested per read call.
    pub chunk_size: ChunkSize,
    /// Attempts per open and per read call.
    pub retry: RetryPolicy,
}

/// Outcome of fetching one day's file.
#[derive(Debug)]
pub enum DayFetch {
    /// The complete, non-empty file contents.
    Data(Bytes),
    /// The file exists but holds no data.
    Empty,
    /// There is no file for this day.
    Missing,
    /// The file could not be opened or read to the end. Partial data is
    /// discarded.
    Unreadable(ShareError),
}

impl DayFetch {
    /// Returns true if nothing could be fetched for this day.
    ///
    /// Missing and unreadable days are skipped the same way.
    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        matches!(self, Self::Missing | Self::Unreadable(_))
    }

    /// Returns the number of payload bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Data(bytes) => bytes.len(),
            _ => 0,
        }
    }

    /// Returns true if there is no payload.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Fetches one day file by chunked sequential reads.
///
/// Chunks are concatenated until a read returns fewer bytes than requested.
/// Any failure after the open discards what was read so far; the handle is
/// always closed once opened.
pub async fn fetch_day<S>(share: &S, path: &str, config: &FetchConfig) -> DayFetch
where
    S: RemoteShare + ?Sized,
{
    let mut handle = match open_with_retry(share, path, config.retry).await {
        Ok(handle) => handle,
        Err(e) if e.is_not_found() => return DayFetch::Missing,
        Err(e) => {
            debug!(path, error = %e, "day file could not be opened");
            return DayFetch::Unreadable(e);
        }
    };

    let result = read_to_end(share, &mut handle, path, config).await;

    if let Err(e) = share.close(handle).await {
        debug!(path, error = %e, "failed to close day file");
    }

    match result {
        Ok(bytes) if bytes.is_empty() => DayFetch::Empty,
        Ok(bytes) => DayFetch::Data(bytes),
        Err(e) => {
            debug!(path, error = %e, "day file read failed, discarding partial data");
            DayFetch::Unreadable(e)
        }
    }
}

async fn open_with_retry<S>(
    share: &S,
    path: &str,
    retry: RetryPolicy,
) -> Result<S::Handle, ShareError>
where
    S: RemoteShare + ?Sized,
{
    let mut attempt = 1;
    loop {
        match share.open(path).await {
            Ok(handle) => return Ok(handle),
            Err(e) if e.is_not_found() => return Err(e),
            Err(e) if attempt < retry.max_attempts() => {
                debug!(path, attempt, error = %e, "retrying open");
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

async fn read_to_end<S>(
    share: &S,
    handle: &mut S::Handle,
    path: &str,
    config: &FetchConfig,
) -> Result<Bytes, ShareError>
where
    S: RemoteShare + ?Sized,
{
    let chunk_size = config.chunk_size.get();
    let mut data = BytesMut::new();
    let mut offset = 0u64;

    loop {
        let chunk = read_with_retry(share, handle, path, offset, chunk_size, config.retry).await?;
        let read = chunk.len();
        data.extend_from_slice(&chunk);
        offset += read as u64;

        if read < chunk_size {
            return Ok(data.freeze());
        }
    }
}

async fn read_with_retry<S>(
    share: &S,
    handle: &mut S::Handle,
    path: &str,
    offset: u64,
    len: usize,
    retry: RetryPolicy,
) -> Result<Bytes, ShareError>
where
    S: RemoteShare + ?Sized,
{
    let mut attempt = 1;
    loop {
        match share.read(handle, offset, len).await {
            Ok(chunk) => return Ok(chunk),
            Err(e) if attempt < retry.max_attempts() => {
                debug!(path, offset, attempt, error = %e, "retrying read");
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryShare;

    fn config(chunk: usize, attempts: u32) -> FetchConfig {
        FetchConfig {
            chunk_size: ChunkSize::clamp(chunk, ChunkSize::DEFAULT_MAX),
            retry: RetryPolicy::attempts(attempts),
        }
    }

    #[tokio::test]
    async fn test_fetch_multi_chunk_file() {
        let share = MemoryShare::new();
        let payload: Vec<u8> = (0..5000u32).map(|i| (i % 251) as u8).collect();
        share.insert("a/day", payload.clone());

        let fetched = fetch_day(&share, "a/day", &config(1024, 1)).await;

        match fetched {
            DayFetch::Data(bytes) => assert_eq!(bytes.as_ref(), payload.as_slice()),
            other => panic!("unexpected outcome: {other:?}"),
        }
        // 4 full chunks plus one short chunk
        assert_eq!(share.reads("a/day"), 5);
        assert_eq!(share.open_handles(), 0);
    }

    #[tokio::test]
    async fn test_exact_multiple_needs_trailing_empty_read() {
        let share = MemoryShare::new();
        share.insert("a/day", vec![7u8; 2048]);

        let fetched = fetch_day(&share, "a/day", &config(1024, 1)).await;

        assert_eq!(fetched.len(), 2048);
        assert_eq!(share.reads("a/day"), 3);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let share = MemoryShare::new();
        let fetched = fetch_day(&share, "nope", &FetchConfig::default()).await;
        assert!(matches!(fetched, DayFetch::Missing));
        assert!(fetched.is_skipped());
    }

    #[tokio::test]
    async fn test_empty_file() {
        let share = MemoryShare::new();
        share.insert("a/day", Vec::new());
        let fetched = fetch_day(&share, "a/day", &FetchConfig::default()).await;
        assert!(matches!(fetched, DayFetch::Empty));
        assert!(!fetched.is_skipped());
    }

    #[tokio::test]
    async fn test_permission_denied_is_unreadable() {
        let share = MemoryShare::new();
        share.insert("a/day", b"secret".to_vec());
        share.deny("a/day");

        let fetched = fetch_day(&share, "a/day", &FetchConfig::default()).await;
        assert!(matches!(
            fetched,
            DayFetch::Unreadable(ShareError::PermissionDenied(_))
        ));
    }

    #[tokio::test]
    async fn test_mid_read_failure_discards_partial_data() {
        let share = MemoryShare::new();
        share.insert("a/day", vec![1u8; 4096]);
        share.fail_reads_from("a/day", 1024);

        let fetched = fetch_day(&share, "a/day", &config(1024, 1)).await;

        assert!(matches!(fetched, DayFetch::Unreadable(_)));
        assert_eq!(fetched.len(), 0);
        assert_eq!(share.open_handles(), 0);
    }

    #[tokio::test]
    async fn test_retry_policy_recovers_flaky_reads() {
        let share = MemoryShare::new();
        share.insert("a/day", b"hello".to_vec());
        share.flaky_reads("a/day", 2);

        let single = fetch_day(&share, "a/day", &config(1024, 1)).await;
        assert!(matches!(single, DayFetch::Unreadable(_)));

        share.flaky_reads("a/day", 2);
        let retried = fetch_day(&share, "a/day", &config(1024, 3)).await;
        assert_eq!(retried.len(), 5);
    }

    #[test]
    fn test_retry_policy_minimum() {
        assert_eq!(RetryPolicy::attempts(0).max_attempts(), 1);
        assert_eq!(RetryPolicy::default(), RetryPolicy::NONE);
    }
}
