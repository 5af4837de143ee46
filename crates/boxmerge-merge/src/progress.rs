//! Progress aggregation across workers.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
struct Counters {
    bytes: AtomicU64,
    days: AtomicU64,
    units: AtomicU64,
}

/// Point-in-time view of a [`Progress`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressSnapshot {
    /// Payload bytes appended to archives.
    pub bytes: u64,
    /// Days processed, whatever their outcome.
    pub days: u64,
    /// Units finished, merged or failed.
    pub units: u64,
}

/// Monotonic counters shared by every worker.
///
/// Cloning shares the counters. Reports from different workers may arrive in
/// any order; only totals are meaningful.
#[derive(Debug, Clone, Default)]
pub struct Progress {
    counters: Arc<Counters>,
}

impl Progress {
    /// Creates zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `bytes` to the byte counter.
    pub fn report(&self, bytes: u64) {
        self.counters.bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Counts one processed day.
    pub fn day_done(&self) {
        self.counters.days.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts one finished unit.
    pub fn unit_done(&self) {
        self.counters.units.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the current totals.
    #[must_use]
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            bytes: self.counters.bytes.load(Ordering::Relaxed),
            days: self.counters.days.load(Ordering::Relaxed),
            units: self.counters.units.load(Ordering::Relaxed),
        }
    }
}
