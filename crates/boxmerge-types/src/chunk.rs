//! Read chunk sizing.

/// Read chunk size in bytes, clamped to `[MIN, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkSize(usize);

impl ChunkSize {
    /// Smallest chunk a read may request (1 KiB).
    pub const MIN: usize = 1024;

    /// Default chunk size (16 KiB).
    pub const DEFAULT: Self = Self(16 * 1024);

    /// Default upper bound (1 MiB).
    pub const DEFAULT_MAX: usize = 1024 * 1024;

    /// Clamps a requested size into `[MIN, max]`.
    ///
    /// A `max` below [`Self::MIN`] is raised to it.
    #[must_use]
    pub fn clamp(requested: usize, max: usize) -> Self {
        let max = max.max(Self::MIN);
        Self(requested.clamp(Self::MIN, max))
    }

    /// Clamps a size given in KiB, as accepted on the command line.
    #[must_use]
    pub fn from_kib(requested_kib: usize, max_kib: usize) -> Self {
        Self::clamp(
            requested_kib.saturating_mul(1024),
            max_kib.saturating_mul(1024),
        )
    }

    /// Returns the size in bytes.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }
}

impl Default for ChunkSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl std::fmt::Display for ChunkSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} bytes", self.0)
    }
}
