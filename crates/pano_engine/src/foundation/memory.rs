//! Memory usage sampling
//!
//! Hosts that can observe their heap usage feed a [`MemoryUsage`] sample to
//! the engine; the engine uses it as a memory-pressure signal to trim the
//! resident scene cache.

/// Heap usage snapshot in megabytes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoryUsage {
    /// Megabytes currently in use
    pub used_mb: u64,
    /// Megabytes the host is allowed to use
    pub limit_mb: u64,
}

impl MemoryUsage {
    /// Create a new usage sample
    pub fn new(used_mb: u64, limit_mb: u64) -> Self {
        Self { used_mb, limit_mb }
    }

    /// Fraction of the limit in use (0.0 when the limit is unknown)
    pub fn usage_ratio(&self) -> f32 {
        if self.limit_mb == 0 {
            return 0.0;
        }
        self.used_mb as f32 / self.limit_mb as f32
    }

    /// Whether usage is above `threshold` (a ratio, e.g. 0.75)
    pub fn should_cleanup(&self, threshold: f32) -> bool {
        self.usage_ratio() > threshold
    }
}
