//! Cache configuration.
//!
//! Bounds for the memory tier and the remote push queue, plus the hard
//! deadline applied to each remote push.

use std::num::NonZeroUsize;
use std::time::Duration;

use serde::Deserialize;

// Default values for cache configuration
const DEFAULT_MEMORY_ENTRY_LIMIT: usize = 4096;
const DEFAULT_MEMORY_WEIGHT_LIMIT_BYTES: usize = 256 * 1024 * 1024;
const DEFAULT_PUSH_TIMEOUT_SECS: u64 = 60;
const DEFAULT_PUSH_QUEUE_DEPTH: usize = 256;

/// Cache configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum entries in the memory tier.
    pub memory_entry_limit: usize,
    /// Maximum total body bytes held by the memory tier.
    pub memory_weight_limit_bytes: usize,
    /// Hard deadline for a single remote push, in seconds.
    pub push_timeout_secs: u64,
    /// Maximum remote pushes waiting in the queue. When the queue is
    /// full, new pushes are dropped rather than blocking the caller.
    pub push_queue_depth: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            memory_entry_limit: DEFAULT_MEMORY_ENTRY_LIMIT,
            memory_weight_limit_bytes: DEFAULT_MEMORY_WEIGHT_LIMIT_BYTES,
            push_timeout_secs: DEFAULT_PUSH_TIMEOUT_SECS,
            push_queue_depth: DEFAULT_PUSH_QUEUE_DEPTH,
        }
    }
}

impl CacheConfig {
    /// Returns the memory entry limit as NonZeroUsize, clamping to 1 if zero.
    pub fn memory_entry_limit_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.memory_entry_limit).unwrap_or(NonZeroUsize::MIN)
    }

    /// Returns the push queue depth, clamping to 1 if zero.
    pub fn push_queue_depth_non_zero(&self) -> usize {
        self.push_queue_depth.max(1)
    }

    /// Returns the remote push deadline as a `Duration`.
    pub fn push_timeout(&self) -> Duration {
        Duration::from_secs(self.push_timeout_secs)
    }
}
