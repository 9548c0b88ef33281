//! Tier composition.
//!
//! One object owning every tier, the expiry scheduler, and the push
//! queue. Constructed once at process startup with its collaborators
//! injected and passed explicitly to whatever serves requests; the
//! crate keeps no ambient globals.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::HeaderMap;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::config::CacheConfig;
use crate::disk::{DiskTier, PathScheme};
use crate::error::CacheError;
use crate::expire::ExpiryScheduler;
use crate::memory::MemoryTier;
use crate::push::PushQueue;
use crate::remote::{BlobStore, KeyScheme, RemoteTier};
use crate::telemetry;

/// Which tier satisfied a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheResult {
    Memory,
    Disk,
    Remote,
    Miss,
}

impl CacheResult {
    /// Stable label for the cache-result response header.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Disk => "disk",
            Self::Remote => "remote",
            Self::Miss => "miss",
        }
    }
}

/// The tiered response cache.
pub struct TieredCache {
    memory: MemoryTier,
    disk: DiskTier,
    remote: RemoteTier,
    push: PushQueue,
    push_worker: JoinHandle<()>,
}

impl TieredCache {
    /// Build the cache from its injected collaborators.
    ///
    /// `handle` is the runtime that carries expiry timers and the push
    /// worker.
    pub fn new(
        config: &CacheConfig,
        paths: Arc<dyn PathScheme>,
        keys: Arc<dyn KeyScheme>,
        blobs: Arc<dyn BlobStore>,
        handle: Handle,
    ) -> Self {
        telemetry::describe_metrics();

        let expire = ExpiryScheduler::new(handle.clone());
        let (push, push_worker) = PushQueue::spawn(&handle, config.push_queue_depth_non_zero());

        Self {
            memory: MemoryTier::new(config, expire),
            disk: DiskTier::new(paths),
            remote: RemoteTier::new(blobs, keys, config.push_timeout()),
            push,
            push_worker,
        }
    }

    /// The volatile in-process tier.
    pub fn memory(&self) -> &MemoryTier {
        &self.memory
    }

    /// The durable same-host tier.
    pub fn disk(&self) -> &DiskTier {
        &self.disk
    }

    /// The durable shared tier.
    pub fn remote(&self) -> &RemoteTier {
        &self.remote
    }

    /// Consult memory, then disk, then remote for `fingerprint`.
    ///
    /// A corrupt object in one tier counts as a miss of that tier, and
    /// so does an I/O failure: a degraded cache never takes the proxy
    /// down with it. `NotFound` is returned only when every tier
    /// missed.
    pub async fn lookup(
        &self,
        fingerprint: &str,
    ) -> Result<(Bytes, HeaderMap, CacheResult), CacheError> {
        match self.memory.load(fingerprint) {
            Ok((body, headers)) => return Ok((body, headers, CacheResult::Memory)),
            Err(err) => log_skipped_tier("memory", fingerprint, &err),
        }

        match self.disk.load(fingerprint) {
            Ok((body, headers)) => return Ok((body, headers, CacheResult::Disk)),
            Err(err) => log_skipped_tier("disk", fingerprint, &err),
        }

        match self.remote.load(fingerprint).await {
            Ok((body, headers)) => Ok((body, headers, CacheResult::Remote)),
            Err(err) => {
                log_skipped_tier("remote", fingerprint, &err);
                Err(CacheError::NotFound)
            }
        }
    }

    /// Populate the memory tier; the entry expires after `max_age`.
    pub fn store_memory(
        &self,
        fingerprint: &str,
        max_age: Duration,
        headers: &HeaderMap,
        body: Bytes,
    ) {
        self.memory.store(fingerprint, max_age, headers, body);
    }

    /// Populate the disk tier. Failures propagate for the caller to
    /// treat as best-effort or fatal.
    pub fn store_disk(
        &self,
        fingerprint: &str,
        headers: &HeaderMap,
        body: &[u8],
    ) -> Result<(), CacheError> {
        self.disk.store(fingerprint, headers, body)
    }

    /// Populate the remote tier, fire-and-forget.
    ///
    /// Encodes now and hands the network write to the push worker.
    /// Returns false when the push queue dropped the write.
    pub fn store_remote(&self, fingerprint: &str, headers: &HeaderMap, body: &[u8]) -> bool {
        self.push.enqueue(self.remote.store(fingerprint, headers, body))
    }

    /// Close the push queue and wait for queued pushes to drain.
    pub async fn shutdown(self) {
        drop(self.push);
        if let Err(err) = self.push_worker.await {
            warn!(error = %err, "push worker terminated abnormally");
        }
    }
}

fn log_skipped_tier(tier: &'static str, fingerprint: &str, err: &CacheError) {
    if err.is_miss() {
        tracing::debug!(tier, fingerprint, "cache miss");
    } else {
        warn!(tier, fingerprint, error = %err, "cache tier failed, treating as miss");
    }
}
