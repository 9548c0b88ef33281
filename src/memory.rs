//! In-process memory tier.
//!
//! Bounded LRU store of trimmed headers plus body, keyed by content
//! fingerprint. Entries self-expire through the [`ExpiryScheduler`];
//! capacity is bounded both by entry count and by total body bytes.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use http::HeaderMap;
use lru::LruCache;
use metrics::counter;
use tracing::debug;

use crate::config::CacheConfig;
use crate::error::CacheError;
use crate::expire::ExpiryScheduler;
use crate::lock::mutex_lock;
use crate::object::trim_headers;
use crate::telemetry::{METRIC_MEMORY_EVICT, METRIC_MEMORY_HIT, METRIC_MEMORY_MISS};

const SOURCE: &str = "memory";

#[derive(Clone)]
struct MemoryEntry {
    headers: HeaderMap,
    body: Bytes,
}

struct MemoryInner {
    entries: LruCache<String, MemoryEntry>,
    // Total body bytes currently held. Headers are not counted.
    weight: usize,
}

/// Volatile in-process cache tier.
///
/// Safe for concurrent `load`/`store`/`remove`; all locking is
/// internal. Expiration actions scheduled by `store` remove by key and
/// are idempotent, so a stale timer firing after an overwrite finds
/// nothing surprising to do.
pub struct MemoryTier {
    inner: Arc<Mutex<MemoryInner>>,
    weight_limit: usize,
    expire: ExpiryScheduler,
}

impl MemoryTier {
    /// Create a memory tier bounded by the configured entry and weight
    /// limits, expiring entries through `expire`.
    pub fn new(config: &CacheConfig, expire: ExpiryScheduler) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MemoryInner {
                entries: LruCache::new(config.memory_entry_limit_non_zero()),
                weight: 0,
            })),
            weight_limit: config.memory_weight_limit_bytes,
            expire,
        }
    }

    /// Read the entry for `fingerprint`, refreshing its recency.
    pub fn load(&self, fingerprint: &str) -> Result<(Bytes, HeaderMap), CacheError> {
        let mut inner = mutex_lock(&self.inner, SOURCE, "load");
        match inner.entries.get(fingerprint) {
            Some(entry) => {
                counter!(METRIC_MEMORY_HIT).increment(1);
                Ok((entry.body.clone(), entry.headers.clone()))
            }
            None => {
                counter!(METRIC_MEMORY_MISS).increment(1);
                Err(CacheError::NotFound)
            }
        }
    }

    /// Insert or overwrite the entry for `fingerprint` and schedule its
    /// removal after `max_age`.
    ///
    /// Headers are trimmed to the retained subset before storage. An
    /// earlier timer for the same key is not cancelled; its removal is
    /// a harmless no-op when the key is already gone.
    pub fn store(&self, fingerprint: &str, max_age: Duration, headers: &HeaderMap, body: Bytes) {
        let entry = MemoryEntry {
            headers: trim_headers(headers),
            body,
        };
        let weight = entry.body.len();

        {
            let mut inner = mutex_lock(&self.inner, SOURCE, "store");
            if let Some((evicted_key, evicted)) =
                inner.entries.push(fingerprint.to_string(), entry)
            {
                inner.weight = inner.weight.saturating_sub(evicted.body.len());
                if evicted_key != fingerprint {
                    counter!(METRIC_MEMORY_EVICT).increment(1);
                }
            }
            inner.weight += weight;

            while inner.weight > self.weight_limit {
                let Some((_, evicted)) = inner.entries.pop_lru() else {
                    break;
                };
                inner.weight = inner.weight.saturating_sub(evicted.body.len());
                counter!(METRIC_MEMORY_EVICT).increment(1);
            }
        }

        debug!(fingerprint, max_age_secs = max_age.as_secs(), weight, "memory store");

        let inner = Arc::clone(&self.inner);
        let key = fingerprint.to_string();
        self.expire.after(max_age, move || {
            remove_entry(&inner, &key);
        });
    }

    /// Remove the entry for `fingerprint`. Removing an absent key is a
    /// no-op.
    pub fn remove(&self, fingerprint: &str) {
        remove_entry(&self.inner, fingerprint);
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        mutex_lock(&self.inner, SOURCE, "len").entries.len()
    }

    /// True when the tier holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total body bytes currently held.
    pub fn weight(&self) -> usize {
        mutex_lock(&self.inner, SOURCE, "weight").weight
    }
}

fn remove_entry(inner: &Arc<Mutex<MemoryInner>>, fingerprint: &str) {
    let mut inner = mutex_lock(inner, SOURCE, "remove");
    if let Some(entry) = inner.entries.pop(fingerprint) {
        inner.weight = inner.weight.saturating_sub(entry.body.len());
    }
}
