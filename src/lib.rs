//! Scorta — tiered response cache for HTTP reverse proxies.
//!
//! Persists and retrieves cached response bodies plus a curated header
//! subset across three tiers:
//!
//! - **Memory**: bounded, concurrent, entries self-expire after a TTL
//! - **Disk**: durable same-host files, written via atomic replace
//! - **Remote**: shared blob storage, written off the response path
//!
//! All three tiers share one object format: a plain-text header block,
//! a blank line, then the raw body bytes. Path and key derivation, the
//! blob transport, and the runtime are injected by the surrounding
//! proxy; [`TieredCache`] wires the tiers together.
//!
//! ```no_run
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! use scorta::{CacheConfig, TieredCache};
//! # fn blob_client() -> Arc<dyn scorta::BlobStore> { unimplemented!() }
//!
//! let config = CacheConfig::default();
//! let cache = TieredCache::new(
//!     &config,
//!     Arc::new(|fp: &str| PathBuf::from("/var/cache/proxy").join(fp)),
//!     Arc::new(|fp: &str| format!("responses/{fp}")),
//!     blob_client(),
//!     tokio::runtime::Handle::current(),
//! );
//! ```

mod annotate;
mod config;
mod disk;
mod error;
mod expire;
mod lock;
mod manager;
mod memory;
mod object;
mod push;
mod remote;
pub mod telemetry;

pub use annotate::{HEADER_CACHE_ID, HEADER_CACHE_RESULT, set_cache_info};
pub use config::CacheConfig;
pub use disk::{DiskTier, PathScheme};
pub use error::CacheError;
pub use expire::ExpiryScheduler;
pub use manager::{CacheResult, TieredCache};
pub use memory::MemoryTier;
pub use object::{RETAIN_HEADERS, decode_object, encode_object, trim_headers};
pub use push::PushQueue;
pub use remote::{BlobStore, BlobWriter, KeyScheme, RemotePush, RemoteTier};
