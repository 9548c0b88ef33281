//! Local disk tier.
//!
//! Keyed file storage using the cache object format. Writes go through
//! a temporary file in the destination directory followed by an atomic
//! rename, so a concurrent reader observes either the complete prior
//! object or the complete new one, never a torn file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use http::HeaderMap;
use metrics::counter;
use tracing::debug;

use crate::error::CacheError;
use crate::object::{decode_object, encode_object};
use crate::telemetry::{METRIC_DISK_HIT, METRIC_DISK_MISS};

/// Maps a content fingerprint to the file path holding its object.
///
/// Path derivation is owned by the surrounding proxy; this tier only
/// consumes it. Closures implement the trait directly.
pub trait PathScheme: Send + Sync {
    fn path_for(&self, fingerprint: &str) -> PathBuf;
}

impl<F> PathScheme for F
where
    F: Fn(&str) -> PathBuf + Send + Sync,
{
    fn path_for(&self, fingerprint: &str) -> PathBuf {
        self(fingerprint)
    }
}

/// Durable same-host cache tier.
///
/// Synchronous by design: it sits on the response path and must not
/// require an executor. Concurrent stores for the same fingerprint
/// race at the filesystem level; the last rename wins.
pub struct DiskTier {
    paths: Arc<dyn PathScheme>,
}

impl DiskTier {
    /// Create a disk tier resolving fingerprints through `paths`.
    pub fn new(paths: Arc<dyn PathScheme>) -> Self {
        Self { paths }
    }

    /// Read and decode the object stored for `fingerprint`.
    ///
    /// A missing file is a `NotFound` miss; a file that fails to decode
    /// is `InvalidObject`.
    pub fn load(&self, fingerprint: &str) -> Result<(Bytes, HeaderMap), CacheError> {
        let path = self.paths.path_for(fingerprint);
        let data = fs::read(&path).map_err(|err| {
            counter!(METRIC_DISK_MISS).increment(1);
            CacheError::from_read(err)
        })?;
        let decoded = decode_object(&data)?;
        counter!(METRIC_DISK_HIT).increment(1);
        Ok(decoded)
    }

    /// Encode and write the object for `fingerprint`, atomically.
    ///
    /// Intermediate directories are created as needed. I/O failures
    /// propagate; the caller decides whether cache population is
    /// best-effort or fatal.
    pub fn store(
        &self,
        fingerprint: &str,
        headers: &HeaderMap,
        body: &[u8],
    ) -> Result<(), CacheError> {
        let path = self.paths.path_for(fingerprint);
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir)?;

        // Temporary file in the destination directory keeps the rename
        // on one filesystem, which is what makes it atomic.
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&encode_object(headers, body))?;
        tmp.persist(&path).map_err(|err| err.error)?;

        debug!(fingerprint, path = %path.display(), bytes = body.len(), "disk store");
        Ok(())
    }
}
