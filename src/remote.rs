//! Remote blob tier.
//!
//! Durable shared cache tier backed by an injected blob-storage
//! client. Loads are ordinary async reads; stores are split into a
//! cheap synchronous encode and a deferred [`RemotePush`] task so that
//! remote-storage latency never blocks the response path.

use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::HeaderMap;
use metrics::counter;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::error::CacheError;
use crate::object::{decode_object, encode_object};
use crate::telemetry::{
    METRIC_PUSH, METRIC_PUSH_BYTES, METRIC_PUSH_ERROR, METRIC_REMOTE_HIT, METRIC_REMOTE_MISS,
};

/// Maps a content fingerprint to its blob-storage key.
///
/// Key derivation is owned by the surrounding proxy. Closures
/// implement the trait directly.
pub trait KeyScheme: Send + Sync {
    fn key_for(&self, fingerprint: &str) -> String;
}

impl<F> KeyScheme for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn key_for(&self, fingerprint: &str) -> String {
        self(fingerprint)
    }
}

/// Open write stream into blob storage.
pub type BlobWriter = Pin<Box<dyn AsyncWrite + Send>>;

/// Minimal blob-storage client surface consumed by the remote tier:
/// a whole-object read and open/copy/close write-stream semantics.
/// Transport and authentication live behind the implementation.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Read the entire object stored under `key`. A missing object is
    /// reported as an `ErrorKind::NotFound` error.
    async fn read_all(&self, key: &str) -> io::Result<Vec<u8>>;

    /// Open a write stream for the object under `key`. The object
    /// becomes visible when the stream is shut down.
    async fn writer(&self, key: &str) -> io::Result<BlobWriter>;
}

/// Durable shared cache tier.
pub struct RemoteTier {
    blobs: Arc<dyn BlobStore>,
    keys: Arc<dyn KeyScheme>,
    push_timeout: Duration,
}

impl RemoteTier {
    /// Create a remote tier over `blobs`, deriving keys through `keys`
    /// and bounding each push by `push_timeout`.
    pub fn new(blobs: Arc<dyn BlobStore>, keys: Arc<dyn KeyScheme>, push_timeout: Duration) -> Self {
        Self {
            blobs,
            keys,
            push_timeout,
        }
    }

    /// Read and decode the object stored for `fingerprint`.
    pub async fn load(&self, fingerprint: &str) -> Result<(Bytes, HeaderMap), CacheError> {
        let key = self.keys.key_for(fingerprint);
        let data = self.blobs.read_all(&key).await.map_err(|err| {
            counter!(METRIC_REMOTE_MISS).increment(1);
            CacheError::from_read(err)
        })?;
        let decoded = decode_object(&data)?;
        counter!(METRIC_REMOTE_HIT).increment(1);
        Ok(decoded)
    }

    /// Encode the object now and return the deferred network write.
    ///
    /// The returned task is meant to run on a worker off the response
    /// path; see [`PushQueue`](crate::push::PushQueue).
    pub fn store(&self, fingerprint: &str, headers: &HeaderMap, body: &[u8]) -> RemotePush {
        RemotePush {
            fingerprint: fingerprint.to_string(),
            key: self.keys.key_for(fingerprint),
            payload: Bytes::from(encode_object(headers, body)),
            timeout: self.push_timeout,
            blobs: Arc::clone(&self.blobs),
        }
    }
}

/// A pending write of one encoded cache object to blob storage.
///
/// Concurrent pushes, including several for the same fingerprint, are
/// not ordered against each other; the last write to complete wins at
/// the storage layer.
pub struct RemotePush {
    fingerprint: String,
    key: String,
    payload: Bytes,
    timeout: Duration,
    blobs: Arc<dyn BlobStore>,
}

impl RemotePush {
    /// Fingerprint this push belongs to.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Encoded object size in bytes.
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }

    /// Execute the write, bounded by the push deadline.
    ///
    /// Failures are logged and counted here and returned to the
    /// executor; no retry is attempted.
    pub async fn run(self) -> Result<(), CacheError> {
        let nb = self.payload.len();
        match tokio::time::timeout(self.timeout, self.execute()).await {
            Ok(Ok(())) => {
                counter!(METRIC_PUSH).increment(1);
                counter!(METRIC_PUSH_BYTES).increment(nb as u64);
                debug!(fingerprint = %self.fingerprint, bytes = nb, "remote push complete");
                Ok(())
            }
            Ok(Err(err)) => {
                warn!(fingerprint = %self.fingerprint, error = %err, "remote push failed");
                counter!(METRIC_PUSH_ERROR).increment(1);
                Err(CacheError::Io(err))
            }
            Err(_) => {
                warn!(
                    fingerprint = %self.fingerprint,
                    timeout_secs = self.timeout.as_secs(),
                    "remote push timed out"
                );
                counter!(METRIC_PUSH_ERROR).increment(1);
                Err(CacheError::PushTimeout(self.timeout))
            }
        }
    }

    async fn execute(&self) -> io::Result<()> {
        let mut writer = self.blobs.writer(&self.key).await?;
        writer.write_all(&self.payload).await?;
        writer.shutdown().await?;
        Ok(())
    }
}
