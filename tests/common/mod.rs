#![allow(dead_code)]

//! In-memory blob store used by the integration tests.

use std::collections::HashMap;
use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use async_trait::async_trait;
use scorta::{BlobStore, BlobWriter};
use tokio::io::AsyncWrite;

/// Blob store backed by a shared map. Objects become visible when the
/// writer is shut down, mirroring real open/copy/close semantics.
#[derive(Clone, Default)]
pub struct MemoryBlobStore {
    objects: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn insert(&self, key: &str, data: Vec<u8>) {
        self.objects.lock().unwrap().insert(key.to_string(), data);
    }

    /// Make subsequent writer opens fail.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn read_all(&self, key: &str) -> io::Result<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such object"))
    }

    async fn writer(&self, key: &str) -> io::Result<BlobWriter> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(io::Error::other("writer refused"));
        }
        Ok(Box::pin(MemoryBlobWriter {
            key: key.to_string(),
            buf: Vec::new(),
            objects: Arc::clone(&self.objects),
        }))
    }
}

struct MemoryBlobWriter {
    key: String,
    buf: Vec<u8>,
    objects: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl AsyncWrite for MemoryBlobWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        data: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.get_mut().buf.extend_from_slice(data);
        Poll::Ready(Ok(data.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        this.objects
            .lock()
            .unwrap()
            .insert(this.key.clone(), std::mem::take(&mut this.buf));
        Poll::Ready(Ok(()))
    }
}

/// Blob store whose writer opens never complete. Used to exercise the
/// push deadline and queue saturation.
pub struct StallingBlobStore;

#[async_trait]
impl BlobStore for StallingBlobStore {
    async fn read_all(&self, _key: &str) -> io::Result<Vec<u8>> {
        Err(io::Error::new(io::ErrorKind::NotFound, "no such object"))
    }

    async fn writer(&self, _key: &str) -> io::Result<BlobWriter> {
        std::future::pending().await
    }
}
