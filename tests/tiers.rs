//! End-to-end tier behavior: each tier stores and serves the same
//! trimmed-object shape, and the composed lookup walks memory, disk,
//! then remote.

mod common;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use common::MemoryBlobStore;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderValue};
use scorta::{
    CacheConfig, CacheError, CacheResult, HEADER_CACHE_ID, HEADER_CACHE_RESULT, TieredCache,
    decode_object, set_cache_info,
};
use tempfile::tempdir;
use tokio::runtime::Handle;

fn sample_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    headers.insert("x-foo", HeaderValue::from_static("bar"));
    headers
}

fn path_scheme(root: &Path) -> Arc<dyn scorta::PathScheme> {
    let root = root.to_path_buf();
    Arc::new(move |fingerprint: &str| -> PathBuf { root.join(format!("{fingerprint}.obj")) })
}

fn key_scheme() -> Arc<dyn scorta::KeyScheme> {
    Arc::new(|fingerprint: &str| format!("responses/{fingerprint}"))
}

fn cache_over(root: &Path, blobs: MemoryBlobStore) -> TieredCache {
    TieredCache::new(
        &CacheConfig::default(),
        path_scheme(root),
        key_scheme(),
        Arc::new(blobs),
        Handle::current(),
    )
}

#[tokio::test]
async fn memory_tier_end_to_end() {
    let dir = tempdir().expect("tempdir");
    let cache = cache_over(dir.path(), MemoryBlobStore::new());

    cache.store_memory(
        "h1",
        Duration::from_secs(60),
        &sample_headers(),
        Bytes::from_static(b"hello"),
    );

    let (body, headers) = cache.memory().load("h1").expect("memory hit");
    assert_eq!(body.as_ref(), b"hello");
    assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "text/plain");
    assert!(headers.get("x-foo").is_none());
}

#[tokio::test]
async fn disk_tier_end_to_end() {
    let dir = tempdir().expect("tempdir");
    let cache = cache_over(dir.path(), MemoryBlobStore::new());

    cache
        .store_disk("h1", &sample_headers(), b"hello")
        .expect("disk store");

    let (body, headers) = cache.disk().load("h1").expect("disk hit");
    assert_eq!(body.as_ref(), b"hello");
    assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "text/plain");
    assert!(headers.get("x-foo").is_none());
}

#[tokio::test]
async fn remote_tier_end_to_end() {
    let dir = tempdir().expect("tempdir");
    let blobs = MemoryBlobStore::new();
    let cache = cache_over(dir.path(), blobs.clone());

    assert!(cache.store_remote("h1", &sample_headers(), b"hello"));
    cache.shutdown().await;

    let stored = blobs.object("responses/h1").expect("blob written");
    let (body, headers) = decode_object(&stored).expect("stored object decodes");
    assert_eq!(body.as_ref(), b"hello");
    assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "text/plain");
    assert!(headers.get("x-foo").is_none());

    let cache = cache_over(dir.path(), blobs);
    let (body, _, tier) = cache.lookup("h1").await.expect("remote hit");
    assert_eq!(body.as_ref(), b"hello");
    assert_eq!(tier, CacheResult::Remote);
}

#[tokio::test]
async fn lookup_walks_memory_disk_then_remote() {
    let dir = tempdir().expect("tempdir");
    let blobs = MemoryBlobStore::new();
    let cache = cache_over(dir.path(), blobs.clone());
    let headers = sample_headers();

    // Populate every tier with a distinguishable body.
    cache.store_memory(
        "h1",
        Duration::from_secs(60),
        &headers,
        Bytes::from_static(b"from memory"),
    );
    cache.store_disk("h1", &headers, b"from disk").expect("disk store");
    assert!(cache.store_remote("h1", &headers, b"from remote"));

    let (body, _, tier) = cache.lookup("h1").await.expect("hit");
    assert_eq!(tier, CacheResult::Memory);
    assert_eq!(body.as_ref(), b"from memory");

    cache.memory().remove("h1");
    let (body, _, tier) = cache.lookup("h1").await.expect("hit");
    assert_eq!(tier, CacheResult::Disk);
    assert_eq!(body.as_ref(), b"from disk");

    std::fs::remove_file(dir.path().join("h1.obj")).expect("drop disk object");
    cache.shutdown().await;

    let cache = cache_over(dir.path(), blobs);
    let (body, _, tier) = cache.lookup("h1").await.expect("hit");
    assert_eq!(tier, CacheResult::Remote);
    assert_eq!(body.as_ref(), b"from remote");
}

#[tokio::test]
async fn lookup_miss_when_every_tier_is_empty() {
    let dir = tempdir().expect("tempdir");
    let cache = cache_over(dir.path(), MemoryBlobStore::new());

    let err = cache.lookup("absent").await.expect_err("must miss");
    assert!(matches!(err, CacheError::NotFound));
}

#[tokio::test]
async fn lookup_treats_corrupt_disk_object_as_miss() {
    let dir = tempdir().expect("tempdir");
    let blobs = MemoryBlobStore::new();

    // Seed a valid remote object and a corrupt disk object.
    std::fs::write(dir.path().join("h1.obj"), b"garbage with no separator")
        .expect("seed corrupt file");
    blobs.insert(
        "responses/h1",
        b"Content-Type: text/plain\n\nfrom remote".to_vec(),
    );

    let cache = cache_over(dir.path(), blobs);
    let (body, _, tier) = cache.lookup("h1").await.expect("falls through to remote");
    assert_eq!(tier, CacheResult::Remote);
    assert_eq!(body.as_ref(), b"from remote");
}

#[tokio::test]
async fn lookup_result_feeds_the_annotator() {
    let dir = tempdir().expect("tempdir");
    let cache = cache_over(dir.path(), MemoryBlobStore::new());

    cache.store_memory(
        "abcdef0123456789",
        Duration::from_secs(60),
        &sample_headers(),
        Bytes::from_static(b"hello"),
    );

    let (_, _, tier) = cache.lookup("abcdef0123456789").await.expect("hit");

    let mut response_headers = HeaderMap::new();
    set_cache_info(&mut response_headers, tier.as_str(), "abcdef0123456789");
    assert_eq!(response_headers.get(HEADER_CACHE_RESULT).unwrap(), "memory");
    assert_eq!(response_headers.get(HEADER_CACHE_ID).unwrap(), "abcdef012345");
}
