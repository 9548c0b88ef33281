//! Cache-info response headers.
//!
//! Stamps the cache outcome and a short content identity onto an
//! outgoing response.

use http::{HeaderMap, HeaderName, HeaderValue};

/// Header carrying the cache result (tier name or `miss`).
pub const HEADER_CACHE_RESULT: HeaderName = HeaderName::from_static("x-cache");

/// Header carrying the first 12 characters of the content fingerprint.
pub const HEADER_CACHE_ID: HeaderName = HeaderName::from_static("x-cache-id");

const CACHE_ID_LEN: usize = 12;

/// Set the cache result and identity headers on `headers`.
///
/// A non-empty `fingerprint` must be at least 12 characters; anything
/// shorter is a caller programming error and fails fast rather than
/// being padded or truncated.
pub fn set_cache_info(headers: &mut HeaderMap, result: &str, fingerprint: &str) {
    let result =
        HeaderValue::from_str(result).expect("cache result must be a valid header value");
    headers.insert(HEADER_CACHE_RESULT, result);

    if !fingerprint.is_empty() {
        assert!(
            fingerprint.len() >= CACHE_ID_LEN,
            "fingerprint {fingerprint:?} shorter than {CACHE_ID_LEN} characters"
        );
        let id = HeaderValue::from_str(&fingerprint[..CACHE_ID_LEN])
            .expect("fingerprint prefix must be a valid header value");
        headers.insert(HEADER_CACHE_ID, id);
    }
}
