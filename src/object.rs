//! Cache object format.
//!
//! A cache object is a plain-text header section recording a subset of
//! the response headers, followed by a blank line, followed by the raw
//! body bytes. The same byte layout is used on disk and in remote blob
//! storage:
//!
//! ```text
//! Content-Type: text/html; charset=utf-8
//! Date: Tue, 26 Aug 2025 07:00:00 GMT
//! Etag: "5d8c72a5edda8d6a"
//!
//! <body bytes>
//! ```
//!
//! Only the first blank line acts as the header/body boundary, so body
//! bytes may themselves contain blank lines without ambiguity.

use bytes::Bytes;
use http::header::{CACHE_CONTROL, CONTENT_TYPE, DATE, ETAG};
use http::{HeaderMap, HeaderName, HeaderValue};

use crate::error::CacheError;

/// Header names retained by [`trim_headers`]. Everything else is
/// dropped before an entry reaches any tier.
pub const RETAIN_HEADERS: [HeaderName; 4] = [CACHE_CONTROL, CONTENT_TYPE, DATE, ETAG];

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Reduce `headers` to the retained subset.
///
/// Copies the first value of each retained name when present and
/// non-empty. Idempotent: trimming a trimmed map is a no-op.
pub fn trim_headers(headers: &HeaderMap) -> HeaderMap {
    let mut out = HeaderMap::new();
    for name in &RETAIN_HEADERS {
        if let Some(value) = headers.get(name) {
            if !value.is_empty() {
                out.insert(name.clone(), value.clone());
            }
        }
    }
    out
}

/// Serialize a header subset and body into cache object bytes.
///
/// Emission order is fixed, so identical inputs always produce
/// identical bytes: `Content-Type` (with a fallback when absent), then
/// `Date` and `Etag` when present, then the blank separator line, then
/// the body verbatim. `Cache-Control` survives [`trim_headers`] but is
/// deliberately not written here; serialized objects do not carry it.
pub fn encode_object(headers: &HeaderMap, body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len() + 128);
    write_header_line(&mut out, headers, &CONTENT_TYPE, "Content-Type", Some(FALLBACK_CONTENT_TYPE));
    write_header_line(&mut out, headers, &DATE, "Date", None);
    write_header_line(&mut out, headers, &ETAG, "Etag", None);
    out.push(b'\n');
    out.extend_from_slice(body);
    out
}

fn write_header_line(
    out: &mut Vec<u8>,
    headers: &HeaderMap,
    name: &HeaderName,
    label: &str,
    fallback: Option<&str>,
) {
    let value = match headers.get(name) {
        Some(value) if !value.is_empty() => value.as_bytes(),
        _ => match fallback {
            Some(fallback) => fallback.as_bytes(),
            None => return,
        },
    };
    out.extend_from_slice(label.as_bytes());
    out.extend_from_slice(b": ");
    out.extend_from_slice(value);
    out.push(b'\n');
}

/// Parse cache object bytes back into body and headers.
///
/// Splits at the first blank line; its absence means the object is
/// corrupt. Header lines are split on the first `": "`; lines without
/// that separator, and lines that do not form a valid header name or
/// value, are skipped rather than failing the whole object.
pub fn decode_object(data: &[u8]) -> Result<(Bytes, HeaderMap), CacheError> {
    let boundary = data
        .windows(2)
        .position(|window| window == b"\n\n")
        .ok_or(CacheError::InvalidObject("missing header separator"))?;
    let (head, rest) = (&data[..boundary], &data[boundary + 2..]);

    let mut headers = HeaderMap::new();
    for line in head.split(|&byte| byte == b'\n') {
        let Some(separator) = line.windows(2).position(|window| window == b": ") else {
            continue;
        };
        let Ok(name) = HeaderName::from_bytes(&line[..separator]) else {
            continue;
        };
        let Ok(value) = HeaderValue::from_bytes(&line[separator + 2..]) else {
            continue;
        };
        headers.append(name, value);
    }

    Ok((Bytes::copy_from_slice(rest), headers))
}
