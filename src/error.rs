use std::io;
use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by the cache tiers.
///
/// Nothing here is fatal to the process: misses and corrupt objects
/// degrade to "consult the next tier", and I/O failures on the write
/// path are best-effort from the caller's point of view.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The tier has no entry for the requested fingerprint.
    #[error("object not found")]
    NotFound,
    /// The stored object is structurally invalid and cannot be decoded.
    #[error("invalid cache object: {0}")]
    InvalidObject(&'static str),
    /// An underlying I/O operation failed.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// A remote push did not complete within its deadline.
    #[error("remote push timed out after {0:?}")]
    PushTimeout(Duration),
}

impl CacheError {
    /// True for errors a lookup path should treat as a plain miss.
    ///
    /// Corrupt objects count as misses: the caller falls through to
    /// the next tier (and may purge the offending entry).
    pub fn is_miss(&self) -> bool {
        matches!(self, Self::NotFound | Self::InvalidObject(_))
    }

    /// Map a read error, folding `NotFound` into the cache miss variant.
    pub(crate) fn from_read(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            Self::NotFound
        } else {
            Self::Io(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn miss_classification() {
        assert!(CacheError::NotFound.is_miss());
        assert!(CacheError::InvalidObject("missing header separator").is_miss());
        assert!(!CacheError::Io(io::Error::other("disk on fire")).is_miss());
        assert!(!CacheError::PushTimeout(Duration::from_secs(60)).is_miss());
    }

    #[test]
    fn not_found_read_errors_become_misses() {
        let err = CacheError::from_read(io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(err, CacheError::NotFound));

        let err = CacheError::from_read(io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(err, CacheError::Io(_)));
    }
}
