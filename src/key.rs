//! Content-addressed path keys
//!
//! A [`PathKey`] is the SHA-256 digest of a canonicalized path. Every map
//! inside the overlay keys on it instead of the raw path string.

use sha2::{Digest, Sha256};
use std::fmt;

use crate::path::canonicalize;

/// Digest identifying one location for the lifetime of a run
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathKey([u8; 32]);

impl PathKey {
    /// Derive the key for `path`. Pure and total.
    pub fn derive(path: &str) -> Self {
        let canonical = canonicalize(path);
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        PathKey(hasher.finalize().into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex form, for logging
    pub fn to_hex(&self) -> String {
        use std::fmt::Write;
        self.0.iter().fold(String::with_capacity(64), |mut acc, b| {
            let _ = write!(acc, "{b:02x}");
            acc
        })
    }
}

impl fmt::Debug for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PathKey({})", &self.to_hex()[..12])
    }
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Shorthand for [`PathKey::derive`].
pub fn derive_key(path: &str) -> PathKey {
    PathKey::derive(path)
}
