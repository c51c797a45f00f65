//! Request identity hashing for cache entry keys.

use sha2::{Digest, Sha256};

/// Compute the entry key for a request identity.
///
/// Identity is the upper-cased method plus the canonical URL; headers never
/// participate.
pub fn compute_cache_key(method: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.to_ascii_uppercase().as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}
