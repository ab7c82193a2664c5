//! Cache key generation.
//!
//! A cached request is identified by its method and canonical URL (query
//! string included). Request headers never take part in the key, so
//! variations such as `Accept-Language` share one entry.

use sha2::{Digest, Sha256};

/// Compute the storage key for a request identity.
pub fn compute_cache_key(method: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.to_ascii_uppercase().as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}
