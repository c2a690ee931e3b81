//! Time-bounded response cache keyed by request fingerprint

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::version::error::RegistryError;
use crate::version::store::KeyValueStore;

/// Deterministic cache key for a request: SHA-256 of "METHOD url", hex encoded
pub fn fingerprint(method: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.as_bytes());
    hasher.update(b" ");
    hasher.update(url.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Wraps a [`KeyValueStore`] with read-through, write-on-success caching
pub struct ResponseCache<S: KeyValueStore> {
    store: Arc<S>,
}

impl<S: KeyValueStore> Clone for ResponseCache<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: KeyValueStore> ResponseCache<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Return the bytes cached under `fingerprint`, or run `fetch` and cache
    /// its result for `ttl`.
    ///
    /// A failed fetch is returned as-is and leaves the cache untouched, so the
    /// next call fetches again. Store failures are logged and never fail the
    /// request: an unreadable store counts as a miss, an unwritable one just
    /// means the response is not cached.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        fingerprint: &str,
        ttl: Duration,
        fetch: F,
    ) -> Result<Vec<u8>, RegistryError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<u8>, RegistryError>>,
    {
        let cached = self
            .store
            .get(fingerprint)
            .inspect_err(|e| warn!("Failed to read cached response {}: {}", fingerprint, e))
            .ok()
            .flatten();

        if let Some(bytes) = cached {
            debug!("Cache hit for {}", fingerprint);
            return Ok(bytes);
        }

        debug!("Cache miss for {}", fingerprint);
        let bytes = fetch().await?;

        let _ = self
            .store
            .set(fingerprint, &bytes, ttl)
            .inspect_err(|e| warn!("Failed to cache response {}: {}", fingerprint, e));

        Ok(bytes)
    }
}
