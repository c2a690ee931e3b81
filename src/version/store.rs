//! Key-value store trait backing the response cache

use std::time::Duration;

#[cfg(test)]
use mockall::automock;

use crate::version::error::CacheError;

/// A stored response and the instant it stops being servable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub key: String,
    pub value: Vec<u8>,
    /// Expiry in milliseconds since UNIX epoch
    pub expires_at: i64,
}

impl CacheEntry {
    pub fn new(key: &str, value: &[u8], ttl: Duration) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_vec(),
            expires_at: current_timestamp_ms()
                .saturating_add(i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX)),
        }
    }

    pub fn is_fresh_at(&self, now_ms: i64) -> bool {
        now_ms < self.expires_at
    }
}

/// Get current timestamp in milliseconds since UNIX epoch
pub fn current_timestamp_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Trait for storing opaque values with a time-to-live
///
/// Implementations own expiry: `get` must never return a value whose TTL has
/// elapsed.
#[cfg_attr(test, automock)]
pub trait KeyValueStore: Send + Sync + 'static {
    /// Get the value stored under `key`, if present and not expired
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Store `value` under `key` for `ttl`, replacing any previous value
    fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_entry_is_fresh_until_expiry() {
        let entry = CacheEntry::new("key", b"value", Duration::from_secs(60));

        assert!(entry.is_fresh_at(entry.expires_at - 1));
        assert!(!entry.is_fresh_at(entry.expires_at));
        assert!(!entry.is_fresh_at(entry.expires_at + 1));
    }

    #[test]
    fn cache_entry_with_zero_ttl_is_never_fresh() {
        let entry = CacheEntry::new("key", b"value", Duration::ZERO);

        assert!(!entry.is_fresh_at(current_timestamp_ms()));
    }
}
