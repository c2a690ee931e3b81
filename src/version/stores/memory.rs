//! Process-local key-value store

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use tracing::debug;

use crate::version::error::CacheError;
use crate::version::store::{CacheEntry, KeyValueStore, current_timestamp_ms};

/// In-memory store; entries live as long as the process
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_entries(&self) -> Result<MutexGuard<'_, HashMap<String, CacheEntry>>, CacheError> {
        self.entries.lock().map_err(|_| CacheError::LockPoisoned)
    }

    /// Number of entries currently held, expired or not
    pub fn len(&self) -> usize {
        self.lock_entries().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut entries = self.lock_entries()?;
        let now = current_timestamp_ms();

        match entries.get(key) {
            Some(entry) if entry.is_fresh_at(now) => Ok(Some(entry.value.clone())),
            Some(_) => {
                debug!("Dropping expired entry {}", key);
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError> {
        let entry = CacheEntry::new(key, value, ttl);
        let mut entries = self.lock_entries()?;

        let now = current_timestamp_ms();
        entries.retain(|_, existing| existing.is_fresh_at(now));
        entries.insert(key.to_string(), entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_returns_stored_value() {
        let store = MemoryStore::new();

        store.set("a", b"hello", Duration::from_secs(60)).unwrap();

        assert_eq!(store.get("a").unwrap(), Some(b"hello".to_vec()));
    }

    #[test]
    fn get_returns_none_for_missing_key() {
        let store = MemoryStore::new();

        assert_eq!(store.get("missing").unwrap(), None);
    }

    #[test]
    fn set_replaces_previous_value() {
        let store = MemoryStore::new();

        store.set("a", b"old", Duration::from_secs(60)).unwrap();
        store.set("a", b"new", Duration::from_secs(60)).unwrap();

        assert_eq!(store.get("a").unwrap(), Some(b"new".to_vec()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn get_drops_expired_entries() {
        let store = MemoryStore::new();

        store.set("a", b"hello", Duration::from_millis(50)).unwrap();
        std::thread::sleep(Duration::from_millis(100));

        assert_eq!(store.get("a").unwrap(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn set_prunes_expired_entries_of_other_keys() {
        let store = MemoryStore::new();

        store.set("stale", b"old", Duration::from_millis(50)).unwrap();
        std::thread::sleep(Duration::from_millis(100));
        store.set("fresh", b"new", Duration::from_secs(60)).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("fresh").unwrap(), Some(b"new".to_vec()));
    }

    #[test]
    fn keys_do_not_share_entries() {
        let store = MemoryStore::new();

        store.set("a", b"first", Duration::from_secs(60)).unwrap();
        store.set("b", b"second", Duration::from_secs(60)).unwrap();

        assert_eq!(store.get("a").unwrap(), Some(b"first".to_vec()));
        assert_eq!(store.get("b").unwrap(), Some(b"second".to_vec()));
    }
}
