//! In-process counter store used when no networked store is configured.
//!
//! Counts are only correct within a single process, so this is a degraded
//! mode for environments without counter store credentials. Entries expire
//! lazily: a read or write that notices a past reset time drops the entry.
//! There is no background sweep, so keys that are never revisited stay in the
//! map for the life of the process.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::store::{CounterStore, StoreError};
use super::epoch_ms;

/// TTL applied when an increment creates a fresh entry. The limiter replaces
/// it with the caller's window via `expire` on the first increment.
const INITIAL_TTL_SECS: u64 = 10;

#[derive(Debug)]
struct Entry {
    count: u64,
    reset_at_ms: u64,
}

impl Entry {
    fn expired(&self, now_ms: u64) -> bool {
        now_ms > self.reset_at_ms
    }
}

/// In-memory fallback counter store.
///
/// The `Mutex` serializes concurrent increments, so N increments of one key
/// with no intervening expiry always yield a count of exactly N.
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Number of entries currently held, including not-yet-collected
    /// expired ones.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn incr_at(&self, key: &str, now_ms: u64) -> u64 {
        let mut entries = self.entries.lock().unwrap();
        match entries.get_mut(key) {
            Some(entry) if !entry.expired(now_ms) => {
                entry.count += 1;
                entry.count
            }
            _ => {
                entries.insert(
                    key.to_string(),
                    Entry {
                        count: 1,
                        reset_at_ms: now_ms + INITIAL_TTL_SECS * 1000,
                    },
                );
                1
            }
        }
    }

    fn expire_at(&self, key: &str, ttl_secs: u64, now_ms: u64) {
        let mut entries = self.entries.lock().unwrap();
        if let Some(entry) = entries.get_mut(key) {
            entry.reset_at_ms = now_ms + ttl_secs * 1000;
        }
    }

    fn get_at(&self, key: &str, now_ms: u64) -> Option<u64> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some(entry) if entry.expired(now_ms) => {
                entries.remove(key);
                None
            }
            Some(entry) => Some(entry.count),
            None => None,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CounterStore for MemoryStore {
    async fn incr(&self, key: &str) -> Result<u64, StoreError> {
        Ok(self.incr_at(key, epoch_ms()))
    }

    async fn expire(&self, key: &str, ttl_secs: u64) -> Result<(), StoreError> {
        self.expire_at(key, ttl_secs, epoch_ms());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<u64>, StoreError> {
        Ok(self.get_at(key, epoch_ms()))
    }
}
