//! Counter store trait for abstracting networked and in-memory backends.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur in counter store backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to reach the backend
    #[error("Connection error: {0}")]
    Connection(String),

    /// The backend rejected or failed the command
    #[error("Query error: {0}")]
    Query(String),

    /// The backend returned a payload that could not be interpreted
    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// Trait for counter store implementations.
///
/// This trait abstracts over the networked `RestCounterStore` and the
/// in-process `MemoryStore` so the limiter can work with either. The backend
/// is selected once at startup and never switched at runtime.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Atomically increment the counter for a key, returning the
    /// post-increment count.
    async fn incr(&self, key: &str) -> Result<u64, StoreError>;

    /// Set the expiry for a key, in seconds from now.
    async fn expire(&self, key: &str, ttl_secs: u64) -> Result<(), StoreError>;

    /// Read the current count for a key. Returns `None` when the key is
    /// absent or expired.
    async fn get(&self, key: &str) -> Result<Option<u64>, StoreError>;
}
