//! Fixed-window rate limiting with pluggable counter stores.

mod limiter;
mod memory;
mod rest;
mod store;

pub use limiter::{Decision, RateLimiter, DEFAULT_LIMIT, DEFAULT_WINDOW_SECS};
pub use memory::MemoryStore;
pub use rest::RestCounterStore;
pub use store::{CounterStore, StoreError};

use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch.
pub(crate) fn epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
