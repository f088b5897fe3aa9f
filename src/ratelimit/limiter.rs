//! Fixed-window rate limiter.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::error::{PktimeError, Result};

use super::store::CounterStore;
use super::epoch_ms;

/// Default rate limit when no specific limit is configured.
pub const DEFAULT_LIMIT: u64 = 10;
/// Default window length when no specific window is configured.
pub const DEFAULT_WINDOW_SECS: u64 = 10;

/// Namespace prefix for counter keys.
const KEY_PREFIX: &str = "rate_limit";

/// The outcome of a rate limit check.
///
/// Derived per request, never stored: `remaining = max(0, limit - count)` and
/// `success` holds exactly when the incremented count is within the limit.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Decision {
    /// Whether the request is admitted
    pub success: bool,
    /// The limit that applied to this check
    pub limit: u64,
    /// Requests left in the current window
    pub remaining: u64,
    /// Unix-epoch-millisecond timestamp of the next window boundary
    pub reset: u64,
}

impl Decision {
    /// Seconds until the window resets, rounded up.
    pub fn retry_after_secs(&self, now_ms: u64) -> u64 {
        self.reset.saturating_sub(now_ms).div_ceil(1000)
    }
}

/// The core rate limiter.
///
/// Holds a handle to whichever counter store was selected at startup; the
/// check logic never branches on backend identity. The struct is cheap to
/// clone and safe to share across tasks.
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn CounterStore>,
}

impl RateLimiter {
    /// Create a rate limiter over the given counter store.
    pub fn new(store: Arc<dyn CounterStore>) -> Self {
        Self { store }
    }

    /// Check the rate limit for one client key.
    ///
    /// Increments the counter for the key's current window and reports
    /// whether the request is admitted. Windows are aligned to absolute epoch
    /// boundaries, so all clients sharing a window length reset together.
    ///
    /// Backend failures never surface to the caller: the check fails open
    /// with an admitting decision, trading enforcement for availability
    /// during counter store outages. The only error returned is for
    /// non-positive `limit` or `window_secs`.
    pub async fn check(&self, client_key: &str, limit: u64, window_secs: u64) -> Result<Decision> {
        if limit == 0 {
            return Err(PktimeError::Config(
                "rate limit must be a positive integer".to_string(),
            ));
        }
        if window_secs == 0 {
            return Err(PktimeError::Config(
                "rate limit window must be a positive integer".to_string(),
            ));
        }

        let key = format!("{KEY_PREFIX}:{client_key}");
        let now_ms = epoch_ms();
        let window_ms = window_secs * 1000;
        // Smallest multiple of the window length at or past the current time.
        let reset = now_ms.div_ceil(window_ms) * window_ms;

        trace!(key = %key, limit, window_secs, "Checking rate limit");

        let count = match self.store.incr(&key).await {
            Ok(count) => count,
            Err(e) => {
                warn!(key = %key, error = %e, "Counter increment failed, failing open");
                return Ok(Self::fail_open(limit, reset));
            }
        };

        if count == 1 {
            if let Err(e) = self.store.expire(&key, window_secs).await {
                warn!(key = %key, error = %e, "Setting counter expiry failed, failing open");
                return Ok(Self::fail_open(limit, reset));
            }
        }

        let success = count <= limit;
        if !success {
            debug!(key = %key, count, limit, "Rate limit exceeded");
        }

        Ok(Decision {
            success,
            limit,
            remaining: limit.saturating_sub(count),
            reset,
        })
    }

    fn fail_open(limit: u64, reset: u64) -> Decision {
        Decision {
            success: true,
            limit,
            remaining: limit - 1,
            reset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    // The glob import above pulls in the crate's single-parameter `Result`
    // alias; the trait impl below needs the two-parameter prelude form.
    use std::result::Result;
    use std::sync::Mutex;

    use crate::ratelimit::store::StoreError;

    /// Fake backend that records commands and can be forced to fail.
    #[derive(Default)]
    struct FakeStore {
        counts: Mutex<HashMap<String, u64>>,
        expirations: Mutex<Vec<(String, u64)>>,
        fail_incr: bool,
        fail_expire: bool,
    }

    impl FakeStore {
        fn clear_counts(&self) {
            self.counts.lock().unwrap().clear();
        }
    }

    #[async_trait]
    impl CounterStore for FakeStore {
        async fn incr(&self, key: &str) -> Result<u64, StoreError> {
            if self.fail_incr {
                return Err(StoreError::Connection("connection refused".to_string()));
            }
            let mut counts = self.counts.lock().unwrap();
            let count = counts.entry(key.to_string()).or_insert(0);
            *count += 1;
            Ok(*count)
        }

        async fn expire(&self, key: &str, ttl_secs: u64) -> Result<(), StoreError> {
            if self.fail_expire {
                return Err(StoreError::Query("EXPIRE failed".to_string()));
            }
            self.expirations
                .lock()
                .unwrap()
                .push((key.to_string(), ttl_secs));
            Ok(())
        }

        async fn get(&self, key: &str) -> Result<Option<u64>, StoreError> {
            Ok(self.counts.lock().unwrap().get(key).copied())
        }
    }

    fn limiter_with(store: FakeStore) -> (RateLimiter, Arc<FakeStore>) {
        let store = Arc::new(store);
        (RateLimiter::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_first_ten_allowed_eleventh_denied() {
        let (limiter, _) = limiter_with(FakeStore::default());

        for expected_remaining in (0..10).rev() {
            let decision = limiter.check("1.2.3.4", 10, 10).await.unwrap();
            assert!(decision.success);
            assert_eq!(decision.remaining, expected_remaining);
        }

        let decision = limiter.check("1.2.3.4", 10, 10).await.unwrap();
        assert!(!decision.success);
        assert_eq!(decision.remaining, 0);
    }

    #[tokio::test]
    async fn test_remaining_never_negative() {
        let (limiter, _) = limiter_with(FakeStore::default());

        let mut last = None;
        for _ in 0..15 {
            last = Some(limiter.check("1.2.3.4", 10, 10).await.unwrap());
        }

        let decision = last.unwrap();
        assert!(!decision.success);
        assert_eq!(decision.remaining, 0);
    }

    #[tokio::test]
    async fn test_invariants_hold_for_every_decision() {
        let (limiter, store) = limiter_with(FakeStore::default());

        for _ in 0..20 {
            let decision = limiter.check("1.2.3.4", 7, 10).await.unwrap();
            let count = store.get("rate_limit:1.2.3.4").await.unwrap().unwrap();
            assert_eq!(decision.remaining, 7u64.saturating_sub(count));
            assert_eq!(decision.success, count <= 7);
        }
    }

    #[tokio::test]
    async fn test_failing_increment_fails_open() {
        let (limiter, _) = limiter_with(FakeStore {
            fail_incr: true,
            ..Default::default()
        });

        let decision = limiter.check("1.2.3.4", 10, 10).await.unwrap();
        assert!(decision.success);
        assert_eq!(decision.remaining, 9);
    }

    #[tokio::test]
    async fn test_failing_expire_fails_open() {
        let (limiter, _) = limiter_with(FakeStore {
            fail_expire: true,
            ..Default::default()
        });

        let decision = limiter.check("1.2.3.4", 10, 10).await.unwrap();
        assert!(decision.success);
        assert_eq!(decision.remaining, 9);
    }

    #[tokio::test]
    async fn test_expiry_set_once_with_caller_window() {
        let (limiter, store) = limiter_with(FakeStore::default());

        limiter.check("1.2.3.4", 10, 30).await.unwrap();
        limiter.check("1.2.3.4", 10, 30).await.unwrap();

        let expirations = store.expirations.lock().unwrap();
        assert_eq!(*expirations, vec![("rate_limit:1.2.3.4".to_string(), 30)]);
    }

    #[tokio::test]
    async fn test_key_behaves_fresh_after_expiry() {
        let (limiter, store) = limiter_with(FakeStore::default());

        for _ in 0..11 {
            limiter.check("1.2.3.4", 10, 10).await.unwrap();
        }
        assert!(!limiter.check("1.2.3.4", 10, 10).await.unwrap().success);

        // The backend dropping the key is what a window rollover looks like
        // to the limiter.
        store.clear_counts();

        let decision = limiter.check("1.2.3.4", 10, 10).await.unwrap();
        assert!(decision.success);
        assert_eq!(decision.remaining, 9);
    }

    #[tokio::test]
    async fn test_reset_is_epoch_aligned() {
        let (limiter, _) = limiter_with(FakeStore::default());

        let before = epoch_ms();
        let decision = limiter.check("1.2.3.4", 10, 10).await.unwrap();

        assert_eq!(decision.reset % 10_000, 0);
        assert!(decision.reset >= before);
        assert!(decision.reset <= before + 10_000 + 1_000);
    }

    #[tokio::test]
    async fn test_clients_have_separate_counters() {
        let (limiter, _) = limiter_with(FakeStore::default());

        limiter.check("1.2.3.4", 10, 10).await.unwrap();
        limiter.check("1.2.3.4", 10, 10).await.unwrap();
        let decision = limiter.check("5.6.7.8", 10, 10).await.unwrap();

        assert_eq!(decision.remaining, 9);
    }

    #[tokio::test]
    async fn test_zero_limit_rejected() {
        let (limiter, _) = limiter_with(FakeStore::default());
        assert!(limiter.check("1.2.3.4", 0, 10).await.is_err());
    }

    #[tokio::test]
    async fn test_zero_window_rejected() {
        let (limiter, _) = limiter_with(FakeStore::default());
        assert!(limiter.check("1.2.3.4", 10, 0).await.is_err());
    }

    #[test]
    fn test_retry_after_rounds_up() {
        let decision = Decision {
            success: false,
            limit: 10,
            remaining: 0,
            reset: 10_000,
        };
        assert_eq!(decision.retry_after_secs(9_100), 1);
        assert_eq!(decision.retry_after_secs(7_500), 3);
        assert_eq!(decision.retry_after_secs(10_000), 0);
        assert_eq!(decision.retry_after_secs(12_000), 0);
    }
}
