//! Fixed-interval request throttling
//!
//! A single gate shared by every adapter call: each outbound request waits
//! until at least `interval` has passed since the previous one was released.
//! There is no burst allowance.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Enforces a minimum delay between outbound requests
///
/// Cloning is cheap and clones share the same gate, so the adapters and the
/// HTTP fetcher can each hold one.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    interval: Duration,
    last_request: Arc<Mutex<Option<Instant>>>,
}

impl RateLimiter {
    /// Creates a limiter with the given minimum interval
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    /// Creates a limiter from a millisecond interval
    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    /// Waits until the minimum interval since the last call has elapsed
    ///
    /// The lock is held across the sleep so concurrent callers queue up
    /// behind each other instead of all waking at the same deadline.
    pub async fn throttle(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(previous) = *last {
            let ready_at = previous + self.interval;
            let now = Instant::now();
            if ready_at > now {
                tracing::trace!("Throttling for {:?}", ready_at - now);
                tokio::time::sleep_until(ready_at).await;
            }
        }

        *last = Some(Instant::now());
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::from_millis(1000)
    }
}
