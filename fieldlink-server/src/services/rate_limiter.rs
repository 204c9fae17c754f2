use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;

/// Per-key throttle for operations that must not repeat within a window.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Whether an attempt for `key` would be allowed now.
    async fn should_allow(&self, key: &str) -> bool;

    /// Record an attempt for `key`, restarting its window.
    async fn mark_attempt(&self, key: &str);

    /// Check and record in one step. Every call counts as an attempt, allowed or not.
    async fn try_acquire(&self, key: &str) -> bool {
        let allowed = self.should_allow(key).await;
        self.mark_attempt(key).await;
        allowed
    }
}

pub struct InMemoryRateLimiter {
    window: Duration,
    attempts: Mutex<HashMap<String, Instant>>,
}

impl InMemoryRateLimiter {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            attempts: Mutex::new(HashMap::new()),
        }
    }

    fn allowed_at(&self, last_attempt: Option<&Instant>, now: Instant) -> bool {
        last_attempt.is_none_or(|last| now.duration_since(*last) >= self.window)
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn should_allow(&self, key: &str) -> bool {
        let attempts = self.attempts.lock().await;
        self.allowed_at(attempts.get(key), Instant::now())
    }

    async fn mark_attempt(&self, key: &str) {
        let mut attempts = self.attempts.lock().await;
        attempts.insert(key.to_string(), Instant::now());
    }

    async fn try_acquire(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut attempts = self.attempts.lock().await;
        let allowed = self.allowed_at(attempts.get(key), now);
        attempts.insert(key.to_string(), now);
        allowed
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::time::sleep;

    use super::*;

    #[tokio::test]
    async fn test_first_attempt_is_allowed() {
        let limiter = InMemoryRateLimiter::new(Duration::from_secs(60));

        assert!(limiter.should_allow("trap-001").await);
        assert!(limiter.try_acquire("trap-001").await);
        assert!(!limiter.should_allow("trap-001").await);
        assert!(limiter.should_allow("trap-002").await);
    }

    #[tokio::test]
    async fn test_window_expires() {
        let limiter = InMemoryRateLimiter::new(Duration::from_millis(100));

        assert!(limiter.try_acquire("trap-001").await);
        assert!(!limiter.try_acquire("trap-001").await);

        sleep(Duration::from_millis(150)).await;

        assert!(limiter.try_acquire("trap-001").await);
    }

    #[tokio::test]
    async fn test_suppressed_attempt_restarts_window() {
        let limiter = InMemoryRateLimiter::new(Duration::from_millis(200));

        assert!(limiter.try_acquire("trap-001").await);
        sleep(Duration::from_millis(120)).await;
        assert!(!limiter.try_acquire("trap-001").await);
        sleep(Duration::from_millis(120)).await;

        // 240ms after the first attempt but only 120ms after the suppressed one
        assert!(!limiter.try_acquire("trap-001").await);
    }

    #[tokio::test]
    async fn test_concurrent_acquire_admits_one() {
        let limiter = Arc::new(InMemoryRateLimiter::new(Duration::from_secs(60)));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let limiter = limiter.clone();
                tokio::spawn(async move { limiter.try_acquire("trap-001").await })
            })
            .collect();

        let mut admitted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                admitted += 1;
            }
        }

        assert_eq!(admitted, 1);
    }
}
