//! In-memory rate limiter.
//!
//! Uses a fixed-window counter algorithm with an in-memory HashMap. Counters
//! are per process, so a multi-instance deployment enforces limits per
//! instance.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::RateLimitConfig;
use crate::domain::foundation::Timestamp;
use crate::ports::{
    RateLimitDenied, RateLimitError, RateLimitKey, RateLimitResult, RateLimitScope,
    RateLimitStatus, RateLimiter,
};

const GLOBAL_WINDOW_SECS: u32 = 60;

#[derive(Debug, Clone)]
pub struct InMemoryRateLimiter {
    config: RateLimitConfig,
    windows: Arc<RwLock<Windows>>,
}

#[derive(Debug, Default)]
struct Windows {
    entries: HashMap<RateLimitKey, WindowState>,
    /// Unix second at or after which expired entries are swept.
    next_sweep: i64,
}

/// State for a single rate limit window.
#[derive(Debug, Clone)]
struct WindowState {
    count: u32,
    window_start: i64,
    window_secs: u32,
}

impl WindowState {
    fn window_end(&self) -> i64 {
        self.window_start + i64::from(self.window_secs)
    }
}

impl InMemoryRateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Arc::new(RwLock::new(Windows::default())),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(RateLimitConfig::default())
    }

    /// Returns (limit, window_secs) for a key.
    fn limits_for(&self, key: &RateLimitKey) -> (u32, u32) {
        match key.scope {
            RateLimitScope::Global => (self.config.global_requests_per_minute, GLOBAL_WINDOW_SECS),
            RateLimitScope::Ip => (self.config.requests_per_window, self.config.window_secs),
        }
    }

    /// Sweeps run at most once per shortest window.
    fn sweep_interval_secs(&self) -> u32 {
        self.config.window_secs.clamp(1, GLOBAL_WINDOW_SECS)
    }

    /// Number of windows currently held, expired or not.
    pub async fn window_count(&self) -> usize {
        self.windows.read().await.entries.len()
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn check(&self, key: RateLimitKey) -> Result<RateLimitResult, RateLimitError> {
        let (limit, window_secs) = self.limits_for(&key);
        let now = Timestamp::now().as_unix_secs();

        let mut windows = self.windows.write().await;

        if now >= windows.next_sweep {
            let before = windows.entries.len();
            windows.entries.retain(|_, state| now < state.window_end());
            windows.next_sweep = now + i64::from(self.sweep_interval_secs());
            let evicted = before - windows.entries.len();
            if evicted > 0 {
                tracing::trace!(evicted, "Expired rate limit windows swept");
            }
        }

        let state = windows.entries.entry(key.clone()).or_insert_with(|| WindowState {
            count: 0,
            window_start: now,
            window_secs,
        });

        if now >= state.window_end() {
            state.count = 0;
            state.window_start = now;
        }

        if state.count >= limit {
            let retry_after = u32::try_from(state.window_end().saturating_sub(now))
                .unwrap_or(window_secs)
                .max(1);

            return Ok(RateLimitResult::Denied(RateLimitDenied {
                limit,
                retry_after_secs: retry_after,
                scope: key.scope,
                message: format!(
                    "Too many requests, please try again after {} seconds.",
                    retry_after
                ),
            }));
        }

        state.count += 1;
        let remaining = limit.saturating_sub(state.count);
        let reset_at = Timestamp::from_unix_secs(state.window_end()).unwrap_or_default();

        Ok(RateLimitResult::Allowed(RateLimitStatus {
            limit,
            remaining,
            reset_at,
            window_secs,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(per_ip: u32) -> InMemoryRateLimiter {
        InMemoryRateLimiter::new(RateLimitConfig {
            requests_per_window: per_ip,
            ..Default::default()
        })
    }

    // ═══════════════════════════════════════════════════════════════
    // Per-IP windows
    // ═══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn allows_requests_within_limit() {
        let limiter = InMemoryRateLimiter::with_defaults();
        let key = RateLimitKey::ip("192.168.1.1");

        for i in 0..10 {
            let result = limiter.check(key.clone()).await.unwrap();
            assert!(result.is_allowed(), "Request {} should be allowed", i + 1);
        }
    }

    #[tokio::test]
    async fn denies_requests_at_limit() {
        let limiter = limiter(5);
        let key = RateLimitKey::ip("192.168.1.1");

        for _ in 0..5 {
            assert!(limiter.check(key.clone()).await.unwrap().is_allowed());
        }

        match limiter.check(key.clone()).await.unwrap() {
            RateLimitResult::Denied(denied) => {
                assert_eq!(denied.limit, 5);
                assert!(denied.retry_after_secs > 0);
                assert!(denied.retry_after_secs <= 900);
                assert_eq!(denied.scope, RateLimitScope::Ip);
            }
            RateLimitResult::Allowed(_) => panic!("sixth request should be denied"),
        }
    }

    #[tokio::test]
    async fn ip_window_uses_configured_duration() {
        let limiter = InMemoryRateLimiter::with_defaults();
        match limiter.check(RateLimitKey::ip("10.0.0.9")).await.unwrap() {
            RateLimitResult::Allowed(status) => {
                assert_eq!(status.limit, 100);
                assert_eq!(status.window_secs, 900);
                assert_eq!(status.remaining, 99);
            }
            RateLimitResult::Denied(_) => panic!("first request should be allowed"),
        }
    }

    #[tokio::test]
    async fn remaining_decrements_correctly() {
        let limiter = limiter(10);
        let key = RateLimitKey::ip("test-ip");

        for expected_remaining in (0..10u32).rev() {
            match limiter.check(key.clone()).await.unwrap() {
                RateLimitResult::Allowed(status) => {
                    assert_eq!(status.remaining, expected_remaining)
                }
                RateLimitResult::Denied(_) => panic!("should be allowed"),
            }
        }
    }

    #[tokio::test]
    async fn different_ips_have_independent_limits() {
        let limiter = limiter(3);
        let key1 = RateLimitKey::ip("1.1.1.1");
        let key2 = RateLimitKey::ip("2.2.2.2");

        for _ in 0..3 {
            limiter.check(key1.clone()).await.unwrap();
        }
        assert!(!limiter.check(key1).await.unwrap().is_allowed());
        assert!(limiter.check(key2).await.unwrap().is_allowed());
        assert_eq!(limiter.window_count().await, 2);
    }

    #[tokio::test]
    async fn expired_windows_are_evicted_by_later_checks() {
        let limiter = InMemoryRateLimiter::new(RateLimitConfig {
            window_secs: 1,
            ..Default::default()
        });

        for i in 0..50 {
            let key = RateLimitKey::ip(&format!("198.51.100.{}", i));
            assert!(limiter.check(key).await.unwrap().is_allowed());
        }

        tokio::time::sleep(std::time::Duration::from_millis(2100)).await;
        limiter.check(RateLimitKey::ip("203.0.113.7")).await.unwrap();

        assert_eq!(limiter.window_count().await, 1);
    }

    // ═══════════════════════════════════════════════════════════════
    // Global ceiling
    // ═══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn global_limit_applies_to_all_requests() {
        let limiter = InMemoryRateLimiter::new(RateLimitConfig {
            global_requests_per_minute: 3,
            ..Default::default()
        });
        let key = RateLimitKey::global();

        for _ in 0..3 {
            assert!(limiter.check(key.clone()).await.unwrap().is_allowed());
        }
        match limiter.check(key).await.unwrap() {
            RateLimitResult::Denied(denied) => {
                assert_eq!(denied.scope, RateLimitScope::Global);
                assert!(denied.retry_after_secs <= 60);
            }
            RateLimitResult::Allowed(_) => panic!("global ceiling should deny"),
        }
    }
}
