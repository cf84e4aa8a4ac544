// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fixed-window rate limiter for confession writes and feed reads.
//!
//! Buckets are per-IP and process-local; they are lost on restart, which is
//! acceptable for short-horizon abuse damping. The ceiling differs by route
//! (stricter for content-creating writes), so `check` takes the ceiling as
//! a parameter and one limiter instance serves every route.

use crate::config::RateLimitConfig;
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// Result of a rate limit check.
#[derive(Debug, Clone)]
pub enum RateLimitResult {
    /// Request is allowed
    Allowed {
        /// Remaining requests in current window
        remaining: u32,
    },
    /// Request is rate limited
    Limited {
        /// Time until the current window elapses
        retry_after: Duration,
    },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed { .. })
    }
}

/// Per-IP fixed-window bucket.
#[derive(Debug)]
struct Bucket {
    count: u32,
    window_start: Instant,
}

impl Bucket {
    fn new() -> Self {
        Self {
            count: 0,
            window_start: Instant::now(),
        }
    }
}

/// Thread-safe rate limiter.
pub struct RateLimiter {
    config: RateLimitConfig,
    buckets: Arc<RwLock<HashMap<IpAddr, Bucket>>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given configuration.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            buckets: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Increment-and-check the bucket for `ip` against `max_requests`.
    ///
    /// The count is read, compared, and updated under a single write lock,
    /// so two concurrent requests from the same IP can never both slip past
    /// the ceiling.
    pub async fn check(&self, ip: IpAddr, max_requests: u32) -> RateLimitResult {
        let window = self.config.window_duration();
        let now = Instant::now();

        let mut buckets = self.buckets.write().await;
        let bucket = buckets.entry(ip).or_insert_with(Bucket::new);

        let elapsed = now.duration_since(bucket.window_start);
        if elapsed >= window {
            bucket.count = 0;
            bucket.window_start = now;
        }

        if bucket.count >= max_requests {
            let retry_after = window.saturating_sub(now.duration_since(bucket.window_start));
            debug!(%ip, ?retry_after, "Rate limit exceeded");
            return RateLimitResult::Limited { retry_after };
        }

        bucket.count += 1;
        RateLimitResult::Allowed {
            remaining: max_requests - bucket.count,
        }
    }

    /// Clean up buckets whose window has long elapsed (should be called
    /// periodically).
    pub async fn cleanup(&self) {
        let now = Instant::now();
        let stale_threshold = self.config.window_duration() * 2;

        let mut buckets = self.buckets.write().await;
        buckets.retain(|_, bucket| now.duration_since(bucket.window_start) < stale_threshold);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn test_config(window_ms: u64) -> RateLimitConfig {
        RateLimitConfig {
            window_ms,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_ceiling_admits_then_rejects() {
        let limiter = RateLimiter::new(test_config(60_000));
        let ip = IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1));

        for i in 0..3 {
            let result = limiter.check(ip, 3).await;
            assert!(result.is_allowed(), "request {} should be allowed", i + 1);
        }

        match limiter.check(ip, 3).await {
            RateLimitResult::Limited { retry_after } => {
                assert!(retry_after <= Duration::from_secs(60));
            }
            RateLimitResult::Allowed { .. } => panic!("Should be limited"),
        }
    }

    #[tokio::test]
    async fn test_independent_ips() {
        let limiter = RateLimiter::new(test_config(60_000));
        let ip_a = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
        let ip_b = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2));

        assert!(limiter.check(ip_a, 1).await.is_allowed());
        assert!(!limiter.check(ip_a, 1).await.is_allowed());

        // Other IP unaffected
        assert!(limiter.check(ip_b, 1).await.is_allowed());
    }

    #[tokio::test]
    async fn test_window_reset_readmits() {
        let limiter = RateLimiter::new(test_config(50));
        let ip = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 3));

        assert!(limiter.check(ip, 1).await.is_allowed());
        assert!(!limiter.check(ip, 1).await.is_allowed());

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(limiter.check(ip, 1).await.is_allowed());
    }

    #[tokio::test]
    async fn test_remaining_counts_down() {
        let limiter = RateLimiter::new(test_config(60_000));
        let ip = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 4));

        match limiter.check(ip, 5).await {
            RateLimitResult::Allowed { remaining } => assert_eq!(remaining, 4),
            RateLimitResult::Limited { .. } => panic!("Should be allowed"),
        }
        match limiter.check(ip, 5).await {
            RateLimitResult::Allowed { remaining } => assert_eq!(remaining, 3),
            RateLimitResult::Limited { .. } => panic!("Should be allowed"),
        }
    }

    #[tokio::test]
    async fn test_cleanup_drops_stale_buckets() {
        let limiter = RateLimiter::new(test_config(10));
        let ip = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5));

        limiter.check(ip, 5).await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        limiter.cleanup().await;

        let buckets = limiter.buckets.read().await;
        assert!(buckets.is_empty());
    }
}
