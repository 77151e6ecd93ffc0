/// Per-IP rate limiting middleware
///
/// This module implements token bucket rate limiting keyed by source
/// address, with state held in an in-process map. Every source IP gets its
/// own bucket; tokens refill at a constant rate and each request consumes
/// one. A request arriving at an empty bucket is rejected with 429.
///
/// # Headers
///
/// Responses include rate limit headers:
/// - `X-RateLimit-Limit`: requests allowed per minute
/// - `X-RateLimit-Remaining`: tokens remaining for this source
/// - `Retry-After`: seconds to wait (429 responses only)

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

use crate::{app::AppState, config::RateLimitConfig, error::ApiError};

/// Buckets are pruned once the map grows past this many sources
const PRUNE_THRESHOLD: usize = 10_000;

/// Token bucket state for one source address
#[derive(Debug, Clone)]
struct TokenBucket {
    /// Current number of tokens
    tokens: f64,

    /// Last refill timestamp (Unix seconds)
    last_refill: u64,
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

impl TokenBucket {
    /// Creates a new full bucket
    fn new(capacity: u32) -> Self {
        TokenBucket {
            tokens: capacity as f64,
            last_refill: unix_now(),
        }
    }

    /// Refills tokens based on elapsed time
    fn refill(&mut self, rate: f64, capacity: u32) {
        let now = unix_now();
        let elapsed_secs = now.saturating_sub(self.last_refill) as f64;
        let new_tokens = elapsed_secs * rate;

        self.tokens = (self.tokens + new_tokens).min(capacity as f64);
        self.last_refill = now;
    }

    /// Attempts to consume N tokens
    fn try_consume(&mut self, count: f64) -> bool {
        if self.tokens >= count {
            self.tokens -= count;
            true
        } else {
            false
        }
    }

    /// Calculates seconds until N tokens are available
    fn seconds_until_available(&self, count: f64, rate: f64) -> u64 {
        let deficit = count - self.tokens;
        if deficit <= 0.0 {
            0
        } else {
            (deficit / rate).ceil() as u64
        }
    }
}

/// Result of a rate limit check
#[derive(Debug)]
pub struct RateLimitResult {
    /// Whether the request is allowed
    pub ok: bool,

    /// Tokens remaining for this source
    pub remaining: u32,

    /// Seconds until a token is available (when rejected)
    pub retry_after: u64,
}

/// Shared per-IP rate limiter
///
/// Cheap to clone; all clones share one bucket map.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    buckets: Arc<Mutex<HashMap<IpAddr, TokenBucket>>>,
    config: RateLimitConfig,
}

impl RateLimiter {
    /// Creates a rate limiter from configuration
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            buckets: Arc::new(Mutex::new(HashMap::new())),
            config,
        }
    }

    /// Token refill rate in tokens per second
    fn refill_rate(&self) -> f64 {
        f64::from(self.config.requests_per_minute) / 60.0
    }

    /// Checks and consumes one token for a source address
    pub async fn check(&self, addr: IpAddr) -> RateLimitResult {
        let rate = self.refill_rate();
        let capacity = self.config.burst;

        let mut buckets = self.buckets.lock().await;

        // Bound memory: drop sources whose buckets have fully refilled
        if buckets.len() > PRUNE_THRESHOLD {
            let now = unix_now();
            buckets.retain(|_, bucket| {
                let idle = now.saturating_sub(bucket.last_refill) as f64;
                bucket.tokens + idle * rate < f64::from(capacity)
            });
        }

        let bucket = buckets
            .entry(addr)
            .or_insert_with(|| TokenBucket::new(capacity));

        bucket.refill(rate, capacity);

        if bucket.try_consume(1.0) {
            RateLimitResult {
                ok: true,
                remaining: bucket.tokens.floor() as u32,
                retry_after: 0,
            }
        } else {
            RateLimitResult {
                ok: false,
                remaining: 0,
                retry_after: bucket.seconds_until_available(1.0, rate),
            }
        }
    }
}

/// Rate limiting middleware layer
///
/// Checks the caller's bucket before processing the request. Returns 429
/// with a Retry-After header when the bucket is empty.
pub async fn rate_limit_layer(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // Source address comes from ConnectInfo when the server is started with
    // into_make_service_with_connect_info; in-process tests have none and
    // share a single loopback bucket.
    let addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));

    let result = state.rate_limiter.check(addr).await;

    if !result.ok {
        tracing::warn!(%addr, retry_after = result.retry_after, "Rate limit exceeded");
        return Err(ApiError::RateLimitExceeded {
            retry_after: result.retry_after,
            message: format!(
                "Too many requests from this address, try again in {} seconds",
                result.retry_after
            ),
        });
    }

    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&state.config.rate_limit.requests_per_minute.to_string())
    {
        headers.insert("X-RateLimit-Limit", value);
    }
    if let Ok(value) = HeaderValue::from_str(&result.remaining.to_string()) {
        headers.insert("X-RateLimit-Remaining", value);
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(per_minute: u32, burst: u32) -> RateLimitConfig {
        RateLimitConfig {
            requests_per_minute: per_minute,
            burst,
        }
    }

    #[test]
    fn test_token_bucket_new() {
        let bucket = TokenBucket::new(100);
        assert_eq!(bucket.tokens, 100.0);
        assert!(bucket.last_refill > 0);
    }

    #[test]
    fn test_token_bucket_consume() {
        let mut bucket = TokenBucket::new(10);
        assert!(bucket.try_consume(1.0));
        assert_eq!(bucket.tokens, 9.0);
        assert!(bucket.try_consume(5.0));
        assert_eq!(bucket.tokens, 4.0);
        assert!(!bucket.try_consume(10.0));
        assert_eq!(bucket.tokens, 4.0); // Unchanged after failed attempt
    }

    #[test]
    fn test_token_bucket_refill() {
        let mut bucket = TokenBucket {
            tokens: 5.0,
            last_refill: unix_now() - 10, // 10 seconds ago
        };

        // Refill at 1 token/sec for 10 seconds = 10 tokens
        bucket.refill(1.0, 100);
        assert!((bucket.tokens - 15.0).abs() < 0.1);
    }

    #[test]
    fn test_token_bucket_refill_capped() {
        let mut bucket = TokenBucket {
            tokens: 95.0,
            last_refill: unix_now() - 10,
        };

        bucket.refill(1.0, 100);
        assert_eq!(bucket.tokens, 100.0); // Capped at capacity
    }

    #[test]
    fn test_token_bucket_seconds_until_available() {
        let bucket = TokenBucket {
            tokens: 2.0,
            last_refill: unix_now(),
        };

        // Need 5 tokens, have 2, rate is 1/sec -> need 3 seconds
        assert_eq!(bucket.seconds_until_available(5.0, 1.0), 3);

        // Already have enough
        assert_eq!(bucket.seconds_until_available(1.0, 1.0), 0);
    }

    #[tokio::test]
    async fn test_rate_limiter_allows_within_burst() {
        let limiter = RateLimiter::new(test_config(60, 5));
        let addr: IpAddr = "10.0.0.1".parse().unwrap();

        for _ in 0..5 {
            let result = limiter.check(addr).await;
            assert!(result.ok);
        }
    }

    #[tokio::test]
    async fn test_rate_limiter_rejects_beyond_burst() {
        let limiter = RateLimiter::new(test_config(60, 3));
        let addr: IpAddr = "10.0.0.2".parse().unwrap();

        for _ in 0..3 {
            assert!(limiter.check(addr).await.ok);
        }

        let result = limiter.check(addr).await;
        assert!(!result.ok);
        assert!(result.retry_after >= 1);
    }

    #[tokio::test]
    async fn test_rate_limiter_isolates_sources() {
        let limiter = RateLimiter::new(test_config(60, 1));
        let first: IpAddr = "10.0.0.3".parse().unwrap();
        let second: IpAddr = "10.0.0.4".parse().unwrap();

        assert!(limiter.check(first).await.ok);
        assert!(!limiter.check(first).await.ok);

        // A different source has its own bucket
        assert!(limiter.check(second).await.ok);
    }
}
