//! Rolling-window rate limiter over a shared cache.
//!
//! Every admitted or rejected request appends its timestamp to a per-client
//! list stored under `{key_prefix}:{client_id}`. The list is pruned to the
//! trailing window on each call and its length is compared against the quota.
//!
//! The read, prune, append and write steps are not atomic. Two concurrent
//! requests from one client can read the same list and each write back a copy
//! missing the other's timestamp, so the count may run low under contention.
//! No lock is taken around the cache; the store only has to be
//! last-write-wins per key.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use ratewatch_core::ports::{Cache, CacheError, Clock, RateLimitError, RateLimiter};
use ratewatch_core::{ClientWindow, RateLimitDecision};

/// Rate limiter configuration.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per window.
    pub max_requests: u32,
    /// Rolling window length.
    pub window: Duration,
    /// How long an idle window outlives `window` in the cache.
    pub grace_period: Duration,
    /// Key prefix for rate limit keys
    pub key_prefix: String,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(300),
            grace_period: Duration::from_secs(60),
            key_prefix: "rate_limit".to_string(),
        }
    }
}

impl RateLimitConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            max_requests: std::env::var("RATE_LIMIT_MAX_REQUESTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_requests),
            window: std::env::var("RATE_LIMIT_WINDOW_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.window),
            grace_period: std::env::var("RATE_LIMIT_GRACE_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.grace_period),
            key_prefix: std::env::var("RATE_LIMIT_KEY_PREFIX").unwrap_or(defaults.key_prefix),
        }
    }

    /// Cache TTL for a client window.
    pub fn entry_ttl(&self) -> Duration {
        self.window + self.grace_period
    }
}

/// Sliding window log limiter. Holds no per-client state of its own.
pub struct SlidingWindowRateLimiter {
    cache: Arc<dyn Cache>,
    clock: Arc<dyn Clock>,
    config: RateLimitConfig,
}

impl SlidingWindowRateLimiter {
    pub fn new(config: RateLimitConfig, cache: Arc<dyn Cache>, clock: Arc<dyn Clock>) -> Self {
        Self {
            cache,
            clock,
            config,
        }
    }

    fn make_key(&self, client_id: &str) -> String {
        format!("{}:{}", self.config.key_prefix, client_id)
    }

    /// Load a client's window; a missing or unreadable entry starts empty.
    async fn load_window(&self, key: &str) -> Result<ClientWindow, CacheError> {
        let Some(raw) = self.cache.get(key).await? else {
            return Ok(ClientWindow::new());
        };

        match ClientWindow::decode(&raw) {
            Ok(window) => Ok(window),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Discarding malformed rate limit window");
                Ok(ClientWindow::new())
            }
        }
    }
}

#[async_trait]
impl RateLimiter for SlidingWindowRateLimiter {
    async fn admit(&self, client_id: Option<&str>) -> Result<RateLimitDecision, RateLimitError> {
        let max_requests = self.config.max_requests;
        let window_secs = self.config.window.as_secs_f64();
        let now = self.clock.now();
        let reset_at = now + window_secs;

        let Some(client_id) = client_id else {
            tracing::debug!("Client not identifiable, admitting untracked");
            return Ok(RateLimitDecision::allowed(
                max_requests,
                max_requests.saturating_sub(1),
                reset_at,
            ));
        };

        let key = self.make_key(client_id);
        let mut window = self.load_window(&key).await?;
        window.advance(now, window_secs);

        let encoded = window
            .encode()
            .map_err(|e| CacheError::Serialization(e.to_string()))?;
        // Written even when rejecting: blocked retries keep counting.
        self.cache
            .set(&key, &encoded, Some(self.config.entry_ttl()))
            .await?;

        let count = window.len();
        if count > max_requests as usize {
            tracing::warn!(client = %client_id, count, limit = max_requests, "Rate limit exceeded");
            return Ok(RateLimitDecision::rejected(max_requests, reset_at));
        }

        let remaining = (max_requests as usize).saturating_sub(count) as u32;
        tracing::debug!(client = %client_id, remaining, "Request admitted");

        Ok(RateLimitDecision::allowed(max_requests, remaining, reset_at))
    }

    async fn clear(&self) -> Result<usize, RateLimitError> {
        let prefix = format!("{}:", self.config.key_prefix);
        let removed = self.cache.delete_prefix(&prefix).await?;
        tracing::info!(removed, prefix = %prefix, "Cleared rate limit windows");
        Ok(removed)
    }
}
