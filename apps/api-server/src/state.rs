//! Application state - shared across all handlers.

use std::sync::Arc;

use ratewatch_core::ports::{Cache, CacheError, Clock, RateLimiter};
use ratewatch_infra::{InMemoryCache, RateLimitConfig, SlidingWindowRateLimiter, SystemClock};
#[cfg(feature = "redis")]
use ratewatch_infra::RedisConfig;

use crate::config::{AppConfig, BurstConfig};

/// Errors raised while assembling application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("cache backend unavailable: {0}")]
    Cache(#[from] CacheError),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub limiter: Arc<dyn RateLimiter>,
    pub rate_limit: RateLimitConfig,
    /// Outbound client used by the burst tester.
    pub http: reqwest::Client,
    pub burst: BurstConfig,
}

impl AppState {
    /// Build the application state with the configured cache backend.
    pub async fn new(config: &AppConfig) -> Result<Self, StateError> {
        #[cfg(feature = "redis")]
        let cache = build_cache(config.redis.as_ref()).await?;
        #[cfg(not(feature = "redis"))]
        let cache = build_cache().await?;

        tracing::info!(
            max_requests = config.rate_limit.max_requests,
            window_secs = config.rate_limit.window.as_secs(),
            ping_url = %config.burst.ping_url(),
            "Application state initialized"
        );

        Self::from_parts(
            cache,
            Arc::new(SystemClock),
            config.rate_limit.clone(),
            config.burst.clone(),
        )
    }

    /// Assemble state from explicit collaborators.
    pub fn from_parts(
        cache: Arc<dyn Cache>,
        clock: Arc<dyn Clock>,
        rate_limit: RateLimitConfig,
        burst: BurstConfig,
    ) -> Result<Self, StateError> {
        let limiter = Arc::new(SlidingWindowRateLimiter::new(
            rate_limit.clone(),
            cache,
            clock,
        ));
        let http = reqwest::Client::builder().timeout(burst.timeout).build()?;

        Ok(Self {
            limiter,
            rate_limit,
            http,
            burst,
        })
    }
}

#[cfg(feature = "redis")]
async fn build_cache(redis: Option<&RedisConfig>) -> Result<Arc<dyn Cache>, CacheError> {
    use ratewatch_infra::RedisCache;

    let Some(redis) = redis else {
        tracing::warn!("REDIS_URL not set. Rate limits are tracked per process (in-memory cache).");
        return Ok(Arc::new(InMemoryCache::new()));
    };

    match RedisCache::new(redis).await {
        Ok(cache) => Ok(Arc::new(cache)),
        Err(e) if redis.fallback_to_memory => {
            tracing::error!(
                "Failed to connect to Redis: {}. REDIS_FALLBACK_TO_MEMORY is set, falling back to in-memory cache.",
                e
            );
            Ok(Arc::new(InMemoryCache::new()))
        }
        Err(e) => {
            tracing::error!("Failed to connect to Redis: {}", e);
            Err(e)
        }
    }
}

#[cfg(not(feature = "redis"))]
async fn build_cache() -> Result<Arc<dyn Cache>, CacheError> {
    tracing::info!("Running without redis feature - using in-memory cache");
    Ok(Arc::new(InMemoryCache::new()))
}
