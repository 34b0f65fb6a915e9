//! Rate limiting port.

use async_trait::async_trait;

use crate::domain::RateLimitDecision;
use crate::ports::CacheError;

/// Rate limiter trait - admission control in front of the request pipeline.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Record a request for `client_id` and decide whether it may proceed.
    ///
    /// `None` means the client could not be identified; such requests are
    /// admitted without being tracked.
    async fn admit(&self, client_id: Option<&str>) -> Result<RateLimitDecision, RateLimitError>;

    /// Drop every window this limiter owns. Returns the number of entries removed.
    async fn clear(&self) -> Result<usize, RateLimitError>;
}

/// Rate limit errors.
#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
}
