//! # Ratewatch Infrastructure
//!
//! Concrete implementations of the ports defined in `ratewatch-core`:
//! cache backends, clocks and the sliding window rate limiter.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external services, in-memory only
//! - `redis` - Redis-backed shared cache

pub mod cache;
pub mod clock;
pub mod rate_limit;

pub use cache::InMemoryCache;
pub use clock::{ManualClock, SystemClock};
pub use rate_limit::{RateLimitConfig, SlidingWindowRateLimiter};

#[cfg(feature = "redis")]
pub use cache::{RedisCache, RedisConfig};
