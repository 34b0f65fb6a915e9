//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod cache;
mod clock;
mod rate_limit;

pub use cache::{Cache, CacheError};
pub use clock::Clock;
pub use rate_limit::{RateLimitError, RateLimiter};
