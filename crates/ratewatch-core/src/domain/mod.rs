//! Domain types - the rate limiter's vocabulary.

mod client;
mod decision;
mod window;

pub use client::RequestMeta;
pub use decision::RateLimitDecision;
pub use window::ClientWindow;
