use serde::{Deserialize, Serialize};

/// Outcome of a single admission check.
///
/// Built fresh for every request and carried alongside it until the response
/// headers are written.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateLimitDecision {
    pub allowed: bool,
    /// Configured maximum requests per window.
    pub limit: u32,
    /// Requests left in the current window, never negative.
    pub remaining: u32,
    /// Epoch seconds at which the window that includes this request ends.
    pub reset_at: f64,
}

impl RateLimitDecision {
    pub fn allowed(limit: u32, remaining: u32, reset_at: f64) -> Self {
        Self {
            allowed: true,
            limit,
            remaining,
            reset_at,
        }
    }

    pub fn rejected(limit: u32, reset_at: f64) -> Self {
        Self {
            allowed: false,
            limit,
            remaining: 0,
            reset_at,
        }
    }

    /// Reset time as whole epoch seconds, as sent in `X-RateLimit-Reset`.
    pub fn reset_epoch_secs(&self) -> i64 {
        self.reset_at.floor() as i64
    }
}
