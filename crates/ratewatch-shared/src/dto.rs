//! Data Transfer Objects - request/response types for the API.

use serde::{Deserialize, Serialize};

/// Body of the ping endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PingResponse {
    pub message: String,
}

impl PingResponse {
    pub fn pong() -> Self {
        Self {
            message: "pong".to_string(),
        }
    }
}

/// Quota headers as observed on one response. Missing headers are `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RateLimitHeaders {
    #[serde(rename = "X-RateLimit-Limit")]
    pub limit: Option<String>,
    #[serde(rename = "X-RateLimit-Remaining")]
    pub remaining: Option<String>,
    #[serde(rename = "X-RateLimit-Reset")]
    pub reset: Option<String>,
}

/// Outcome of one call made by the burst tester.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BurstResult {
    pub status_code: u16,
    pub headers: RateLimitHeaders,
}

/// Summary returned by the burst tester.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BurstReport {
    pub total_requests: u32,
    pub successful_requests: u32,
    pub rate_limited_requests: u32,
    pub results: Vec<BurstResult>,
}

impl BurstReport {
    pub fn from_results(results: Vec<BurstResult>) -> Self {
        let successful_requests = results.iter().filter(|r| r.status_code == 200).count() as u32;
        let rate_limited_requests = results.iter().filter(|r| r.status_code == 429).count() as u32;

        Self {
            total_requests: results.len() as u32,
            successful_requests,
            rate_limited_requests,
            results,
        }
    }
}

/// Body of the clear endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearCacheResponse {
    pub message: String,
    pub keys_cleared: usize,
}

/// Configured quota, reported by the health check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitSettings {
    pub max_requests: u32,
    pub window_seconds: u64,
}
