//! Application configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use ratewatch_infra::RateLimitConfig;
#[cfg(feature = "redis")]
use ratewatch_infra::RedisConfig;

use crate::telemetry::TelemetryConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub rate_limit: RateLimitConfig,
    /// Shared cache; `None` runs with the in-memory cache.
    #[cfg(feature = "redis")]
    pub redis: Option<RedisConfig>,
    pub burst: BurstConfig,
    pub telemetry: TelemetryConfig,
}

/// Settings for the burst tester endpoint.
#[derive(Debug, Clone)]
pub struct BurstConfig {
    /// Base URL of this server's own listener; pings are sent here and never
    /// to a host taken from the incoming request.
    pub base_url: String,
    /// Pause between consecutive pings.
    pub delay: Duration,
    /// Largest `num_requests` accepted.
    pub max_requests: u32,
    /// Per-ping timeout.
    pub timeout: Duration,
}

impl BurstConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            delay: Duration::from_millis(100),
            max_requests: 1000,
            timeout: Duration::from_secs(10),
        }
    }

    fn from_env(host: &str, port: u16) -> Self {
        let defaults = Self::new(self_base_url(host, port));

        Self {
            delay: env_parse("BURST_DELAY_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.delay),
            max_requests: env_parse("BURST_MAX_REQUESTS").unwrap_or(defaults.max_requests),
            timeout: env_parse("BURST_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            ..defaults
        }
    }

    pub fn ping_url(&self) -> String {
        format!("{}/rate-limiter/ping/", self.base_url.trim_end_matches('/'))
    }
}

/// URL a local client can use to reach a listener bound on `host:port`.
fn self_base_url(host: &str, port: u16) -> String {
    match host {
        "0.0.0.0" | "" => format!("http://127.0.0.1:{port}"),
        "::" | "[::]" => format!("http://[::1]:{port}"),
        h if h.contains(':') && !h.starts_with('[') => format!("http://[{h}]:{port}"),
        h => format!("http://{h}:{port}"),
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|s| s.parse().ok())
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env_parse("PORT").unwrap_or(8080);

        Self {
            burst: BurstConfig::from_env(&host, port),
            host,
            port,
            rate_limit: RateLimitConfig::from_env(),
            #[cfg(feature = "redis")]
            redis: RedisConfig::from_env(),
            telemetry: TelemetryConfig::from_env(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unspecified_bind_address_maps_to_loopback() {
        assert_eq!(self_base_url("0.0.0.0", 8080), "http://127.0.0.1:8080");
        assert_eq!(self_base_url("::", 9000), "http://[::1]:9000");
        assert_eq!(self_base_url("10.1.2.3", 80), "http://10.1.2.3:80");
        assert_eq!(self_base_url("fe80::1", 80), "http://[fe80::1]:80");
    }

    #[test]
    fn ping_url_is_built_from_base_url() {
        assert_eq!(
            BurstConfig::new("http://127.0.0.1:8080/").ping_url(),
            "http://127.0.0.1:8080/rate-limiter/ping/"
        );
    }
}
