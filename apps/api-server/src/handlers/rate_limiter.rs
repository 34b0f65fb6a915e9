//! Diagnostic endpoints for exercising the rate limiter.

use actix_web::{HttpResponse, web};

use ratewatch_shared::dto::{
    BurstReport, BurstResult, ClearCacheResponse, PingResponse, RateLimitHeaders,
};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /rate-limiter/ping/
pub async fn ping() -> HttpResponse {
    HttpResponse::Ok().json(PingResponse::pong())
}

/// GET /rate-limiter/test/{num_requests}/
///
/// Calls this server's ping endpoint `num_requests` times in sequence and
/// reports how many calls were admitted and how many were rate limited.
/// The target is the server's own listener; request headers such as `Host`
/// or `X-Forwarded-Host` never pick it.
pub async fn burst_test(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let num_requests = path.into_inner();
    if num_requests <= 0 {
        return Err(AppError::BadRequest(
            "Number of requests must be a positive integer".to_string(),
        ));
    }
    let max_requests = state.burst.max_requests;
    let num_requests = u32::try_from(num_requests)
        .ok()
        .filter(|&n| n <= max_requests)
        .ok_or_else(|| {
            AppError::BadRequest(format!(
                "Number of requests must not exceed {}",
                max_requests
            ))
        })?;

    let ping_url = state.burst.ping_url();

    let mut results = Vec::new();
    for i in 0..num_requests {
        if i > 0 {
            tokio::time::sleep(state.burst.delay).await;
        }

        let response = state
            .http
            .get(&ping_url)
            .send()
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        let header = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(String::from)
        };

        results.push(BurstResult {
            status_code: response.status().as_u16(),
            headers: RateLimitHeaders {
                limit: header("X-RateLimit-Limit"),
                remaining: header("X-RateLimit-Remaining"),
                reset: header("X-RateLimit-Reset"),
            },
        });
    }

    let report = BurstReport::from_results(results);
    tracing::info!(
        total = report.total_requests,
        successful = report.successful_requests,
        rate_limited = report.rate_limited_requests,
        "Burst test finished"
    );

    Ok(HttpResponse::Ok().json(report))
}

/// DELETE /rate-limiter/clear/
pub async fn clear_cache(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let keys_cleared = state.limiter.clear().await?;

    Ok(HttpResponse::Ok().json(ClearCacheResponse {
        message: "Rate limiter cache cleared successfully".to_string(),
        keys_cleared,
    }))
}

pub async fn get_only() -> AppResult<HttpResponse> {
    Err(AppError::MethodNotAllowed(
        "Only GET method allowed".to_string(),
    ))
}

pub async fn delete_only() -> AppResult<HttpResponse> {
    Err(AppError::MethodNotAllowed(
        "Only DELETE method allowed".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use actix_web::{App, HttpServer, dev::ServerHandle, http::StatusCode, test};
    use ratewatch_core::ports::Cache;
    use ratewatch_infra::{InMemoryCache, ManualClock, RateLimitConfig, SystemClock};
    use serde_json::Value;

    use crate::config::BurstConfig;
    use crate::handlers::configure_routes;
    use crate::middleware::rate_limit::RateLimitMiddleware;

    fn rate_limit(max_requests: u32) -> RateLimitConfig {
        RateLimitConfig {
            max_requests,
            window: Duration::from_secs(300),
            ..RateLimitConfig::default()
        }
    }

    fn burst(base_url: impl Into<String>) -> BurstConfig {
        BurstConfig {
            delay: Duration::from_millis(5),
            max_requests: 20,
            timeout: Duration::from_secs(5),
            ..BurstConfig::new(base_url)
        }
    }

    fn state_with(cache: Arc<dyn Cache>, max_requests: u32) -> AppState {
        AppState::from_parts(
            cache,
            Arc::new(ManualClock::new(1000.0)),
            rate_limit(max_requests),
            burst("http://127.0.0.1:9"),
        )
        .unwrap()
    }

    /// Start the full application on an ephemeral port. The burst tester
    /// targets the listener's own address.
    fn spawn_app(max_requests: u32) -> (AppState, std::net::SocketAddr, ServerHandle) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let state = AppState::from_parts(
            Arc::new(InMemoryCache::new()),
            Arc::new(SystemClock),
            rate_limit(max_requests),
            burst(format!("http://{addr}")),
        )
        .unwrap();

        let server_state = state.clone();
        let server = HttpServer::new(move || {
            App::new()
                .wrap(RateLimitMiddleware::new(server_state.limiter.clone()))
                .app_data(web::Data::new(server_state.clone()))
                .configure(configure_routes)
        })
        .workers(1)
        .listen(listener)
        .unwrap()
        .run();
        let handle = server.handle();
        actix_rt::spawn(server);

        (state, addr, handle)
    }

    macro_rules! app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .wrap(RateLimitMiddleware::new($state.limiter.clone()))
                    .app_data(web::Data::new($state.clone()))
                    .configure(configure_routes),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_ping_is_rate_limited() {
        let state = state_with(Arc::new(InMemoryCache::new()), 2);
        let app = app!(state);

        let mut statuses = Vec::new();
        for _ in 0..3 {
            let req = test::TestRequest::get()
                .uri("/rate-limiter/ping/")
                .peer_addr("192.168.1.9:5000".parse().unwrap())
                .to_request();
            let resp = test::call_service(&app, req).await;
            statuses.push(resp.status());
            if resp.status() == StatusCode::OK {
                let body: PingResponse = test::read_body_json(resp).await;
                assert_eq!(body.message, "pong");
            }
        }

        assert_eq!(
            statuses,
            vec![StatusCode::OK, StatusCode::OK, StatusCode::TOO_MANY_REQUESTS]
        );
    }

    #[actix_web::test]
    async fn test_clear_removes_windows() {
        let cache = Arc::new(InMemoryCache::new());
        let state = state_with(cache.clone(), 100);
        state.limiter.admit(Some("10.0.0.1")).await.unwrap();
        state.limiter.admit(Some("10.0.0.2")).await.unwrap();
        let app = app!(state);

        // No peer address: the clear call itself is not tracked.
        let req = test::TestRequest::delete()
            .uri("/rate-limiter/clear/")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: ClearCacheResponse = test::read_body_json(resp).await;
        assert_eq!(body.keys_cleared, 2);
        assert_eq!(cache.get("rate_limit:10.0.0.1").await.unwrap(), None);
    }

    #[actix_web::test]
    async fn test_wrong_methods_are_rejected() {
        let state = state_with(Arc::new(InMemoryCache::new()), 100);
        let app = app!(state);

        let req = test::TestRequest::get()
            .uri("/rate-limiter/clear/")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["detail"], "Only DELETE method allowed");

        let req = test::TestRequest::post()
            .uri("/rate-limiter/test/3/")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[actix_web::test]
    async fn test_burst_requires_positive_count() {
        let state = state_with(Arc::new(InMemoryCache::new()), 100);
        let app = app!(state);

        for uri in ["/rate-limiter/test/0/", "/rate-limiter/test/-4/"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

            let body: Value = test::read_body_json(resp).await;
            assert_eq!(
                body["detail"],
                "Number of requests must be a positive integer"
            );
        }
    }

    #[actix_web::test]
    async fn test_burst_count_is_bounded() {
        let state = state_with(Arc::new(InMemoryCache::new()), 100);
        let app = app!(state);

        for uri in ["/rate-limiter/test/21/", "/rate-limiter/test/4000000000/"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["detail"], "Number of requests must not exceed 20");
        }
    }

    #[actix_web::test]
    async fn test_hanging_ping_times_out() {
        // Accepts connections into the backlog but never answers.
        let silent = TcpListener::bind("127.0.0.1:0").unwrap();
        let state = AppState::from_parts(
            Arc::new(InMemoryCache::new()),
            Arc::new(ManualClock::new(1000.0)),
            rate_limit(100),
            BurstConfig {
                timeout: Duration::from_millis(200),
                ..burst(format!("http://{}", silent.local_addr().unwrap()))
            },
        )
        .unwrap();
        let app = app!(state);

        let req = test::TestRequest::get()
            .uri("/rate-limiter/test/1/")
            .to_request();
        let resp = tokio::time::timeout(Duration::from_secs(5), test::call_service(&app, req))
            .await
            .expect("burst call should finish once the ping times out");

        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        drop(silent);
    }

    #[actix_web::test]
    async fn test_health_reports_quota() {
        let state = state_with(Arc::new(InMemoryCache::new()), 7);
        let app = app!(state);

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["rate_limit"]["max_requests"], 7);
        assert_eq!(body["rate_limit"]["window_seconds"], 300);
    }

    #[actix_web::test]
    async fn test_burst_against_live_server() {
        let (state, addr, handle) = spawn_app(3);

        // The outer call is keyed on a different client than the pings it triggers.
        let report: BurstReport = state
            .http
            .get(format!("http://{addr}/rate-limiter/test/5/"))
            .header("X-Forwarded-For", "198.51.100.20")
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(report.total_requests, 5);
        assert_eq!(report.successful_requests, 3);
        assert_eq!(report.rate_limited_requests, 2);
        assert_eq!(report.results[0].headers.limit.as_deref(), Some("3"));
        assert_eq!(report.results[0].headers.remaining.as_deref(), Some("2"));
        assert_eq!(report.results[2].headers.remaining.as_deref(), Some("0"));
        assert_eq!(report.results[4].status_code, 429);
        assert_eq!(report.results[4].headers.remaining.as_deref(), Some("0"));

        handle.stop(true).await;
    }

    #[actix_web::test]
    async fn test_burst_ignores_forwarded_host() {
        let (state, addr, handle) = spawn_app(100);

        let other_hits = Arc::new(AtomicUsize::new(0));
        let counter = other_hits.clone();
        let other = HttpServer::new(move || {
            let counter = counter.clone();
            App::new().default_service(web::to(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    HttpResponse::Ok().finish()
                }
            }))
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();
        let other_addr = other.addrs()[0];
        let other = other.run();
        let other_handle = other.handle();
        actix_rt::spawn(other);

        let resp = state
            .http
            .get(format!("http://{addr}/rate-limiter/test/3/"))
            .header("X-Forwarded-Host", other_addr.to_string())
            .header("Forwarded", format!("host={other_addr}"))
            .header("X-Forwarded-For", "198.51.100.30")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        let report: BurstReport = resp.json().await.unwrap();

        assert_eq!(report.total_requests, 3);
        assert_eq!(report.successful_requests, 3);
        assert_eq!(other_hits.load(Ordering::SeqCst), 0);

        other_handle.stop(true).await;
        handle.stop(true).await;
    }
}
