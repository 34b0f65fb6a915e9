//! Health check endpoint.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use ratewatch_shared::dto::RateLimitSettings;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: String,
    pub rate_limit: RateLimitSettings,
}

/// Health check endpoint - returns server status and the active quota.
///
/// GET /api/health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let response = HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
        rate_limit: RateLimitSettings {
            max_requests: state.rate_limit.max_requests,
            window_seconds: state.rate_limit.window.as_secs(),
        },
    };

    HttpResponse::Ok().json(response)
}
