//! HTTP handlers and route configuration.

mod health;
mod rate_limiter;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api").route("/health", web::get().to(health::health_check)))
        .service(
            web::scope("/rate-limiter")
                .service(web::resource("/ping/").route(web::get().to(rate_limiter::ping)))
                .service(
                    web::resource("/test/{num_requests}/")
                        .route(web::get().to(rate_limiter::burst_test))
                        .default_service(web::to(rate_limiter::get_only)),
                )
                .service(
                    web::resource("/clear/")
                        .route(web::delete().to(rate_limiter::clear_cache))
                        .default_service(web::to(rate_limiter::delete_only)),
                ),
        );
}
