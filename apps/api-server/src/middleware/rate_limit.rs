//! Rate limiting middleware.
//!
//! Runs in two phases around the wrapped service: the request is admitted or
//! rejected before the handler runs, and quota headers are written onto the
//! handler's response afterwards.

use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header::{ContentType, HeaderMap, HeaderName, HeaderValue},
};
use futures::future::LocalBoxFuture;
use std::future::{Ready, ready};
use std::rc::Rc;
use std::sync::Arc;

use ratewatch_core::ports::RateLimiter;
use ratewatch_core::{RateLimitDecision, RequestMeta};

use crate::middleware::error::AppError;

pub static X_RATELIMIT_LIMIT: &str = "x-ratelimit-limit";
pub static X_RATELIMIT_REMAINING: &str = "x-ratelimit-remaining";
pub static X_RATELIMIT_RESET: &str = "x-ratelimit-reset";

/// Write the quota headers for `decision`.
pub fn annotate(headers: &mut HeaderMap, decision: &RateLimitDecision) {
    headers.insert(
        HeaderName::from_static(X_RATELIMIT_LIMIT),
        HeaderValue::from(decision.limit),
    );
    headers.insert(
        HeaderName::from_static(X_RATELIMIT_REMAINING),
        HeaderValue::from(decision.remaining),
    );
    headers.insert(
        HeaderName::from_static(X_RATELIMIT_RESET),
        HeaderValue::from(decision.reset_epoch_secs()),
    );
}

/// Extract the identity inputs from a request.
pub fn request_meta(req: &ServiceRequest) -> RequestMeta {
    let forwarded_for = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let remote_addr = req.peer_addr().map(|addr| addr.ip().to_string());

    RequestMeta::new(forwarded_for, remote_addr)
}

/// Rate limiting middleware factory.
pub struct RateLimitMiddleware {
    limiter: Arc<dyn RateLimiter>,
}

impl RateLimitMiddleware {
    pub fn new(limiter: Arc<dyn RateLimiter>) -> Self {
        Self { limiter }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimitMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimitMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddlewareService {
            service: Rc::new(service),
            limiter: self.limiter.clone(),
        }))
    }
}

pub struct RateLimitMiddlewareService<S> {
    service: Rc<S>,
    limiter: Arc<dyn RateLimiter>,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let limiter = self.limiter.clone();

        Box::pin(async move {
            let client_id = request_meta(&req).client_id();

            // Cache faults surface as a 500; the request is neither admitted nor rejected.
            let decision = limiter
                .admit(client_id.as_deref())
                .await
                .map_err(AppError::from)?;

            if !decision.allowed {
                let mut response = HttpResponse::TooManyRequests()
                    .content_type(ContentType::plaintext())
                    .body("Too Many Requests");
                annotate(response.headers_mut(), &decision);

                let (http_req, _payload) = req.into_parts();
                return Ok(ServiceResponse::new(http_req, response).map_into_right_body());
            }

            req.extensions_mut().insert(decision);

            let mut res = service.call(req).await?;

            let decision = res
                .request()
                .extensions()
                .get::<RateLimitDecision>()
                .copied();
            if let Some(decision) = decision {
                annotate(res.headers_mut(), &decision);
            }

            Ok(res.map_into_left_body())
        })
    }
}
