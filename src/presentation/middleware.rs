//! HTTP middleware for the web server

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use uuid::Uuid;

use crate::config::RoutePolicyConfig;
use crate::infrastructure::rate_limiter::{RateLimitPolicy, RateLimiterService};
use crate::presentation::models::RateLimitRejection;

/// Per-route admission state handed to the middleware at router setup
///
/// All routes share one service (and therefore one client-key store); each
/// route carries its own fixed policy and fallback flag.
#[derive(Clone)]
pub struct RouteLimit {
    service: Arc<RateLimiterService>,
    policy: RateLimitPolicy,
    fallback_available: bool,
}

impl RouteLimit {
    pub fn new(service: Arc<RateLimiterService>, route: &RoutePolicyConfig) -> Self {
        Self {
            service,
            policy: route.policy(),
            fallback_available: route.fallback_available,
        }
    }
}

/// Request admission middleware
pub async fn rate_limit_middleware(
    State(limit): State<RouteLimit>,
    request: Request,
    next: Next,
) -> Response {
    let key = client_key(&request);
    let result = limit.service.admit(&key, &limit.policy).await;

    if result.allowed {
        let mut response = next.run(request).await;

        let headers = response.headers_mut();
        headers.insert("x-ratelimit-limit", HeaderValue::from(result.limit));
        headers.insert("x-ratelimit-remaining", HeaderValue::from(result.remaining));

        return response;
    }

    let retry_after = result.retry_after.unwrap_or(1);
    tracing::warn!(
        key = %key,
        retry_after = retry_after,
        "Rate limit exceeded"
    );

    let mut response = (
        StatusCode::TOO_MANY_REQUESTS,
        Json(RateLimitRejection {
            error: format!(
                "Too many requests. Please retry after {} seconds.",
                retry_after
            ),
            retry_after,
            fallback_available: limit.fallback_available,
        }),
    )
        .into_response();

    let headers = response.headers_mut();
    headers.insert("x-ratelimit-limit", HeaderValue::from(result.limit));
    headers.insert("x-ratelimit-remaining", HeaderValue::from(0u32));
    let retry_after_val = retry_after.to_string();
    if let Ok(val) = HeaderValue::from_str(&retry_after_val) {
        headers.insert("retry-after", val);
    } else {
        headers.insert("retry-after", HeaderValue::from_static("60"));
    }

    response
}

/// Derive the client key for admission decisions
///
/// Proxy headers win over the socket address so per-client limits survive a
/// reverse proxy; without either, requests pool under one key.
fn client_key(request: &Request) -> String {
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            request
                .headers()
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .map(|s| s.to_string())
        })
        .or_else(|| {
            request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ci| ci.0.ip().to_string())
        })
        .unwrap_or_else(|| "unknown-ip".to_string())
}

/// Request logging middleware with timing and request ID
pub async fn request_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let request_id = Uuid::new_v4();
    let start_time = Instant::now();

    tracing::info!(
        request_id = %request_id,
        method = %method,
        uri = %uri,
        "Processing request"
    );

    let response = next.run(request).await;
    let duration = start_time.elapsed();

    tracing::info!(
        request_id = %request_id,
        method = %method,
        uri = %uri,
        status = %response.status(),
        duration_ms = duration.as_millis(),
        "Request completed"
    );

    response
}
