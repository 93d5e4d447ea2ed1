//! Weather Middleware
//!
//! Per-client rate limiting for the lookup route and HTTP metrics for
//! every route.

use axum::body::Body;
use axum::extract::{ConnectInfo, MatchedPath, State};
use axum::http::{HeaderValue, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use kernel::error::app_error::AppError;
use platform::client::{ForwardedPolicy, client_identity};
use platform::rate_limit::{Admission, RateLimiter};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crate::metrics::WeatherMetrics;

/// Middleware state
pub struct RateLimitState<L>
where
    L: RateLimiter + 'static,
{
    pub limiter: Arc<L>,
    pub metrics: Arc<WeatherMetrics>,
    pub forwarded: ForwardedPolicy,
}

impl<L> Clone for RateLimitState<L>
where
    L: RateLimiter + 'static,
{
    fn clone(&self) -> Self {
        Self {
            limiter: self.limiter.clone(),
            metrics: self.metrics.clone(),
            forwarded: self.forwarded,
        }
    }
}

/// Admit or reject the request before it reaches the handler
///
/// Allowed responses carry `X-RateLimit-Limit` / `X-RateLimit-Remaining`;
/// denied ones are `429` with `Retry-After`.
pub async fn enforce_rate_limit<L>(
    State(state): State<RateLimitState<L>>,
    req: Request<Body>,
    next: Next,
) -> Response
where
    L: RateLimiter + 'static,
{
    let peer_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip());

    let identity = client_identity(req.headers(), peer_ip, state.forwarded);

    match state.limiter.admit(&identity) {
        Admission::Allowed { remaining } => {
            let mut response = next.run(req).await;
            let headers = response.headers_mut();
            headers.insert("x-ratelimit-limit", HeaderValue::from(state.limiter.limit()));
            headers.insert("x-ratelimit-remaining", HeaderValue::from(remaining));
            response
        }
        Admission::Denied { retry_after } => {
            state.metrics.rate_limit_exceeded.inc();
            tracing::warn!(
                client = %identity,
                retry_after_secs = retry_after.as_secs_f64(),
                "Rate limit exceeded"
            );

            AppError::too_many_requests("rate limit exceeded")
                .with_retry_after(retry_after)
                .into_response()
        }
    }
}

/// `path` label for requests no route matched
pub const UNMATCHED_PATH: &str = "unmatched";

/// Record request count and latency per route
pub async fn track_metrics(
    State(metrics): State<Arc<WeatherMetrics>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let started = Instant::now();
    // Route template, never the raw path, so the label set stays bounded
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| UNMATCHED_PATH.to_owned());
    let method = req.method().to_string();

    let response = next.run(req).await;

    let status = response.status().as_u16().to_string();
    let labels = [method.as_str(), path.as_str(), status.as_str()];
    metrics.http_requests.with_label_values(&labels).inc();
    metrics
        .http_request_duration
        .with_label_values(&labels)
        .observe(started.elapsed().as_secs_f64());

    response
}
