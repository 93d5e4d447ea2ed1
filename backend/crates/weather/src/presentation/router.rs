//! Weather Router

use axum::{Router, middleware, routing::get};
use platform::client::ForwardedPolicy;
use platform::rate_limit::RateLimiter;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::application::get_weather::GetWeatherUseCase;
use crate::domain::ports::{WeatherCache, WeatherProvider};
use crate::metrics::WeatherMetrics;
use crate::presentation::handlers::{self, WeatherAppState};
use crate::presentation::middleware::{RateLimitState, enforce_rate_limit, track_metrics};

/// Create the weather router
///
/// `/weather` sits behind the rate limiter; `/metrics` and `/health` do not.
/// `cancel` aborts in-flight lookups; it should only fire once the server
/// has stopped waiting for them to drain.
pub fn weather_router<C, P, L>(
    use_case: Arc<GetWeatherUseCase<C, P>>,
    limiter: Arc<L>,
    metrics: Arc<WeatherMetrics>,
    forwarded: ForwardedPolicy,
    cancel: CancellationToken,
) -> Router
where
    C: WeatherCache + Sync + 'static,
    P: WeatherProvider + Sync + 'static,
    L: RateLimiter + 'static,
{
    let rate_limit = RateLimitState {
        limiter,
        metrics: metrics.clone(),
        forwarded,
    };

    let lookup = Router::new()
        .route("/weather", get(handlers::get_weather::<C, P>))
        .route_layer(middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit::<L>,
        ))
        .with_state(WeatherAppState { use_case, cancel });

    let operational = Router::new()
        .route("/metrics", get(handlers::metrics))
        .route("/health", get(handlers::health))
        .with_state(metrics.clone());

    lookup
        .merge(operational)
        .layer(middleware::from_fn_with_state(metrics, track_metrics))
}
