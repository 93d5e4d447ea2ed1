//! HTTP Handlers

use axum::Json;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use kernel::error::app_error::AppError;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::application::get_weather::GetWeatherUseCase;
use crate::domain::ports::{WeatherCache, WeatherProvider};
use crate::metrics::WeatherMetrics;
use crate::presentation::dto::{ErrorResponse, WeatherQuery, WeatherResponse};

/// Shared state for weather handlers
pub struct WeatherAppState<C, P>
where
    C: WeatherCache,
    P: WeatherProvider,
{
    pub use_case: Arc<GetWeatherUseCase<C, P>>,
    /// Forced stop for in-flight lookups
    ///
    /// Graceful shutdown lets lookups finish; this fires only when the drain
    /// deadline passes. A caller that disconnects simply drops the handler.
    pub cancel: CancellationToken,
}

// Manual impl: the ports themselves need not be Clone
impl<C, P> Clone for WeatherAppState<C, P>
where
    C: WeatherCache,
    P: WeatherProvider,
{
    fn clone(&self) -> Self {
        Self {
            use_case: self.use_case.clone(),
            cancel: self.cancel.clone(),
        }
    }
}

// ============================================================================
// Weather
// ============================================================================

/// GET /weather?city=<name>
pub async fn get_weather<C, P>(
    State(state): State<WeatherAppState<C, P>>,
    Query(query): Query<WeatherQuery>,
) -> Response
where
    C: WeatherCache + Sync + 'static,
    P: WeatherProvider + Sync + 'static,
{
    let Some(city) = query.city.filter(|c| !c.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("city query parameter is required")),
        )
            .into_response();
    };

    match state.use_case.execute_with_cancel(&city, &state.cancel).await {
        Ok(weather) => Json(WeatherResponse::from(&weather)).into_response(),
        Err(e) => e.into_response(),
    }
}

// ============================================================================
// Operational
// ============================================================================

/// GET /metrics
pub async fn metrics(State(metrics): State<Arc<WeatherMetrics>>) -> Result<Response, AppError> {
    let body = metrics.render().map_err(|e| {
        tracing::error!(error = %e, "Failed to encode metrics");
        AppError::internal("failed to encode metrics").with_source(e)
    })?;

    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
        .into_response())
}

/// GET /health
pub async fn health() -> &'static str {
    "ok"
}
