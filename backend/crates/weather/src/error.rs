//! Weather Error Types
//!
//! This module provides weather-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use crate::domain::value_objects::LocationError;
use crate::presentation::dto::ErrorResponse;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::kind::ErrorKind;
use std::time::Duration;
use thiserror::Error;

/// Weather-specific result type alias
pub type WeatherResult<T> = Result<T, WeatherError>;

/// Terminal errors of a weather lookup
///
/// Cache failures never appear here; they are recovered inside the use case.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// Empty or whitespace-only location
    #[error("invalid location: {0}")]
    InvalidLocation(#[from] LocationError),

    /// Provider fetch failed
    #[error("weather service unavailable: {0}")]
    WeatherUnavailable(#[source] ProviderError),

    /// Caller gave up before the lookup finished
    #[error("weather lookup cancelled")]
    Cancelled,

    /// Anything else
    #[error("internal error: {0}")]
    Unknown(String),
}

/// Cache read/write failure, internal only
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(#[from] redis::RedisError),

    #[error("cache payload error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("cache operation timed out after {0:?}")]
    Timeout(Duration),
}

/// Remote provider failure
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("failed to fetch weather data: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API returned non-OK status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("failed to parse weather data: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("weather provider timed out after {0:?}")]
    Timeout(Duration),
}

impl WeatherError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            WeatherError::InvalidLocation(_) => ErrorKind::BadRequest,
            WeatherError::WeatherUnavailable(_) => ErrorKind::ServiceUnavailable,
            WeatherError::Cancelled => ErrorKind::RequestTimeout,
            WeatherError::Unknown(_) => ErrorKind::InternalServerError,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Message safe to show callers; upstream detail stays in the logs
    pub fn public_message(&self) -> String {
        match self {
            WeatherError::InvalidLocation(_) => self.to_string(),
            WeatherError::WeatherUnavailable(_) => {
                "weather service is currently unavailable".to_string()
            }
            WeatherError::Cancelled => "request cancelled".to_string(),
            WeatherError::Unknown(_) => "internal server error".to_string(),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            WeatherError::WeatherUnavailable(cause) => {
                tracing::error!(error = %cause, "Weather provider failed");
            }
            WeatherError::Unknown(msg) => {
                tracing::error!(message = %msg, "Weather internal error");
            }
            WeatherError::Cancelled => {
                tracing::info!("Weather lookup cancelled by caller");
            }
            WeatherError::InvalidLocation(_) => {
                tracing::debug!(error = %self, "Rejected weather lookup");
            }
        }
    }
}

impl IntoResponse for WeatherError {
    fn into_response(self) -> Response {
        self.log();
        let status = self.status_code();
        (status, Json(ErrorResponse::new(self.public_message()))).into_response()
    }
}
