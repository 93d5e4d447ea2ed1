//! API DTOs (Data Transfer Objects)

use crate::domain::entities::Weather;
use serde::{Deserialize, Serialize};

// ============================================================================
// Weather
// ============================================================================

/// Query string of `GET /weather`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeatherQuery {
    pub city: Option<String>,
}

/// Weather response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherResponse {
    pub location: String,
    pub temperature_c: f64,
    pub condition_text: String,
}

impl From<&Weather> for WeatherResponse {
    fn from(weather: &Weather) -> Self {
        Self {
            location: weather.location.name.clone(),
            temperature_c: weather.current.temperature.celsius,
            condition_text: weather.current.condition.text.clone(),
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Error body returned by the weather routes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
