//! Presentation Layer
//!
//! HTTP handlers, DTOs, router, and middleware.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use handlers::WeatherAppState;
pub use middleware::{RateLimitState, enforce_rate_limit, track_metrics};
pub use router::weather_router;
