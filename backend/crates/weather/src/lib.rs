//! Weather Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Weather entity, Location value object, port traits
//! - `application/` - Cache-aside use case and its configuration
//! - `infra/` - Redis cache and WeatherAPI.com provider adapters
//! - `presentation/` - HTTP handlers, DTOs, middleware, router
//!
//! ## Failure Model
//! - The provider is the only source of truth; its failure fails the request
//! - The cache is an optimization: read and write failures are logged,
//!   counted and otherwise ignored
//! - Rate limiting runs before the use case; denied calls never reach it

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod metrics;
pub mod presentation;

// Re-exports for convenience
pub use application::config::WeatherConfig;
pub use application::get_weather::GetWeatherUseCase;
pub use error::{CacheError, ProviderError, WeatherError, WeatherResult};
pub use infra::redis::RedisWeatherCache;
pub use infra::weatherapi::WeatherApiClient;
pub use metrics::WeatherMetrics;
pub use presentation::router::weather_router;

#[cfg(test)]
mod tests;
