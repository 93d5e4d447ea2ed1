//! Port Traits
//!
//! Interfaces for the cache and the remote provider. Implementations are in
//! the infrastructure layer.

use crate::domain::entities::Weather;
use crate::domain::value_objects::Location;
use crate::error::{CacheError, ProviderError};
use std::time::Duration;

/// Weather cache trait
///
/// Implementations own serialization of [`Weather`].
#[trait_variant::make(WeatherCache: Send)]
pub trait LocalWeatherCache {
    /// Look up a cached record
    ///
    /// A key that does not exist is `Ok(None)`, never an error.
    async fn get(&self, location: &Location) -> Result<Option<Weather>, CacheError>;

    /// Store a record, replacing any previous one, expiring after `ttl`
    async fn set(
        &self,
        location: &Location,
        weather: &Weather,
        ttl: Duration,
    ) -> Result<(), CacheError>;
}

/// Weather provider trait
#[trait_variant::make(WeatherProvider: Send)]
pub trait LocalWeatherProvider {
    /// Fetch current conditions from the remote source
    ///
    /// Non-success responses and malformed payloads are errors; a partial
    /// record is never returned.
    async fn fetch_weather(&self, location: &Location) -> Result<Weather, ProviderError>;
}
