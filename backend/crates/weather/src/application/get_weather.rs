//! Get Weather Use Case
//!
//! Cache-aside retrieval: validate, try the cache, fall back to the provider,
//! repopulate the cache. Cache failures are absorbed here and never change
//! the outcome of a lookup.

use crate::application::config::WeatherConfig;
use crate::domain::entities::Weather;
use crate::domain::ports::{WeatherCache, WeatherProvider};
use crate::domain::value_objects::Location;
use crate::error::{CacheError, ProviderError, WeatherError, WeatherResult};
use crate::metrics::WeatherMetrics;
use chrono::Utc;
use std::sync::Arc;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

/// Get Weather Use Case
pub struct GetWeatherUseCase<C, P>
where
    C: WeatherCache,
    P: WeatherProvider,
{
    cache: Arc<C>,
    provider: Arc<P>,
    config: Arc<WeatherConfig>,
    metrics: Arc<WeatherMetrics>,
}

impl<C, P> GetWeatherUseCase<C, P>
where
    C: WeatherCache,
    P: WeatherProvider,
{
    pub fn new(
        cache: Arc<C>,
        provider: Arc<P>,
        config: Arc<WeatherConfig>,
        metrics: Arc<WeatherMetrics>,
    ) -> Self {
        Self {
            cache,
            provider,
            config,
            metrics,
        }
    }

    pub async fn execute(&self, raw_location: &str) -> WeatherResult<Weather> {
        let location = Location::parse(raw_location)?;

        if let Some(cached) = self.lookup(&location).await {
            return Ok(cached);
        }

        let fetched = timeout(
            self.config.provider_timeout,
            self.provider.fetch_weather(&location),
        )
        .await
        .unwrap_or(Err(ProviderError::Timeout(self.config.provider_timeout)));

        let mut weather = fetched.map_err(WeatherError::WeatherUnavailable)?;
        weather.updated_at = Utc::now();

        self.store(&location, &weather).await;

        tracing::info!(location = %location, "Fetched weather from provider");

        Ok(weather)
    }

    /// Like [`execute`](Self::execute), but gives up as soon as `cancel` fires
    ///
    /// Abandoning the lookup drops the in-flight cache or provider call.
    pub async fn execute_with_cancel(
        &self,
        raw_location: &str,
        cancel: &CancellationToken,
    ) -> WeatherResult<Weather> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(WeatherError::Cancelled),
            result = self.execute(raw_location) => result,
        }
    }

    /// Cache read; `None` means "go to the provider"
    async fn lookup(&self, location: &Location) -> Option<Weather> {
        let result = timeout(self.config.cache_timeout, self.cache.get(location))
            .await
            .unwrap_or(Err(CacheError::Timeout(self.config.cache_timeout)));

        match result {
            Ok(Some(weather)) => {
                tracing::debug!(location = %location, "Cache hit");
                self.metrics.cache_hits.inc();
                Some(weather)
            }
            Ok(None) => {
                tracing::debug!(location = %location, "Cache miss");
                self.metrics.cache_misses.inc();
                None
            }
            Err(e) => {
                tracing::warn!(
                    location = %location,
                    error = %e,
                    "Cache read failed, treating as miss"
                );
                self.metrics.cache_errors.inc();
                self.metrics.cache_misses.inc();
                None
            }
        }
    }

    /// Best-effort cache write
    async fn store(&self, location: &Location, weather: &Weather) {
        let result = timeout(
            self.config.cache_timeout,
            self.cache.set(location, weather, self.config.cache_ttl),
        )
        .await
        .unwrap_or(Err(CacheError::Timeout(self.config.cache_timeout)));

        if let Err(e) = result {
            tracing::warn!(location = %location, error = %e, "Failed to cache weather data");
            self.metrics.cache_errors.inc();
        }
    }
}
