//! Redis Cache Implementation

use crate::domain::entities::Weather;
use crate::domain::ports::WeatherCache;
use crate::domain::value_objects::Location;
use crate::error::CacheError;
use ::redis::AsyncCommands;
use ::redis::aio::ConnectionManager;
use std::time::Duration;

const KEY_PREFIX: &str = "weather:";

/// Redis-backed weather cache
///
/// Wraps a multiplexed [`ConnectionManager`]; clones share the same
/// connection and reconnect transparently.
#[derive(Clone)]
pub struct RedisWeatherCache {
    conn: ConnectionManager,
}

impl RedisWeatherCache {
    /// Connect and verify the server answers `PING`
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client = ::redis::Client::open(url)?;
        let mut conn = ConnectionManager::new(client).await?;

        let _: String = ::redis::cmd("PING").query_async(&mut conn).await?;

        tracing::info!("Connected to Redis");

        Ok(Self { conn })
    }
}

/// Cache key for a location; lookups are case-insensitive
pub fn cache_key(location: &Location) -> String {
    format!("{KEY_PREFIX}{}", location.as_str().to_lowercase())
}

impl WeatherCache for RedisWeatherCache {
    async fn get(&self, location: &Location) -> Result<Option<Weather>, CacheError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(cache_key(location)).await?;

        raw.map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(CacheError::from)
    }

    async fn set(
        &self,
        location: &Location,
        weather: &Weather,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let payload = serde_json::to_string(weather)?;
        // EX 0 is rejected by Redis
        let seconds = ttl.as_secs().max(1);

        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(cache_key(location), payload, seconds)
            .await?;

        Ok(())
    }
}
