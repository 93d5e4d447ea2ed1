//! Application Configuration
//!
//! Configuration for the weather application layer.

use std::time::Duration;

/// How long a fetched record stays in the cache
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(12 * 60 * 60);

/// Weather application configuration
#[derive(Debug, Clone)]
pub struct WeatherConfig {
    /// TTL passed to the cache on every repopulate
    pub cache_ttl: Duration,
    /// Upper bound for a single cache read or write
    pub cache_timeout: Duration,
    /// Upper bound for a single provider fetch
    pub provider_timeout: Duration,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_CACHE_TTL,
            cache_timeout: Duration::from_secs(2),
            provider_timeout: Duration::from_secs(10),
        }
    }
}
