//! Prometheus Metrics
//!
//! Counters and histograms for the cache, the external provider, rate
//! limiting and HTTP traffic. Each [`WeatherMetrics`] owns its own
//! registry and is shared by `Arc`.

use prometheus::core::Collector;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

pub struct WeatherMetrics {
    registry: Registry,
    pub cache_hits: IntCounter,
    pub cache_misses: IntCounter,
    pub cache_errors: IntCounter,
    pub external_api_calls: IntCounterVec,
    pub external_api_call_duration: HistogramVec,
    pub rate_limit_exceeded: IntCounter,
    pub http_requests: IntCounterVec,
    pub http_request_duration: HistogramVec,
}

impl WeatherMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let cache_hits = register(
            &registry,
            IntCounter::new("weather_api_cache_hits_total", "Total number of cache hits")?,
        )?;
        let cache_misses = register(
            &registry,
            IntCounter::new("weather_api_cache_misses_total", "Total number of cache misses")?,
        )?;
        let cache_errors = register(
            &registry,
            IntCounter::new("weather_api_cache_errors_total", "Total number of cache errors")?,
        )?;
        let external_api_calls = register(
            &registry,
            IntCounterVec::new(
                Opts::new(
                    "weather_api_external_api_calls_total",
                    "Total number of external API calls",
                ),
                &["provider", "status"],
            )?,
        )?;
        let external_api_call_duration = register(
            &registry,
            HistogramVec::new(
                HistogramOpts::new(
                    "weather_api_external_api_call_duration_seconds",
                    "External API call latency in seconds",
                ),
                &["provider"],
            )?,
        )?;
        let rate_limit_exceeded = register(
            &registry,
            IntCounter::new(
                "weather_api_rate_limit_exceeded_total",
                "Total number of requests that exceeded rate limit",
            )?,
        )?;
        let http_requests = register(
            &registry,
            IntCounterVec::new(
                Opts::new("weather_api_http_requests_total", "Total number of HTTP requests"),
                &["method", "path", "status"],
            )?,
        )?;
        let http_request_duration = register(
            &registry,
            HistogramVec::new(
                HistogramOpts::new(
                    "weather_api_http_request_duration_seconds",
                    "HTTP request latency in seconds",
                ),
                &["method", "path", "status"],
            )?,
        )?;

        Ok(Self {
            registry,
            cache_hits,
            cache_misses,
            cache_errors,
            external_api_calls,
            external_api_call_duration,
            rate_limit_exceeded,
            http_requests,
            http_request_duration,
        })
    }

    /// Text exposition of every registered metric
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

fn register<C>(registry: &Registry, collector: C) -> Result<C, prometheus::Error>
where
    C: Collector + Clone + 'static,
{
    registry.register(Box::new(collector.clone()))?;
    Ok(collector)
}
