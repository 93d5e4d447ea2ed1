//! Unit tests for the weather crate
//! Use case behaviour against counting mock ports, plus router-level checks.

#[cfg(test)]
mod support {
    use crate::domain::entities::Weather;
    use crate::domain::ports::{WeatherCache, WeatherProvider};
    use crate::domain::value_objects::Location;
    use crate::error::{CacheError, ProviderError};
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    pub fn sample_weather(name: &str) -> Weather {
        let mut weather = Weather::default();
        weather.location.name = name.to_string();
        weather.location.country = "Testland".to_string();
        weather.current.temperature.celsius = 18.5;
        weather.current.condition.text = "Sunny".to_string();
        weather
    }

    fn backend_error() -> CacheError {
        CacheError::Backend(redis::RedisError::from((
            redis::ErrorKind::IoError,
            "connection refused",
        )))
    }

    // ------------------------------------------------------------------------
    // Cache
    // ------------------------------------------------------------------------

    #[derive(Default)]
    pub struct MockCache {
        entries: Mutex<HashMap<String, Weather>>,
        last_ttl: Mutex<Option<Duration>>,
        pub get_calls: AtomicUsize,
        pub set_calls: AtomicUsize,
        pub fail_get: bool,
        pub fail_set: bool,
        /// Delay applied to every `get`
        pub get_delay: Option<Duration>,
    }

    impl MockCache {
        pub fn with_entry(key: &str, weather: Weather) -> Self {
            let cache = Self::default();
            cache.entries.lock().insert(key.to_string(), weather);
            cache
        }

        pub fn failing_get() -> Self {
            Self {
                fail_get: true,
                ..Self::default()
            }
        }

        pub fn failing_set() -> Self {
            Self {
                fail_set: true,
                ..Self::default()
            }
        }

        pub fn slow_get(delay: Duration) -> Self {
            Self {
                get_delay: Some(delay),
                ..Self::default()
            }
        }

        pub fn gets(&self) -> usize {
            self.get_calls.load(Ordering::SeqCst)
        }

        pub fn sets(&self) -> usize {
            self.set_calls.load(Ordering::SeqCst)
        }

        pub fn stored(&self, key: &str) -> Option<Weather> {
            self.entries.lock().get(key).cloned()
        }

        pub fn last_ttl(&self) -> Option<Duration> {
            *self.last_ttl.lock()
        }
    }

    impl WeatherCache for MockCache {
        async fn get(&self, location: &Location) -> Result<Option<Weather>, CacheError> {
            self.get_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.get_delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail_get {
                return Err(backend_error());
            }
            Ok(self.entries.lock().get(location.as_str()).cloned())
        }

        async fn set(
            &self,
            location: &Location,
            weather: &Weather,
            ttl: Duration,
        ) -> Result<(), CacheError> {
            self.set_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_set {
                return Err(backend_error());
            }
            *self.last_ttl.lock() = Some(ttl);
            self.entries
                .lock()
                .insert(location.as_str().to_string(), weather.clone());
            Ok(())
        }
    }

    // ------------------------------------------------------------------------
    // Provider
    // ------------------------------------------------------------------------

    pub enum Behavior {
        Succeed(Weather),
        Fail,
        /// Sleep before succeeding
        Slow(Duration, Weather),
    }

    pub struct MockProvider {
        behavior: Behavior,
        pub calls: AtomicUsize,
    }

    impl MockProvider {
        pub fn new(behavior: Behavior) -> Self {
            Self {
                behavior,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn succeeding(name: &str) -> Self {
            Self::new(Behavior::Succeed(sample_weather(name)))
        }

        pub fn failing() -> Self {
            Self::new(Behavior::Fail)
        }

        pub fn count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl WeatherProvider for MockProvider {
        async fn fetch_weather(&self, _location: &Location) -> Result<Weather, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.behavior {
                Behavior::Succeed(weather) => Ok(weather.clone()),
                Behavior::Fail => Err(ProviderError::UnexpectedStatus {
                    status: 500,
                    body: "upstream exploded".to_string(),
                }),
                Behavior::Slow(delay, weather) => {
                    tokio::time::sleep(*delay).await;
                    Ok(weather.clone())
                }
            }
        }
    }
}

#[cfg(test)]
mod use_case_tests {
    use super::support::*;
    use crate::application::config::{DEFAULT_CACHE_TTL, WeatherConfig};
    use crate::application::get_weather::GetWeatherUseCase;
    use crate::error::{ProviderError, WeatherError};
    use crate::metrics::WeatherMetrics;
    use chrono::Utc;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    struct Harness {
        cache: Arc<MockCache>,
        provider: Arc<MockProvider>,
        metrics: Arc<WeatherMetrics>,
        use_case: GetWeatherUseCase<MockCache, MockProvider>,
    }

    fn harness(cache: MockCache, provider: MockProvider) -> Harness {
        let cache = Arc::new(cache);
        let provider = Arc::new(provider);
        let metrics = Arc::new(WeatherMetrics::new().unwrap());
        let use_case = GetWeatherUseCase::new(
            cache.clone(),
            provider.clone(),
            Arc::new(WeatherConfig::default()),
            metrics.clone(),
        );
        Harness {
            cache,
            provider,
            metrics,
            use_case,
        }
    }

    #[tokio::test]
    async fn test_cache_hit_skips_provider() {
        let cached = sample_weather("Cached City");
        let h = harness(
            MockCache::with_entry("London", cached.clone()),
            MockProvider::succeeding("Fresh City"),
        );

        let weather = h.use_case.execute("London").await.unwrap();

        assert_eq!(weather, cached);
        assert_eq!(h.provider.count(), 0);
        assert_eq!(h.cache.sets(), 0);
        assert_eq!(h.metrics.cache_hits.get(), 1);
        assert_eq!(h.metrics.cache_misses.get(), 0);
    }

    #[tokio::test]
    async fn test_cache_miss_fetches_and_populates() {
        let h = harness(MockCache::default(), MockProvider::succeeding("London"));

        let weather = h.use_case.execute("London").await.unwrap();

        assert_eq!(weather.location.name, "London");
        assert_eq!(h.provider.count(), 1);
        assert_eq!(h.cache.sets(), 1);
        assert_eq!(h.cache.stored("London"), Some(weather));
        assert_eq!(h.cache.last_ttl(), Some(DEFAULT_CACHE_TTL));
        assert_eq!(h.metrics.cache_misses.get(), 1);
    }

    #[tokio::test]
    async fn test_second_lookup_is_served_from_cache() {
        let h = harness(MockCache::default(), MockProvider::succeeding("London"));

        let first = h.use_case.execute("London").await.unwrap();
        let second = h.use_case.execute("London").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(h.provider.count(), 1);
        assert_eq!(h.metrics.cache_hits.get(), 1);
    }

    #[tokio::test]
    async fn test_fetched_record_is_stamped() {
        let h = harness(MockCache::default(), MockProvider::succeeding("London"));
        let before = Utc::now();

        let weather = h.use_case.execute("London").await.unwrap();

        assert!(weather.updated_at >= before);
        assert!(weather.updated_at <= Utc::now());
    }

    #[tokio::test]
    async fn test_location_is_trimmed_before_lookup() {
        let h = harness(MockCache::default(), MockProvider::succeeding("Paris"));

        h.use_case.execute("  Paris \t").await.unwrap();

        assert!(h.cache.stored("Paris").is_some());
    }

    #[tokio::test]
    async fn test_cache_read_failure_falls_through_to_provider() {
        let h = harness(MockCache::failing_get(), MockProvider::succeeding("London"));

        let weather = h.use_case.execute("London").await.unwrap();

        assert_eq!(weather.location.name, "London");
        assert_eq!(h.provider.count(), 1);
        assert_eq!(h.metrics.cache_errors.get(), 1);
        assert_eq!(h.metrics.cache_misses.get(), 1);
    }

    #[tokio::test]
    async fn test_cache_write_failure_is_ignored() {
        let h = harness(MockCache::failing_set(), MockProvider::succeeding("London"));

        let weather = h.use_case.execute("London").await.unwrap();

        assert_eq!(weather.location.name, "London");
        assert_eq!(h.cache.sets(), 1);
        assert_eq!(h.metrics.cache_errors.get(), 1);
    }

    #[tokio::test]
    async fn test_provider_failure_is_unavailable_and_not_cached() {
        let h = harness(MockCache::default(), MockProvider::failing());

        let err = h.use_case.execute("London").await.unwrap_err();

        assert!(matches!(
            err,
            WeatherError::WeatherUnavailable(ProviderError::UnexpectedStatus { status: 500, .. })
        ));
        assert_eq!(h.cache.sets(), 0);
    }

    #[tokio::test]
    async fn test_blank_location_touches_no_port() {
        for raw in ["", "   ", "\t\n"] {
            let h = harness(MockCache::default(), MockProvider::succeeding("London"));

            let err = h.use_case.execute(raw).await.unwrap_err();

            assert!(matches!(err, WeatherError::InvalidLocation(_)), "{raw:?}");
            assert_eq!(h.cache.gets(), 0);
            assert_eq!(h.cache.sets(), 0);
            assert_eq!(h.provider.count(), 0);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_cache_is_treated_as_miss() {
        let h = harness(
            MockCache::slow_get(Duration::from_secs(30)),
            MockProvider::succeeding("London"),
        );

        let weather = h.use_case.execute("London").await.unwrap();

        assert_eq!(weather.location.name, "London");
        assert_eq!(h.provider.count(), 1);
        assert_eq!(h.metrics.cache_errors.get(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_provider_times_out() {
        let h = harness(
            MockCache::default(),
            MockProvider::new(Behavior::Slow(
                Duration::from_secs(60),
                sample_weather("London"),
            )),
        );

        let err = h.use_case.execute("London").await.unwrap_err();

        assert!(matches!(
            err,
            WeatherError::WeatherUnavailable(ProviderError::Timeout(_))
        ));
        assert_eq!(h.cache.sets(), 0);
    }

    #[tokio::test]
    async fn test_already_cancelled_lookup_does_nothing() {
        let h = harness(MockCache::default(), MockProvider::succeeding("London"));
        let token = CancellationToken::new();
        token.cancel();

        let err = h
            .use_case
            .execute_with_cancel("London", &token)
            .await
            .unwrap_err();

        assert!(matches!(err, WeatherError::Cancelled));
        assert_eq!(h.cache.gets(), 0);
        assert_eq!(h.provider.count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_fetch_skips_cache_write() {
        let h = harness(
            MockCache::default(),
            MockProvider::new(Behavior::Slow(
                Duration::from_secs(5),
                sample_weather("London"),
            )),
        );
        let token = CancellationToken::new();

        let (result, ()) = tokio::join!(h.use_case.execute_with_cancel("London", &token), async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            token.cancel();
        });

        assert!(matches!(result, Err(WeatherError::Cancelled)));
        assert_eq!(h.provider.count(), 1);
        assert_eq!(h.cache.sets(), 0);
    }
}

#[cfg(test)]
mod router_tests {
    use super::support::*;
    use crate::application::config::WeatherConfig;
    use crate::application::get_weather::GetWeatherUseCase;
    use crate::metrics::WeatherMetrics;
    use crate::presentation::middleware::UNMATCHED_PATH;
    use crate::presentation::router::weather_router;
    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::extract::ConnectInfo;
    use axum::http::{Request, StatusCode, header};
    use platform::client::ForwardedPolicy;
    use platform::rate_limit::{FixedWindowRateLimiter, RateLimitConfig};
    use std::net::SocketAddr;
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;
    use tower::ServiceExt;

    fn app_with(
        provider: MockProvider,
        max_requests: u32,
        forwarded: ForwardedPolicy,
    ) -> (Router, Arc<WeatherMetrics>) {
        let metrics = Arc::new(WeatherMetrics::new().unwrap());
        let use_case = Arc::new(GetWeatherUseCase::new(
            Arc::new(MockCache::default()),
            Arc::new(provider),
            Arc::new(WeatherConfig::default()),
            metrics.clone(),
        ));
        let limiter = Arc::new(FixedWindowRateLimiter::new(RateLimitConfig::new(
            max_requests,
            60,
        )));
        let router = weather_router(
            use_case,
            limiter,
            metrics.clone(),
            forwarded,
            CancellationToken::new(),
        );
        (router, metrics)
    }

    fn app(provider: MockProvider, max_requests: u32) -> (Router, Arc<WeatherMetrics>) {
        app_with(provider, max_requests, ForwardedPolicy::Ignore)
    }

    /// Request as seen from socket peer `peer`
    fn get(uri: &str, peer: &str) -> Request<Body> {
        let addr = SocketAddr::new(peer.parse().unwrap(), 50_000);
        let mut req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        req
    }

    fn forwarded_get(uri: &str, peer: &str, xff: &str) -> Request<Body> {
        let mut req = get(uri, peer);
        req.headers_mut()
            .insert("x-forwarded-for", xff.parse().unwrap());
        req
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_weather_ok_response_shape() {
        let (app, _) = app(MockProvider::succeeding("London"), 5);

        let response = app
            .oneshot(get("/weather?city=London", "192.0.2.1"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-ratelimit-limit"], "5");
        assert_eq!(response.headers()["x-ratelimit-remaining"], "4");
        assert_eq!(
            json_body(response).await,
            serde_json::json!({
                "location": "London",
                "temperature_c": 18.5,
                "condition_text": "Sunny"
            })
        );
    }

    #[tokio::test]
    async fn test_rate_limit_denies_after_quota() {
        let (app, metrics) = app(MockProvider::succeeding("London"), 2);

        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(get("/weather?city=London", "192.0.2.1"))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let denied = app
            .clone()
            .oneshot(get("/weather?city=London", "192.0.2.1"))
            .await
            .unwrap();
        assert_eq!(denied.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(denied.headers().contains_key(header::RETRY_AFTER));
        assert_eq!(metrics.rate_limit_exceeded.get(), 1);

        // Another client still has its own quota
        let other = app
            .oneshot(get("/weather?city=London", "198.51.100.7"))
            .await
            .unwrap();
        assert_eq!(other.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_rotating_forwarded_header_does_not_reset_quota() {
        let (app, _) = app(MockProvider::succeeding("London"), 1);

        let first = app
            .clone()
            .oneshot(forwarded_get("/weather?city=London", "203.0.113.9", "10.0.0.0"))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        for i in 1..20 {
            let xff = format!("10.0.0.{i}");
            let response = app
                .clone()
                .oneshot(forwarded_get("/weather?city=London", "203.0.113.9", &xff))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS, "{xff}");
        }
    }

    #[tokio::test]
    async fn test_trusted_proxy_keys_on_forwarded_client() {
        let (app, _) = app_with(
            MockProvider::succeeding("London"),
            1,
            ForwardedPolicy::TrustProxy,
        );

        // Same proxy peer, two different clients behind it
        for client in ["198.51.100.1", "198.51.100.2"] {
            let response = app
                .clone()
                .oneshot(forwarded_get("/weather?city=London", "127.0.0.1", client))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{client}");
        }

        // A spoofed left-most entry does not change the proxy-appended hop
        let response = app
            .oneshot(forwarded_get(
                "/weather?city=London",
                "127.0.0.1",
                "10.9.9.9, 198.51.100.1",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_missing_city_is_bad_request() {
        let (app, _) = app(MockProvider::succeeding("London"), 5);

        for uri in ["/weather", "/weather?city="] {
            let response = app.clone().oneshot(get(uri, "192.0.2.1")).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(
                json_body(response).await["message"],
                "city query parameter is required"
            );
        }
    }

    #[tokio::test]
    async fn test_blank_city_is_bad_request() {
        let (app, _) = app(MockProvider::succeeding("London"), 5);

        let response = app
            .oneshot(get("/weather?city=%20%20", "192.0.2.1"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_provider_failure_is_service_unavailable() {
        let (app, _) = app(MockProvider::failing(), 5);

        let response = app
            .oneshot(get("/weather?city=London", "192.0.2.1"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = json_body(response).await;
        assert_eq!(body["message"], "weather service is currently unavailable");
        assert!(!body.to_string().contains("upstream exploded"));
    }

    #[tokio::test]
    async fn test_operational_routes_are_not_rate_limited() {
        let (app, _) = app(MockProvider::succeeding("London"), 1);

        for _ in 0..3 {
            let response = app.clone().oneshot(get("/health", "192.0.2.1")).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert!(!response.headers().contains_key("x-ratelimit-limit"));
        }
    }

    #[tokio::test]
    async fn test_metrics_route_exposes_http_counters() {
        let (app, _) = app(MockProvider::succeeding("London"), 5);

        app.clone()
            .oneshot(get("/weather?city=London", "192.0.2.1"))
            .await
            .unwrap();
        let response = app.oneshot(get("/metrics", "192.0.2.1")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response.headers()[header::CONTENT_TYPE]
                .to_str()
                .unwrap()
                .starts_with("text/plain")
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("weather_api_http_requests_total"));
        assert!(text.contains(r#"path="/weather""#));
        assert!(text.contains("weather_api_cache_misses_total 1"));
    }

    #[tokio::test]
    async fn test_unmatched_paths_share_one_metric_series() {
        let (app, metrics) = app(MockProvider::succeeding("London"), 5);

        for i in 0..50 {
            let response = app
                .clone()
                .oneshot(get(&format!("/junk-{i}"), "192.0.2.1"))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
        }

        assert_eq!(
            metrics
                .http_requests
                .with_label_values(&["GET", UNMATCHED_PATH, "404"])
                .get(),
            50
        );
        let text = metrics.render().unwrap();
        assert!(!text.contains("junk-"));
    }
}
