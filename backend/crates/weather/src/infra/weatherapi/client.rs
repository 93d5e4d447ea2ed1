//! WeatherAPI.com HTTP Client

use super::model::ApiWeatherResponse;
use crate::domain::entities::Weather;
use crate::domain::ports::WeatherProvider;
use crate::domain::value_objects::Location;
use crate::error::ProviderError;
use crate::metrics::WeatherMetrics;
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::{Duration, Instant};

const PROVIDER_LABEL: &str = "weatherapi";

/// Upper bound on how much of an error body ends up in logs
const MAX_ERROR_BODY: usize = 512;

/// Current-conditions client for WeatherAPI.com
#[derive(Clone)]
pub struct WeatherApiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    metrics: Arc<WeatherMetrics>,
}

impl WeatherApiClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
        metrics: Arc<WeatherMetrics>,
    ) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url: base_url.into(),
            metrics,
        })
    }

    async fn request(&self, location: &Location) -> Result<Weather, ProviderError> {
        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", location.as_str()),
                ("aqi", "no"),
            ])
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                self.record_call("error");
                return Err(e.into());
            }
        };

        let status = response.status();
        self.record_call(status.as_str());

        let body = response.bytes().await?;

        if status != StatusCode::OK {
            let body = String::from_utf8_lossy(&body);
            let body: String = body.chars().take(MAX_ERROR_BODY).collect();
            return Err(ProviderError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        let api: ApiWeatherResponse = serde_json::from_slice(&body)?;
        Ok(Weather::from(api))
    }

    fn record_call(&self, status: &str) {
        self.metrics
            .external_api_calls
            .with_label_values(&[PROVIDER_LABEL, status])
            .inc();
    }
}

impl WeatherProvider for WeatherApiClient {
    async fn fetch_weather(&self, location: &Location) -> Result<Weather, ProviderError> {
        let started = Instant::now();
        let result = self.request(location).await;

        self.metrics
            .external_api_call_duration
            .with_label_values(&[PROVIDER_LABEL])
            .observe(started.elapsed().as_secs_f64());

        if let Err(e) = &result {
            tracing::warn!(location = %location, error = %e, "WeatherAPI request failed");
        }

        result
    }
}
