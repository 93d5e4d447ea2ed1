//! Server configuration
//!
//! Process-level settings read from the environment (and `.env`).

use anyhow::Context;
use platform::client::ForwardedPolicy;
use platform::rate_limit::RateLimitConfig;
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub weather_api_key: String,
    pub weather_api_base_url: String,
    pub redis_host: String,
    pub redis_port: u16,
    pub rate_limit: RateLimitConfig,
    pub server_port: u16,
    pub request_timeout: Duration,
    /// How long shutdown waits for in-flight requests before aborting them
    pub shutdown_grace: Duration,
    pub forwarded: ForwardedPolicy,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let max_requests: u32 = parse_var("RATE_LIMIT_REQUESTS", 30)?;
        if max_requests == 0 {
            anyhow::bail!("RATE_LIMIT_REQUESTS must be at least 1");
        }
        let window_secs: u64 = parse_var("RATE_LIMIT_WINDOW_SECS", 60)?;
        if window_secs == 0 {
            anyhow::bail!("RATE_LIMIT_WINDOW_SECS must be at least 1");
        }

        Ok(Self {
            weather_api_key: string_var("WEATHER_API_KEY", "test_api_key"),
            weather_api_base_url: string_var(
                "WEATHER_API_BASE_URL",
                "https://api.weatherapi.com/v1/current.json",
            ),
            redis_host: string_var("REDIS_HOST", "localhost"),
            redis_port: parse_var("REDIS_PORT", 6379)?,
            rate_limit: RateLimitConfig::new(max_requests, window_secs),
            server_port: parse_var("SERVER_PORT", 8080)?,
            request_timeout: Duration::from_secs(parse_var("REQUEST_TIMEOUT_SECS", 30)?),
            shutdown_grace: Duration::from_secs(parse_var("SHUTDOWN_GRACE_SECS", 30)?),
            forwarded: if parse_var("TRUST_FORWARDED_FOR", false)? {
                ForwardedPolicy::TrustProxy
            } else {
                ForwardedPolicy::Ignore
            },
        })
    }

    pub fn redis_url(&self) -> String {
        format!("redis://{}:{}/", self.redis_host, self.redis_port)
    }
}

fn string_var(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) if !raw.is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} has an invalid value: {raw:?}")),
        _ => Ok(default),
    }
}
