//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors; request-level errors are
//! rendered by the weather crate.

mod config;

use anyhow::Context;
use axum::http::StatusCode;
use platform::rate_limit::{FixedWindowRateLimiter, spawn_sweeper};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use weather::{
    GetWeatherUseCase, RedisWeatherCache, WeatherApiClient, WeatherConfig, WeatherMetrics,
    weather_router,
};

use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,weather=info,platform=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let metrics = Arc::new(WeatherMetrics::new().context("failed to register metrics")?);
    let weather_config = WeatherConfig::default();

    // Cache: fail fast when Redis is unreachable
    let cache = RedisWeatherCache::connect(&config.redis_url())
        .await
        .with_context(|| format!("failed to connect to Redis at {}", config.redis_url()))?;

    let provider = WeatherApiClient::new(
        config.weather_api_key.clone(),
        config.weather_api_base_url.clone(),
        weather_config.provider_timeout,
        metrics.clone(),
    )
    .context("failed to build WeatherAPI client")?;

    let use_case = Arc::new(GetWeatherUseCase::new(
        Arc::new(cache),
        Arc::new(provider),
        Arc::new(weather_config),
        metrics.clone(),
    ));

    // `shutdown` starts the drain; `force_stop` aborts lookups that outlive it
    let shutdown = CancellationToken::new();
    let force_stop = CancellationToken::new();

    // Rate limiting
    let limiter = Arc::new(FixedWindowRateLimiter::new(config.rate_limit.clone()));
    let sweeper = spawn_sweeper(limiter.clone(), config.rate_limit.window, shutdown.clone());

    tracing::info!(
        max_requests = config.rate_limit.max_requests,
        window_secs = config.rate_limit.window.as_secs(),
        "Rate limiter configured"
    );

    // Build router
    let app = weather_router(
        use_case,
        limiter,
        metrics,
        config.forwarded,
        force_stop.child_token(),
    )
    .layer(TraceLayer::new_for_http())
    .layer(TimeoutLayer::with_status_code(
        StatusCode::REQUEST_TIMEOUT,
        config.request_timeout,
    ));

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;

    tokio::spawn(shutdown_signal(shutdown.clone()));
    tokio::spawn(force_stop_after(
        shutdown.clone(),
        config.shutdown_grace,
        force_stop.clone(),
    ));

    let drain = shutdown.clone();
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move { drain.cancelled().await })
    .await?;

    shutdown.cancel();
    force_stop.cancel();
    if let Err(e) = sweeper.await {
        tracing::warn!(error = %e, "Rate limit sweeper did not stop cleanly");
    }

    tracing::info!("Shutdown complete");

    Ok(())
}

/// Wait for Ctrl-C or SIGTERM, then start the drain
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutting down server...");
    shutdown.cancel();
}

/// Cancel `force_stop` once `grace` has passed since `shutdown` fired
async fn force_stop_after(
    shutdown: CancellationToken,
    grace: Duration,
    force_stop: CancellationToken,
) {
    tokio::select! {
        _ = force_stop.cancelled() => return,
        _ = shutdown.cancelled() => {}
    }

    tokio::select! {
        _ = force_stop.cancelled() => {}
        _ = tokio::time::sleep(grace) => {
            tracing::warn!(
                grace_secs = grace.as_secs(),
                "Drain deadline reached, aborting in-flight lookups"
            );
            force_stop.cancel();
        }
    }
}
