//! Rate Limiting Infrastructure
//!
//! In-process fixed-window rate limiting keyed by client identity.

use crate::clock::{Clock, SystemClock};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Windows idle for this many window lengths are eligible for eviction
const STALE_WINDOW_FACTOR: u32 = 2;

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests admitted per window (at least 1)
    pub max_requests: u32,
    /// Time window duration
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 30,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }

    /// How long a window may sit untouched before the sweeper drops it
    pub fn idle_after(&self) -> Duration {
        self.window * STALE_WINDOW_FACTOR
    }
}

/// Outcome of an admission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Call admitted; `remaining` calls are left in the current window
    Allowed { remaining: u32 },
    /// Quota exhausted; the window restarts after `retry_after`
    Denied { retry_after: Duration },
}

impl Admission {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Admission::Allowed { .. })
    }
}

/// Per-identity admission control
///
/// `admit` never fails: an identity that has not been seen before simply
/// starts a fresh window.
pub trait RateLimiter: Send + Sync {
    fn admit(&self, identity: &str) -> Admission;

    /// Maximum calls admitted per window
    fn limit(&self) -> u32;
}

#[derive(Debug, Clone, Copy)]
struct ClientWindow {
    count: u32,
    window_start: Instant,
}

/// Fixed-window rate limiter
///
/// Each identity gets `max_requests` calls per `window`, counted from its
/// first call in that window. When the window has fully elapsed the whole
/// quota comes back at once; calls do not age out one by one. A client can
/// therefore land up to `2 × max_requests` calls in a short burst that
/// straddles a window boundary.
///
/// Lookup, reset and increment happen under one map-wide lock, so
/// concurrent callers for the same identity never admit more than the
/// remaining quota and an elapsed window is reset exactly once.
#[derive(Debug)]
pub struct FixedWindowRateLimiter<C: Clock = SystemClock> {
    windows: Mutex<HashMap<String, ClientWindow>>,
    config: RateLimitConfig,
    clock: C,
}

impl FixedWindowRateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> FixedWindowRateLimiter<C> {
    pub fn with_clock(config: RateLimitConfig, clock: C) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            config,
            clock,
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Number of identities currently holding a window
    pub fn tracked_identities(&self) -> usize {
        self.windows.lock().len()
    }

    /// Drop windows that started at least `idle_after` ago
    ///
    /// Such a window has already elapsed, so the next call from that
    /// identity would reset it anyway; removing it changes no decision.
    pub fn evict_stale(&self) -> usize {
        let now = self.clock.now();
        let idle_after = self.config.idle_after();

        let mut windows = self.windows.lock();
        let before = windows.len();
        windows.retain(|_, w| now.saturating_duration_since(w.window_start) < idle_after);
        before - windows.len()
    }
}

impl<C: Clock> RateLimiter for FixedWindowRateLimiter<C> {
    fn admit(&self, identity: &str) -> Admission {
        let now = self.clock.now();
        let max = self.config.max_requests;
        let fresh = ClientWindow {
            count: 1,
            window_start: now,
        };

        let mut windows = self.windows.lock();

        if let Some(window) = windows.get_mut(identity) {
            let elapsed = now.saturating_duration_since(window.window_start);

            if elapsed >= self.config.window {
                *window = fresh;
                return Admission::Allowed {
                    remaining: max.saturating_sub(1),
                };
            }

            if window.count < max {
                window.count += 1;
                return Admission::Allowed {
                    remaining: max - window.count,
                };
            }

            return Admission::Denied {
                retry_after: self.config.window - elapsed,
            };
        }

        windows.insert(identity.to_owned(), fresh);
        Admission::Allowed {
            remaining: max.saturating_sub(1),
        }
    }

    fn limit(&self) -> u32 {
        self.config.max_requests
    }
}

/// Periodically evict stale windows until `shutdown` fires
pub fn spawn_sweeper<C>(
    limiter: Arc<FixedWindowRateLimiter<C>>,
    period: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()>
where
    C: Clock + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::debug!("Rate limit sweeper stopped");
                    break;
                }
                _ = ticker.tick() => {
                    let evicted = limiter.evict_stale();
                    if evicted > 0 {
                        tracing::debug!(
                            evicted,
                            tracked = limiter.tracked_identities(),
                            "Evicted stale rate limit windows"
                        );
                    }
                }
            }
        }
    })
}
