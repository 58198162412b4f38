//! Per-origin sliding-window rate limiter.
//!
//! Each origin keeps the timestamps of its recent requests. An admission
//! check drops timestamps older than the window, records the current
//! request, and admits it if the window now holds at most `max_requests`
//! entries. Denied requests are recorded too, so an origin that keeps
//! hammering stays throttled.
//!
//! The whole read-filter-append sequence runs under one lock, and the
//! periodic eviction sweep takes the same lock.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Default window over which requests are counted.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Default number of requests admitted per window.
pub const DEFAULT_MAX_REQUESTS: usize = 10;

/// Default interval between eviction sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Default idle time after which an origin is forgotten.
pub const DEFAULT_INACTIVITY: Duration = Duration::from_secs(30 * 60);

/// Limiter tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct LimiterConfig {
    /// Window over which requests are counted.
    pub window: Duration,
    /// Requests admitted per origin within one window.
    pub max_requests: usize,
    /// How often the eviction sweep runs.
    pub sweep_interval: Duration,
    /// Idle time after which an origin's window is dropped.
    pub inactivity: Duration,
}

impl LimiterConfig {
    /// A config with the given quota and default sweep settings.
    #[must_use]
    pub fn new(window: Duration, max_requests: usize) -> Self {
        Self {
            window,
            max_requests,
            ..Self::default()
        }
    }

    /// Override the eviction sweep settings.
    #[must_use]
    pub fn with_eviction(mut self, sweep_interval: Duration, inactivity: Duration) -> Self {
        self.sweep_interval = sweep_interval;
        self.inactivity = inactivity;
        self
    }
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            max_requests: DEFAULT_MAX_REQUESTS,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            inactivity: DEFAULT_INACTIVITY,
        }
    }
}

type Visitors = HashMap<String, VecDeque<Instant>>;

/// Sliding-window limiter keyed by request origin.
///
/// Safe to share across tasks behind an `Arc`.
#[derive(Debug)]
pub struct RateLimiter {
    config: LimiterConfig,
    visitors: Arc<Mutex<Visitors>>,
}

impl RateLimiter {
    /// Create an empty limiter.
    #[must_use]
    pub fn new(config: LimiterConfig) -> Self {
        Self {
            config,
            visitors: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// The limiter's configuration.
    #[must_use]
    pub fn config(&self) -> &LimiterConfig {
        &self.config
    }

    /// Record a request from `origin` now and report whether it is admitted.
    pub async fn admit(&self, origin: &str) -> bool {
        self.admit_at(origin, Instant::now()).await
    }

    /// Record a request from `origin` at `now` and report whether it is admitted.
    ///
    /// Timestamps are kept while their age is strictly less than the window.
    pub async fn admit_at(&self, origin: &str, now: Instant) -> bool {
        let mut visitors = self.visitors.lock().await;
        let window = visitors.entry(origin.to_owned()).or_default();
        while window
            .front()
            .is_some_and(|seen| now.saturating_duration_since(*seen) >= self.config.window)
        {
            window.pop_front();
        }
        window.push_back(now);
        let admitted = window.len() <= self.config.max_requests;
        if !admitted {
            tracing::debug!(%origin, in_window = window.len(), "origin over quota");
        }
        admitted
    }

    /// Drop every origin whose latest request is older than the inactivity
    /// threshold at `now`. Returns the number of origins removed.
    pub async fn evict_inactive_at(&self, now: Instant) -> usize {
        evict(&self.visitors, self.config.inactivity, now).await
    }

    /// Number of origins currently tracked.
    pub async fn tracked_origins(&self) -> usize {
        self.visitors.lock().await.len()
    }

    /// Start the periodic eviction sweep on the current tokio runtime.
    ///
    /// The sweep stops when the returned [`EvictionTask`] is shut down or
    /// dropped.
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime.
    #[must_use = "dropping the EvictionTask stops the sweep"]
    pub fn spawn_eviction(&self) -> EvictionTask {
        let visitors = Arc::clone(&self.visitors);
        let period = self.config.sweep_interval;
        let inactivity = self.config.inactivity;
        let handle = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + period;
            let mut ticker = tokio::time::interval_at(start, period);
            loop {
                ticker.tick().await;
                let removed = evict(&visitors, inactivity, Instant::now()).await;
                if removed > 0 {
                    tracing::debug!(removed, "evicted inactive origins");
                }
            }
        });
        EvictionTask { handle }
    }
}

async fn evict(visitors: &Mutex<Visitors>, inactivity: Duration, now: Instant) -> usize {
    let mut visitors = visitors.lock().await;
    let before = visitors.len();
    visitors.retain(|_, window| {
        window
            .back()
            .is_some_and(|last| now.saturating_duration_since(*last) <= inactivity)
    });
    before - visitors.len()
}

/// Owned handle to the background eviction sweep.
#[derive(Debug)]
pub struct EvictionTask {
    handle: JoinHandle<()>,
}

impl EvictionTask {
    /// Stop the sweep and wait for it to wind down.
    pub async fn shutdown(mut self) {
        self.handle.abort();
        // Aborting always yields a cancellation error here.
        let _ = (&mut self.handle).await;
    }

    /// `true` once the sweep has stopped.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for EvictionTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
