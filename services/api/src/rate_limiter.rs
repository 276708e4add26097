//! Attempt limiter guarding login against brute force
//!
//! Each key (e.g. `login:<identifier>`) gets a fixed window of attempts.
//! Exhausting the window bans the key for a while; a successful login
//! resets it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::info;

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Attempts allowed within one window
    pub max_attempts: u32,
    /// Window length in seconds
    pub window_seconds: u64,
    /// Ban length in seconds once the window is exhausted
    pub ban_duration_seconds: u64,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window_seconds: 300,
            ban_duration_seconds: 3600,
        }
    }
}

impl RateLimiterConfig {
    fn window(&self) -> Duration {
        Duration::from_secs(self.window_seconds)
    }

    fn ban(&self) -> Duration {
        Duration::from_secs(self.ban_duration_seconds)
    }
}

/// Outcome of registering an attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allowed,
    /// Rejected; the ban lifts after this long
    Banned(Duration),
}

#[derive(Debug)]
struct AttemptWindow {
    opened_at: Instant,
    attempts: u32,
    banned_until: Option<Instant>,
}

impl AttemptWindow {
    fn new(now: Instant) -> Self {
        Self {
            opened_at: now,
            attempts: 0,
            banned_until: None,
        }
    }

    fn register(&mut self, now: Instant, config: &RateLimiterConfig) -> Verdict {
        match self.banned_until {
            Some(until) if now < until => return Verdict::Banned(until - now),
            Some(_) => *self = AttemptWindow::new(now),
            None => {}
        }

        if now.duration_since(self.opened_at) >= config.window() {
            *self = AttemptWindow::new(now);
        }

        if self.attempts >= config.max_attempts {
            self.banned_until = Some(now + config.ban());
            return Verdict::Banned(config.ban());
        }

        self.attempts += 1;
        Verdict::Allowed
    }

    /// Nothing left to remember: window elapsed and no ban pending
    fn is_stale(&self, now: Instant, config: &RateLimiterConfig) -> bool {
        let ban_over = self.banned_until.is_none_or(|until| now >= until);
        ban_over && now.duration_since(self.opened_at) >= config.window()
    }
}

/// Per-key attempt limiter
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    windows: Arc<Mutex<HashMap<String, AttemptWindow>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Record an attempt for `key` and report whether it may proceed
    pub async fn is_allowed(&self, key: &str) -> bool {
        self.register(key, Instant::now()).await == Verdict::Allowed
    }

    async fn register(&self, key: &str, now: Instant) -> Verdict {
        let mut windows = self.windows.lock().await;
        let verdict = windows
            .entry(key.to_string())
            .or_insert_with(|| AttemptWindow::new(now))
            .register(now, &self.config);

        if let Verdict::Banned(remaining) = verdict {
            info!("Key {} is banned for another {}s", key, remaining.as_secs());
        }
        verdict
    }

    /// Forget the attempts recorded for `key`
    pub async fn reset(&self, key: &str) {
        self.windows.lock().await.remove(key);
    }

    /// Drop keys whose window and ban have both run out
    pub async fn prune(&self) -> usize {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;
        let before = windows.len();
        windows.retain(|_, window| !window.is_stale(now, &self.config));
        before - windows.len()
    }

    pub fn config(&self) -> &RateLimiterConfig {
        &self.config
    }
}
