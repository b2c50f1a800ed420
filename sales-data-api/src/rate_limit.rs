//! Fixed-window rate limiting keyed by caller

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::error::ApiError;

/// Counter state of one caller in one window
#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Allows at most `limit` requests per caller in each window of `period`
///
/// A caller's window opens with its first request.
#[derive(Debug)]
pub struct FixedWindow {
    limit: u32,
    period: Duration,
    name: &'static str,
    windows: Mutex<HashMap<String, Window>>,
}

impl FixedWindow {
    /// Create a limiter named `name` (used in error messages)
    pub fn new(limit: u32, period: Duration, name: &'static str) -> Self {
        Self {
            limit,
            period,
            name,
            windows: Mutex::new(HashMap::new()),
        }
    }

    fn prune(&self, windows: &mut HashMap<String, Window>, now: Instant) {
        windows.retain(|_, window| now.duration_since(window.started) < self.period);
    }

    fn current(&self, windows: &mut HashMap<String, Window>, key: &str, now: Instant) -> Window {
        match windows.get(key) {
            Some(window) if now.duration_since(window.started) < self.period => *window,
            _ => Window { started: now, count: 0 },
        }
    }
}

/// Per-second and per-minute limits applied together
///
/// A request is admitted only if both windows have room, and only admitted
/// requests are counted.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    windows: Arc<[FixedWindow; 2]>,
}

impl RateLimiter {
    /// Create a limiter from per-second and per-minute thresholds
    pub fn new(per_second: u32, per_minute: u32) -> Self {
        Self {
            windows: Arc::new([
                FixedWindow::new(per_second, Duration::from_secs(1), "second"),
                FixedWindow::new(per_minute, Duration::from_secs(60), "minute"),
            ]),
        }
    }

    /// Admit or reject one request from `key`
    pub fn check(&self, key: &str) -> Result<(), ApiError> {
        self.check_at(key, Instant::now())
    }

    /// Admit or reject one request from `key` at time `now`
    ///
    /// Expired windows of every caller are dropped first.
    pub fn check_at(&self, key: &str, now: Instant) -> Result<(), ApiError> {
        let mut guards: Vec<_> = self
            .windows
            .iter()
            .map(|w| w.windows.lock().unwrap_or_else(PoisonError::into_inner))
            .collect();

        let mut current = Vec::with_capacity(guards.len());
        for (limiter, guard) in self.windows.iter().zip(guards.iter_mut()) {
            limiter.prune(guard, now);
            let window = limiter.current(guard, key, now);
            if window.count >= limiter.limit {
                return Err(ApiError::RateLimited {
                    limit: limiter.limit,
                    window: limiter.name,
                });
            }
            current.push(window);
        }

        for (guard, mut window) in guards.iter_mut().zip(current) {
            window.count += 1;
            guard.insert(key.to_string(), window);
        }
        Ok(())
    }
}
