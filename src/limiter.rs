//! Hourly request budget for the image search provider.
//!
//! A hard ceiling with a single reset edge, not a token bucket: the
//! window starts at the first call, counts every permitted attempt, and
//! resets wholesale once more than `window` has elapsed. The state lives
//! in memory only, so a restart grants a fresh budget.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

/// Unsplash's demo-tier quota.
pub const DEFAULT_REQUESTS_PER_HOUR: u32 = 50;

/// Length of one budget window.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(3600);

/// Counter state for the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateWindow {
    pub request_count: u32,
    pub window_start: Instant,
}

/// Thread-safe fixed-window request budget.
///
/// One lock guards both the count and the window start, so a reset is
/// always ordered before the increments it invalidates and two callers
/// can never both take the last slot.
///
/// Uses [`tokio::time::Instant`], so tests can drive the window with a
/// paused runtime clock.
#[derive(Debug)]
pub struct RateLimiter {
    budget: u32,
    window: Duration,
    state: Mutex<RateWindow>,
}

impl RateLimiter {
    /// Limiter permitting `budget` attempts per hour.
    pub fn new(budget: u32) -> Self {
        Self::with_window(budget, DEFAULT_WINDOW)
    }

    /// Limiter with a custom window length.
    pub fn with_window(budget: u32, window: Duration) -> Self {
        Self {
            budget,
            window,
            state: Mutex::new(RateWindow {
                request_count: 0,
                window_start: Instant::now(),
            }),
        }
    }

    pub fn budget(&self) -> u32 {
        self.budget
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Take one slot if the budget allows it.
    pub fn try_consume(&self) -> bool {
        self.try_consume_at(Instant::now())
    }

    /// Take one slot as of `now`.
    pub fn try_consume_at(&self, now: Instant) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        self.roll_window(&mut state, now);

        if state.request_count < self.budget {
            state.request_count += 1;
            true
        } else {
            false
        }
    }

    /// Slots left in the current window.
    pub fn remaining(&self) -> u32 {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        self.roll_window(&mut state, Instant::now());
        self.budget.saturating_sub(state.request_count)
    }

    /// Copy of the current counter state.
    pub fn snapshot(&self) -> RateWindow {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn roll_window(&self, state: &mut RateWindow, now: Instant) {
        if now.saturating_duration_since(state.window_start) > self.window {
            state.request_count = 0;
            state.window_start = now;
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_REQUESTS_PER_HOUR)
    }
}
