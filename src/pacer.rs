//! Fixed-window send pacer.
//!
//! One pacer is created at startup and shared by every dispatch job in the
//! process. It hands out one token per outbound delivery; when the window's
//! budget is spent, callers are told how long until the next window opens.
//!
//! This is a fixed-window counter, not a leaky bucket: the budget resets to
//! full capacity all at once, exactly when a full window has elapsed since
//! the last refill. Two refills can land close together around a window
//! boundary, so short bursts above the steady-state rate are possible there.
//! That matches the downstream platform behavior this pacer was tuned
//! against and is intentional.
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use chrono::Utc;

#[derive(Debug)]
struct WindowState {
    // Tokens left in the current window, in [0, capacity]
    tokens: u32,
    // Timestamp in unix milliseconds of the last full refill
    last_refill: i64,
}

/// Process-wide pacing gate. Cheap to share behind an `Arc`; all state
/// mutation happens under one lock so check-and-consume is indivisible.
#[derive(Debug)]
pub struct FixedWindowPacer {
    capacity: u32,
    window_ms: i64,
    state: Mutex<WindowState>,
}

impl FixedWindowPacer {
    pub fn new(capacity: u32, window: Duration) -> Self {
        Self {
            capacity,
            window_ms: window.as_millis() as i64,
            state: Mutex::new(WindowState {
                tokens: capacity,
                last_refill: Utc::now().timestamp_millis(),
            }),
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Consume one token if the current window still has budget.
    ///
    /// Refills lazily first: if a full window has passed since the last
    /// refill, the budget snaps back to capacity. There is no partial or
    /// incremental refill.
    pub fn try_acquire(&self) -> bool {
        let mut state = self.lock_state();
        self.refill_if_elapsed(&mut state);
        if state.tokens > 0 {
            state.tokens -= 1;
            true
        } else {
            false
        }
    }

    /// How long until a token will next be available.
    ///
    /// Zero exactly when an immediate `try_acquire` would succeed.
    pub fn time_until_next_allowed(&self) -> Duration {
        let mut state = self.lock_state();
        self.refill_if_elapsed(&mut state);
        if state.tokens > 0 {
            return Duration::ZERO;
        }
        let elapsed = Utc::now().timestamp_millis() - state.last_refill;
        let remaining = (self.window_ms - elapsed).max(0);
        Duration::from_millis(remaining as u64)
    }

    /// Non-consuming view of the current window's remaining budget.
    pub fn remaining(&self) -> u32 {
        let mut state = self.lock_state();
        self.refill_if_elapsed(&mut state);
        state.tokens
    }

    /// Force a fresh window with full capacity, starting now.
    pub fn reset(&self) {
        let mut state = self.lock_state();
        state.tokens = self.capacity;
        state.last_refill = Utc::now().timestamp_millis();
    }

    fn refill_if_elapsed(&self, state: &mut WindowState) {
        let now = Utc::now().timestamp_millis();
        if now - state.last_refill >= self.window_ms {
            state.tokens = self.capacity;
            state.last_refill = now;
        }
    }

    // The critical sections are pure integer math and cannot panic, so a
    // poisoned lock still guards consistent state.
    fn lock_state(&self) -> std::sync::MutexGuard<'_, WindowState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
