//! Countdown timers keyed by wait token.

use crate::domain::cursor::WaitToken;

#[derive(Debug, Clone, Copy)]
struct Timer {
    token: WaitToken,
    remaining: f32,
}

/// Timers advanced by frame time. A timer fires on the tick that brings its
/// remaining time to zero or below.
#[derive(Debug, Default)]
pub struct TimerQueue {
    timers: Vec<Timer>,
}

impl TimerQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a timer that fires `token` after `seconds`.
    pub fn arm(&mut self, token: WaitToken, seconds: f32) {
        self.timers.push(Timer {
            token,
            remaining: seconds,
        });
    }

    /// Cancels every timer.
    pub fn cancel_all(&mut self) {
        self.timers.clear();
    }

    /// Advances all timers by `dt` and returns the tokens that fired, in the
    /// order they were armed.
    pub fn tick(&mut self, dt: f32) -> Vec<WaitToken> {
        let mut fired = Vec::new();
        self.timers.retain_mut(|timer| {
            timer.remaining -= dt;
            if timer.remaining <= 0.0 {
                fired.push(timer.token);
                false
            } else {
                true
            }
        });
        fired
    }

    /// Whether no timer is armed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}
