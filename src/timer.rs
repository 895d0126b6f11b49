//! Fixed-interval timers for the sampling and sync cadences.
//!
//! A timer fires when `now - last >= interval` and resets its timestamp
//! on firing regardless of whether the gated action then succeeds — a
//! failed publish or fetch waits a full interval before the next attempt,
//! never retrying within the same tick.

use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct IntervalTimer {
    interval: Duration,
    last: Duration,
}

impl IntervalTimer {
    /// Primed at `now`: the first fire happens one full interval later.
    pub fn new(interval: Duration, now: Duration) -> Self {
        Self {
            interval,
            last: now,
        }
    }

    /// True when the interval has elapsed; resets the timestamp to `now`
    /// when it has. Call once per tick.
    pub fn fire_due(&mut self, now: Duration) -> bool {
        if now.saturating_sub(self.last) >= self.interval {
            self.last = now;
            true
        } else {
            false
        }
    }
}
