//! Delayed, repeating timers on round time
//!
//! Timers are plain values polled from inside the tick, so they can never run
//! concurrently with the update. Cancelling is permanent.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeatingTimer {
    /// Round time (ms) of the next firing
    next_at_ms: u64,
    interval_ms: u64,
    fired: u32,
    cancelled: bool,
}

impl RepeatingTimer {
    /// First firing at `first_at_ms`, then every `interval_ms`
    pub fn new(first_at_ms: u64, interval_ms: u64) -> Self {
        debug_assert!(interval_ms > 0, "zero interval would fire forever");
        Self {
            next_at_ms: first_at_ms,
            interval_ms,
            fired: 0,
            cancelled: false,
        }
    }

    /// Waits `delay_ms`, then fires every `interval_ms` (first firing at
    /// `delay_ms + interval_ms`). Schedules past `u64::MAX` never fire.
    pub fn delayed(delay_ms: u64, interval_ms: u64) -> Self {
        Self::new(delay_ms.saturating_add(interval_ms), interval_ms)
    }

    /// Consume one due firing. Call in a loop to catch up after a long frame.
    pub fn fire_due(&mut self, now_ms: u64) -> bool {
        if self.cancelled || now_ms < self.next_at_ms {
            return false;
        }
        self.next_at_ms = self.next_at_ms.saturating_add(self.interval_ms);
        self.fired += 1;
        true
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Number of times this timer has fired
    pub fn fired(&self) -> u32 {
        self.fired
    }

    pub fn next_at_ms(&self) -> u64 {
        self.next_at_ms
    }
}
