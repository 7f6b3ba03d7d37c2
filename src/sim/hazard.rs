//! Advancing hazard line
//!
//! Grows down from the top of the play area: nothing for the start delay,
//! then one fixed increment per step interval until cancelled.

use super::timer::RepeatingTimer;

/// The line itself (distance advanced from the top)
#[derive(Debug, Clone, Copy, PartialEq)]
struct HazardLine {
    height: f32,
    increment: f32,
}

#[derive(Debug, Clone)]
pub struct HazardTimeline {
    line: HazardLine,
    timer: RepeatingTimer,
}

impl HazardTimeline {
    pub fn new(start_delay_ms: u64, step_interval_ms: u64, increment: f32) -> Self {
        Self {
            line: HazardLine {
                height: 0.0,
                increment,
            },
            timer: RepeatingTimer::delayed(start_delay_ms, step_interval_ms),
        }
    }

    pub fn height(&self) -> f32 {
        self.line.height
    }

    /// Steps taken so far
    pub fn steps(&self) -> u32 {
        self.timer.fired()
    }

    pub fn is_running(&self) -> bool {
        !self.timer.is_cancelled()
    }

    /// Take one due step, returning the new height.
    ///
    /// Steps one at a time so the caller can check the bar between steps.
    pub fn step_due(&mut self, now_ms: u64) -> Option<f32> {
        if !self.timer.fire_due(now_ms) {
            return None;
        }
        self.line.height += self.line.increment;
        Some(self.line.height)
    }

    /// Stop advancing; the height stays where it is
    pub fn cancel(&mut self) {
        self.timer.cancel();
    }
}
