//! Host-driven ticker for native hosts and tests.

use crate::traits::Ticker;

/// Runs its frame closure each time the host calls `advance`, but only while
/// started.
pub struct ManualTicker<F: FnMut(f64)> {
    frame: F,
    active: bool,
    frames: u64,
}

impl<F: FnMut(f64)> ManualTicker<F> {
    /// A started ticker, matching a clock that runs from construction.
    pub fn new(frame: F) -> Self {
        Self {
            frame,
            active: true,
            frames: 0,
        }
    }

    /// Delivers one frame at `now` (seconds). Returns whether it ran.
    pub fn advance(&mut self, now: f64) -> bool {
        if !self.active {
            return false;
        }
        (self.frame)(now);
        self.frames += 1;
        true
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl<F: FnMut(f64)> Ticker for ManualTicker<F> {
    fn start(&mut self) {
        self.active = true;
    }

    fn stop(&mut self) {
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
