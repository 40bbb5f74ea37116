//! Pausable animation clock.
//!
//! Time is supplied by the host as monotonically increasing seconds (for
//! example `performance.now() / 1000`), which keeps the clock deterministic
//! under test.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClockState {
    Running,
    Paused,
}

#[derive(Debug, Clone)]
pub struct AnimationClock {
    elapsed: f64,
    /// Elapsed time captured at the last pause; restored on resume.
    previous: f64,
    last_tick: f64,
    state: ClockState,
}

impl AnimationClock {
    /// A running clock with `elapsed = 0` at `now`.
    pub fn start(now: f64) -> Self {
        Self {
            elapsed: 0.0,
            previous: 0.0,
            last_tick: now,
            state: ClockState::Running,
        }
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == ClockState::Running
    }

    /// Advances by the wall-clock time since the last tick while running.
    /// Timestamps earlier than the last tick add nothing.
    pub fn tick(&mut self, now: f64) -> f64 {
        if self.is_running() && now > self.last_tick {
            self.elapsed += now - self.last_tick;
            self.last_tick = now;
        }
        self.elapsed
    }

    /// Returns false if the clock was already paused.
    pub fn pause(&mut self, now: f64) -> bool {
        if !self.is_running() {
            return false;
        }
        self.tick(now);
        self.previous = self.elapsed;
        self.state = ClockState::Paused;
        log::debug!("animation paused at t = {:.3}", self.previous);
        true
    }

    /// Restores the phase captured at the pause. Returns false if the clock
    /// was already running.
    pub fn resume(&mut self, now: f64) -> bool {
        if self.is_running() {
            return false;
        }
        self.elapsed = self.previous;
        self.last_tick = now;
        self.state = ClockState::Running;
        log::debug!("animation resumed at t = {:.3}", self.elapsed);
        true
    }

    pub fn set_running(&mut self, running: bool, now: f64) -> bool {
        if running {
            self.resume(now)
        } else {
            self.pause(now)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_running_at_zero() {
        let clock = AnimationClock::start(42.0);
        assert!(clock.is_running());
        assert_eq!(clock.elapsed(), 0.0);
    }

    #[test]
    fn tick_accumulates_wall_clock_deltas() {
        let mut clock = AnimationClock::start(10.0);
        assert_eq!(clock.tick(10.5), 0.5);
        assert_eq!(clock.tick(10.75), 0.75);
        // stale timestamp
        assert_eq!(clock.tick(10.6), 0.75);
        assert_eq!(clock.tick(11.0), 1.0);
    }

    #[test]
    fn pause_then_resume_restores_phase() {
        let mut clock = AnimationClock::start(0.0);
        clock.tick(1.5);
        assert!(clock.pause(1.5));
        assert!(clock.resume(1.5));
        assert_eq!(clock.elapsed(), 1.5);
    }

    #[test]
    fn paused_time_does_not_count() {
        let mut clock = AnimationClock::start(0.0);
        clock.tick(1.0);
        clock.pause(1.25);
        assert_eq!(clock.tick(30.0), 1.25);
        clock.resume(100.0);
        assert_eq!(clock.elapsed(), 1.25);
        assert_eq!(clock.tick(100.5), 1.75);
    }

    #[test]
    fn repeated_transitions_are_guarded() {
        let mut clock = AnimationClock::start(0.0);
        assert!(!clock.resume(0.1));
        assert!(clock.pause(0.5));
        assert!(!clock.pause(0.9));
        assert_eq!(clock.state(), ClockState::Paused);
        assert_eq!(clock.elapsed(), 0.5);
        assert!(clock.set_running(true, 2.0));
        assert!(!clock.set_running(true, 2.0));
        assert_eq!(clock.elapsed(), 0.5);
    }

    #[test]
    fn rapid_toggling_does_not_drift() {
        let mut clock = AnimationClock::start(0.0);
        let mut now = 0.0;
        let mut running_time = 0.0;
        for _ in 0..1000 {
            now += 0.016;
            running_time += 0.016;
            clock.pause(now);
            now += 0.5;
            clock.resume(now);
        }
        assert!((clock.elapsed() - running_time).abs() < 1e-9);
    }
}
