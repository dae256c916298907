//! Time management utilities
//!
//! Everything time-dependent in the engine is advanced by an explicit
//! `delta_time` in seconds, once per frame.

/// Single-slot countdown timer
///
/// Arming an already armed timer replaces the previous deadline, so at most
/// one pending expiry exists per timer. A cancelled timer never fires.
#[derive(Debug, Clone, Default)]
pub struct DelayTimer {
    remaining: Option<f32>,
    arm_count: u64,
}

impl DelayTimer {
    /// Create a new idle timer
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the timer to fire after `duration` seconds, replacing any pending deadline
    pub fn arm(&mut self, duration: f32) {
        self.remaining = Some(duration.max(0.0));
        self.arm_count += 1;
    }

    /// Cancel the pending deadline, if any
    pub fn cancel(&mut self) {
        self.remaining = None;
    }

    /// Whether a deadline is pending
    pub fn is_armed(&self) -> bool {
        self.remaining.is_some()
    }

    /// Seconds left until expiry
    pub fn remaining(&self) -> Option<f32> {
        self.remaining
    }

    /// Number of times the timer has been armed since creation
    pub fn arm_count(&self) -> u64 {
        self.arm_count
    }

    /// Advance the timer
    ///
    /// Returns `true` exactly once, on the tick that crosses the deadline.
    pub fn tick(&mut self, delta_time: f32) -> bool {
        match self.remaining {
            Some(remaining) if remaining - delta_time <= 0.0 => {
                self.remaining = None;
                true
            }
            Some(remaining) => {
                self.remaining = Some(remaining - delta_time);
                false
            }
            None => false,
        }
    }
}

/// Monotonic session clock in seconds
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionClock {
    elapsed: f64,
    frame_count: u64,
}

impl SessionClock {
    /// Create a clock at time zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by one frame
    pub fn advance(&mut self, delta_time: f32) {
        self.elapsed += f64::from(delta_time.max(0.0));
        self.frame_count += 1;
    }

    /// Seconds since the session started
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Frames advanced so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}
