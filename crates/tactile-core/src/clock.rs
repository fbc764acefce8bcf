//! Frame clock shared by the recognizer and dispatcher.

use std::time::Duration;

/// Simulation time and frame number of the frame being processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FrameStamp {
    /// Time since the clock started.
    pub time: Duration,
    /// Frame counter, starting at 0.
    pub frame: u64,
}

impl FrameStamp {
    /// Create a stamp.
    #[must_use]
    pub const fn new(time: Duration, frame: u64) -> Self {
        Self { time, frame }
    }

    /// Stamp at a millisecond offset and frame number.
    #[must_use]
    pub const fn from_millis(ms: u64, frame: u64) -> Self {
        Self::new(Duration::from_millis(ms), frame)
    }
}

/// Monotonic frame clock.
///
/// The platform loop calls [`FrameClock::advance`] once per frame with the
/// frame's delta time; everything downstream reads the resulting stamp.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    now: FrameStamp,
    last_delta: Duration,
}

impl FrameClock {
    /// Create a clock at time zero, frame zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Move to the next frame. Time saturates instead of overflowing.
    pub fn advance(&mut self, delta: Duration) -> FrameStamp {
        self.now.time = self.now.time.saturating_add(delta);
        self.now.frame = self.now.frame.saturating_add(1);
        self.last_delta = delta;
        self.now
    }

    /// Stamp of the current frame.
    #[must_use]
    pub const fn now(&self) -> FrameStamp {
        self.now
    }

    /// Delta passed to the most recent `advance`.
    #[must_use]
    pub const fn last_delta(&self) -> Duration {
        self.last_delta
    }

    /// Frames per second implied by the most recent delta.
    #[must_use]
    pub fn fps(&self) -> f32 {
        let secs = self.last_delta.as_secs_f32();
        if secs <= 0.0 {
            0.0
        } else {
            1.0 / secs
        }
    }
}
