//! Frame-by-frame touch scripts.

use tactile_core::{Point, TouchSample, TouchTrace};

/// Builder for a [`TouchTrace`].
///
/// Samples accumulate into the current frame until [`GestureScript::frame`]
/// commits it:
///
/// ```
/// use tactile_test::GestureScript;
///
/// let trace = GestureScript::new()
///     .press(0, 10.0, 10.0)
///     .frame()
///     .release(0, 10.0, 10.0)
///     .build();
/// assert_eq!(trace.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GestureScript {
    trace: TouchTrace,
    pending: Vec<TouchSample>,
    delay_ms: Option<u64>,
}

impl GestureScript {
    /// Start a script at 60 fps (16 ms frames).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a script with a custom frame duration.
    #[must_use]
    pub fn with_frame_ms(frame_ms: u64) -> Self {
        Self {
            trace: TouchTrace::new(frame_ms),
            ..Self::default()
        }
    }

    /// Add a `Pressed` sample to the current frame.
    #[must_use]
    pub fn press(self, id: u32, x: f32, y: f32) -> Self {
        self.sample(TouchSample::pressed(id, Point::new(x, y)))
    }

    /// Add a `Moved` sample to the current frame.
    #[must_use]
    pub fn move_to(self, id: u32, x: f32, y: f32) -> Self {
        self.sample(TouchSample::moved(id, Point::new(x, y)))
    }

    /// Add a `Released` sample to the current frame.
    #[must_use]
    pub fn release(self, id: u32, x: f32, y: f32) -> Self {
        self.sample(TouchSample::released(id, Point::new(x, y)))
    }

    /// Add any sample to the current frame.
    #[must_use]
    pub fn sample(mut self, sample: TouchSample) -> Self {
        self.pending.push(sample);
        self
    }

    /// Commit the current frame.
    #[must_use]
    pub fn frame(mut self) -> Self {
        let samples = std::mem::take(&mut self.pending);
        self.trace.push_after(self.delay_ms.take(), &samples);
        self
    }

    /// Commit the current frame, then `frames` empty ones.
    #[must_use]
    pub fn idle(mut self, frames: usize) -> Self {
        self = self.frame();
        for _ in 0..frames {
            self = self.frame();
        }
        self
    }

    /// Make the next committed frame arrive `ms` after the previous one.
    #[must_use]
    pub const fn after_ms(mut self, ms: u64) -> Self {
        self.delay_ms = Some(ms);
        self
    }

    /// Press and release one frame apart.
    #[must_use]
    pub fn tap(self, id: u32, x: f32, y: f32) -> Self {
        self.press(id, x, y).frame().release(id, x, y).frame()
    }

    /// Press at `from`, move in `steps` even frames to `to`, release there.
    #[must_use]
    pub fn drag(mut self, id: u32, from: Point, to: Point, steps: usize) -> Self {
        self = self.press(id, from.x, from.y).frame();
        let steps = steps.max(1);
        for i in 1..=steps {
            let t = i as f32 / steps as f32;
            let at = from + (to - from) * t;
            self = self.move_to(id, at.x, at.y).frame();
        }
        self.release(id, to.x, to.y).frame()
    }

    /// Finish, committing any pending samples.
    #[must_use]
    pub fn build(self) -> TouchTrace {
        let script = if self.pending.is_empty() {
            self
        } else {
            self.frame()
        };
        script.trace
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tactile_core::{InputContext, TouchState};

    #[test]
    fn test_pending_samples_share_a_frame() {
        let trace = GestureScript::new()
            .press(0, 0.0, 0.0)
            .press(1, 50.0, 0.0)
            .build();
        assert_eq!(trace.len(), 1);
        assert_eq!(trace.frames[0].touches.len(), 2);
    }

    #[test]
    fn test_idle_and_delay() {
        let trace = GestureScript::with_frame_ms(10)
            .press(0, 0.0, 0.0)
            .idle(3)
            .after_ms(500)
            .release(0, 0.0, 0.0)
            .build();
        assert_eq!(trace.len(), 5);
        assert_eq!(trace.frames[4].delta_ms, Some(500));
        assert_eq!(trace.duration().as_millis(), 540);
    }

    #[test]
    fn test_drag_shape() {
        let trace = GestureScript::new()
            .drag(0, Point::new(0.0, 0.0), Point::new(100.0, 0.0), 4)
            .build();
        assert_eq!(trace.len(), 6);
        let last_move = trace.frames[4].touches[0];
        assert_eq!(last_move.state, TouchState::Moved);
        assert_eq!(last_move.x, 100.0);
    }

    #[test]
    fn test_script_replays() {
        let trace = GestureScript::new().tap(0, 5.0, 5.0).build();
        let gestures = trace.gestures(&mut InputContext::default());
        assert_eq!(gestures.len(), 1);
        assert_eq!(gestures[0].label(), "tap");
    }
}
