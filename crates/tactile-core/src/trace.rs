//! Recorded touch input.
//!
//! A [`TouchTrace`] is a serializable list of frames, each with its delta time
//! and the touch samples the platform reported. Traces are what the `tactile`
//! CLI replays and what test scripts build.
//!
//! ```json
//! { "frame_ms": 16, "frames": [
//!     { "touches": [{ "id": 0, "state": "pressed", "x": 10.0, "y": 10.0 }] },
//!     { "delta_ms": 100, "touches": [{ "id": 0, "state": "released", "x": 10.0, "y": 10.0 }] }
//! ] }
//! ```

use crate::context::{FrameReport, InputContext};
use crate::event::{TouchId, TouchSample, TouchState};
use crate::geometry::Point;
use crate::gesture::GestureEvent;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const fn default_frame_ms() -> u64 {
    16
}

/// One recorded touch report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceTouch {
    /// Contact id.
    pub id: u32,
    /// Location state.
    pub state: TouchState,
    /// Horizontal position in pixels.
    pub x: f32,
    /// Vertical position in pixels.
    pub y: f32,
}

impl TraceTouch {
    /// Convert to a sample without a hit object.
    #[must_use]
    pub const fn to_sample(&self) -> TouchSample {
        TouchSample::new(TouchId(self.id), self.state, Point::new(self.x, self.y))
    }
}

impl From<&TouchSample> for TraceTouch {
    fn from(sample: &TouchSample) -> Self {
        Self {
            id: sample.id.0,
            state: sample.state,
            x: sample.position.x,
            y: sample.position.y,
        }
    }
}

/// One recorded frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraceFrame {
    /// Time since the previous frame; the trace's `frame_ms` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta_ms: Option<u64>,
    /// Samples reported this frame, in platform order.
    #[serde(default)]
    pub touches: Vec<TraceTouch>,
}

/// A recorded sequence of touch frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchTrace {
    /// Default frame duration in milliseconds.
    #[serde(default = "default_frame_ms")]
    pub frame_ms: u64,
    /// Recorded frames.
    #[serde(default)]
    pub frames: Vec<TraceFrame>,
}

impl Default for TouchTrace {
    fn default() -> Self {
        Self::new(default_frame_ms())
    }
}

impl TouchTrace {
    /// Create an empty trace with a fixed frame duration.
    #[must_use]
    pub const fn new(frame_ms: u64) -> Self {
        Self {
            frame_ms,
            frames: Vec::new(),
        }
    }

    /// Append a frame of samples at the default frame duration.
    pub fn push(&mut self, samples: &[TouchSample]) {
        self.push_after(None, samples);
    }

    /// Append a frame of samples after an explicit delay.
    pub fn push_after(&mut self, delta_ms: Option<u64>, samples: &[TouchSample]) {
        self.frames.push(TraceFrame {
            delta_ms,
            touches: samples.iter().map(TraceTouch::from).collect(),
        });
    }

    /// Number of frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Check if the trace has no frames.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Total recorded time, saturating at [`Duration::MAX`].
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.frames
            .iter()
            .fold(Duration::ZERO, |total, frame| total.saturating_add(self.delta(frame)))
    }

    fn delta(&self, frame: &TraceFrame) -> Duration {
        Duration::from_millis(frame.delta_ms.unwrap_or(self.frame_ms))
    }

    /// Feed every frame through `input`, one frame per entry.
    pub fn replay(&self, input: &mut InputContext) -> Vec<FrameReport> {
        self.frames
            .iter()
            .map(|frame| {
                input.begin_frame(self.delta(frame));
                let samples: Vec<TouchSample> =
                    frame.touches.iter().map(TraceTouch::to_sample).collect();
                input.process_touch_frame(&samples)
            })
            .collect()
    }

    /// Replay and collect just the recognized gestures.
    pub fn gestures(&self, input: &mut InputContext) -> Vec<GestureEvent> {
        self.replay(input)
            .into_iter()
            .flat_map(|report| report.gestures)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tap_trace() -> TouchTrace {
        let mut trace = TouchTrace::default();
        trace.push(&[TouchSample::pressed(0, Point::new(4.0, 2.0))]);
        trace.push_after(Some(100), &[TouchSample::released(0, Point::new(4.0, 2.0))]);
        trace
    }

    #[test]
    fn test_duration_uses_frame_default() {
        let trace = tap_trace();
        assert_eq!(trace.len(), 2);
        assert_eq!(trace.duration(), Duration::from_millis(116));
    }

    #[test]
    fn test_replay_recognizes_tap() {
        let mut input = InputContext::default();
        let reports = tap_trace().replay(&mut input);
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[1].stamp.frame, 2);
        assert_eq!(reports[1].gestures.len(), 1);
        assert_eq!(reports[1].gestures[0].label(), "tap");
    }

    #[test]
    fn test_sample_conversion_keeps_fields() {
        let touch = TraceTouch {
            id: 3,
            state: TouchState::Moved,
            x: 1.5,
            y: -2.0,
        };
        let sample = touch.to_sample();
        assert_eq!(sample.id, TouchId(3));
        assert_eq!(sample.state, TouchState::Moved);
        assert_eq!(TraceTouch::from(&sample), touch);
    }

    #[test]
    fn test_huge_delays_saturate() {
        let mut trace = tap_trace();
        trace.frames[1].delta_ms = Some(u64::MAX);
        trace.push_after(Some(u64::MAX), &[]);
        assert_eq!(trace.duration(), Duration::MAX);

        let reports = trace.replay(&mut InputContext::default());
        assert_eq!(reports.len(), 3);
        assert_eq!(reports[2].stamp.time, Duration::MAX);
        assert_eq!(reports[1].gestures[0].label(), "hold");
    }

    #[test]
    fn test_empty_trace() {
        let trace = TouchTrace::default();
        assert!(trace.is_empty());
        assert_eq!(trace.duration(), Duration::ZERO);
        assert!(trace.gestures(&mut InputContext::default()).is_empty());
    }
}
