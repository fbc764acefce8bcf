//! Multi-touch gesture recognition.
//!
//! [`GestureRecognizer`] is fed every touch sample of a frame at once and turns
//! one- and two-contact streams into taps, double taps, holds and drags.
//!
//! Each frame runs two passes over the samples. The first updates the
//! positions of tracked contacts and the derived two-point geometry, so a
//! frame in which both contacts moved sees both new positions regardless of
//! sample order. The second pass drives the state machine:
//!
//! ```text
//!            press                 second contact
//!   None ───────────▶ OnePoint ─────────────────▶ TwoPoint
//!    ▲   ◀─────────── │    ▲   ◀───────────────── │
//!    │  release       │    │     either release   │ distance > threshold
//!    │ (tap / hold)   │    │                      ▼
//!    │                ▼    └────────────────── TwoPointDrag
//!    └────────── OnePointDrag   either release
//!      release      (moved past threshold)
//! ```
//!
//! Only two contacts are tracked. A third is ignored until a slot frees up.

use crate::clock::FrameStamp;
use crate::config::GestureConfig;
use crate::event::{TouchId, TouchSample, TouchState};
use crate::geometry::{wrap_angle, Point};
use crate::gesture::{
    DragPhase, GestureEvent, HoldGesture, OnePointDragGesture, TapGesture, TwoPointDragGesture,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Recognizer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecognizerState {
    /// No contact tracked.
    #[default]
    None,
    /// One contact down, not yet dragging.
    OnePoint,
    /// One contact dragging.
    OnePointDrag,
    /// Two contacts down, not yet dragging.
    TwoPoint,
    /// Two contacts dragging.
    TwoPointDrag,
}

impl RecognizerState {
    /// Number of contacts tracked in this state.
    #[must_use]
    pub const fn contacts(self) -> usize {
        match self {
            Self::None => 0,
            Self::OnePoint | Self::OnePointDrag => 1,
            Self::TwoPoint | Self::TwoPointDrag => 2,
        }
    }
}

/// A tracked contact.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ActiveTouch {
    /// Platform contact id.
    pub id: TouchId,
    /// Whether this slot tracks a live contact.
    pub valid: bool,
    /// When the contact went down.
    pub start: FrameStamp,
    /// Where the contact went down.
    pub start_position: Point,
    /// Latest position.
    pub position: Point,
    /// Movement during the latest frame.
    pub delta: Point,
}

impl ActiveTouch {
    fn begin(&mut self, sample: &TouchSample, now: FrameStamp) {
        *self = Self {
            id: sample.id,
            valid: true,
            start: now,
            start_position: sample.position,
            position: sample.position,
            delta: Point::ORIGIN,
        };
    }

    /// Time since the contact went down.
    #[must_use]
    pub fn elapsed(&self, now: FrameStamp) -> Duration {
        now.time.saturating_sub(self.start.time)
    }

    /// Distance from where the contact went down.
    #[must_use]
    pub fn travel(&self) -> f32 {
        self.position.distance(&self.start_position)
    }
}

/// Geometry derived from two tracked contacts.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TwoPointMetrics {
    /// Distance when the second contact arrived.
    pub start_distance: f32,
    /// Current distance.
    pub distance: f32,
    /// Change during the latest frame.
    pub delta_distance: f32,
    /// Angle of `touch0 - touch1` when the second contact arrived.
    pub start_angle: f32,
    /// Current angle.
    pub angle: f32,
    /// Change during the latest frame, in (-π, π].
    pub delta_angle: f32,
    /// Midpoint when the second contact arrived.
    pub start_centroid: Point,
    /// Current midpoint.
    pub centroid: Point,
    /// Midpoint movement during the latest frame.
    pub delta_centroid: Point,
}

impl TwoPointMetrics {
    fn snapshot(p0: Point, p1: Point) -> Self {
        let distance = p0.distance(&p1);
        let angle = (p0 - p1).angle();
        let centroid = p0.midpoint(&p1);
        Self {
            start_distance: distance,
            distance,
            delta_distance: 0.0,
            start_angle: angle,
            angle,
            delta_angle: 0.0,
            start_centroid: centroid,
            centroid,
            delta_centroid: Point::ORIGIN,
        }
    }

    fn update(&mut self, p0: Point, p1: Point) {
        let distance = p0.distance(&p1);
        let angle = (p0 - p1).angle();
        let centroid = p0.midpoint(&p1);
        self.delta_distance = distance - self.distance;
        self.distance = distance;
        self.delta_angle = wrap_angle(angle - self.angle);
        self.angle = angle;
        self.delta_centroid = centroid - self.centroid;
        self.centroid = centroid;
    }
}

/// Frame-driven gesture state machine.
#[derive(Debug, Clone)]
pub struct GestureRecognizer {
    config: GestureConfig,
    state: RecognizerState,
    /// Arena of contact records, reused across gestures.
    touches: [ActiveTouch; 2],
    /// Logical touch (0 or 1) to arena slot.
    order: [usize; 2],
    metrics: TwoPointMetrics,
    /// Set once two contacts are down; cleared on return to `None`.
    was_two_point: bool,
    /// At most one two-point transition per frame.
    two_point_moved: bool,
    last_tap_end: Option<FrameStamp>,
    anomalies: u64,
}

impl Default for GestureRecognizer {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}

impl GestureRecognizer {
    /// Create a recognizer with the given thresholds.
    #[must_use]
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            state: RecognizerState::None,
            touches: [ActiveTouch::default(); 2],
            order: [0, 1],
            metrics: TwoPointMetrics::default(),
            was_two_point: false,
            two_point_moved: false,
            last_tap_end: None,
            anomalies: 0,
        }
    }

    /// Thresholds in use.
    #[must_use]
    pub const fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Replace the thresholds. Tracked contacts are kept.
    pub fn set_config(&mut self, config: GestureConfig) {
        self.config = config;
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> RecognizerState {
        self.state
    }

    /// Check if any contact is tracked.
    #[must_use]
    pub fn is_tracking(&self) -> bool {
        self.state != RecognizerState::None
    }

    /// Logical touch 0 or 1, if it tracks a live contact.
    #[must_use]
    pub fn active_touch(&self, index: usize) -> Option<&ActiveTouch> {
        self.order
            .get(index)
            .map(|&slot| &self.touches[slot])
            .filter(|touch| touch.valid)
    }

    /// Two-point geometry while two contacts are tracked.
    #[must_use]
    pub fn two_point(&self) -> Option<&TwoPointMetrics> {
        (self.state.contacts() == 2).then_some(&self.metrics)
    }

    /// End of the most recent tap, suppressed or not.
    #[must_use]
    pub const fn last_tap_end(&self) -> Option<FrameStamp> {
        self.last_tap_end
    }

    /// Number of malformed sample sequences seen and ignored.
    #[must_use]
    pub const fn anomalies(&self) -> u64 {
        self.anomalies
    }

    /// Process every touch sample of one frame.
    ///
    /// Must be called exactly once per frame, with the samples in the order
    /// the platform reported them.
    pub fn process_touch_samples(
        &mut self,
        samples: &[TouchSample],
        now: FrameStamp,
    ) -> Vec<GestureEvent> {
        self.update_positions(samples);
        self.two_point_moved = false;

        let mut out = Vec::new();
        for sample in samples {
            if sample.state == TouchState::Invalid {
                tracing::trace!(id = sample.id.0, "skipping invalid touch sample");
                continue;
            }
            match self.state {
                RecognizerState::None => self.on_idle(sample, now),
                RecognizerState::OnePoint => self.on_one_point(sample, now, &mut out),
                RecognizerState::OnePointDrag => self.on_one_point_drag(sample, &mut out),
                RecognizerState::TwoPoint => self.on_two_point(sample, now, &mut out),
                RecognizerState::TwoPointDrag => self.on_two_point_drag(sample, &mut out),
            }
        }
        out
    }

    /// Drop every tracked contact, ending any drag in progress.
    ///
    /// Used when the touch device goes away mid-gesture.
    pub fn cancel(&mut self, now: FrameStamp) -> Vec<GestureEvent> {
        let mut out = Vec::new();
        match self.state {
            RecognizerState::OnePointDrag => {
                self.emit(&mut out, self.one_point_event(DragPhase::End));
            }
            RecognizerState::TwoPointDrag => {
                self.emit(&mut out, self.two_point_event(DragPhase::End));
            }
            RecognizerState::None | RecognizerState::OnePoint | RecognizerState::TwoPoint => {}
        }
        if self.is_tracking() {
            tracing::debug!(state = ?self.state, frame = now.frame, "gesture cancelled");
        }
        self.reset();
        out
    }

    // =========================================================================
    // Pass 1: positions
    // =========================================================================

    fn update_positions(&mut self, samples: &[TouchSample]) {
        for sample in samples {
            if sample.state == TouchState::Invalid {
                continue;
            }
            if let Some(index) = self.logical_index(sample.id) {
                let touch = self.touch_mut(index);
                touch.delta = sample.position - touch.position;
                touch.position = sample.position;
            }
        }
        if self.touch(0).valid && self.touch(1).valid {
            let (p0, p1) = (self.touch(0).position, self.touch(1).position);
            self.metrics.update(p0, p1);
        }
    }

    // =========================================================================
    // Pass 2: recognition
    // =========================================================================

    fn on_idle(&mut self, sample: &TouchSample, now: FrameStamp) {
        match sample.state {
            TouchState::Pressed => {}
            TouchState::Moved => {
                self.anomaly("moved without a press; treating as a press", sample);
            }
            TouchState::Released | TouchState::Invalid => return,
        }
        self.begin_touch(0, sample, now);
        self.state = RecognizerState::OnePoint;
    }

    fn on_one_point(&mut self, sample: &TouchSample, now: FrameStamp, out: &mut Vec<GestureEvent>) {
        match (self.logical_index(sample.id), sample.state) {
            (Some(0), TouchState::Released) => self.finish_one_point(now, out),
            (Some(0), TouchState::Moved) => {
                if self.touch(0).travel() > self.config.drag_distance && !self.was_two_point {
                    self.emit(out, self.one_point_event(DragPhase::Begin));
                    self.state = RecognizerState::OnePointDrag;
                }
            }
            (Some(_), TouchState::Pressed) => self.anomaly("press for a tracked contact", sample),
            (None, TouchState::Pressed | TouchState::Moved) => {
                self.begin_touch(1, sample, now);
                self.metrics = TwoPointMetrics::snapshot(self.touch(0).position, sample.position);
                self.state = RecognizerState::TwoPoint;
            }
            _ => {}
        }
    }

    fn finish_one_point(&mut self, now: FrameStamp, out: &mut Vec<GestureEvent>) {
        let touch = *self.touch(0);
        let elapsed = touch.elapsed(now);
        let slack = self.config.frame_slack;
        let is_tap = elapsed < self.config.tap_time() || touch.start.frame + slack >= now.frame;

        if is_tap {
            let is_double = self.last_tap_end.is_some_and(|prev| {
                touch.start.time.saturating_sub(prev.time) < self.config.double_tap_time()
                    || prev.frame + slack >= now.frame
            });
            if !self.was_two_point {
                let tap = TapGesture {
                    position: touch.position,
                };
                let gesture = if is_double {
                    GestureEvent::DoubleTap(tap)
                } else {
                    GestureEvent::Tap(tap)
                };
                self.emit(out, gesture);
            }
            self.last_tap_end = Some(now);
        } else if !self.was_two_point {
            self.emit(
                out,
                GestureEvent::Hold(HoldGesture {
                    position: touch.position,
                    duration: elapsed,
                }),
            );
        }
        self.reset();
    }

    fn on_one_point_drag(&mut self, sample: &TouchSample, out: &mut Vec<GestureEvent>) {
        if self.logical_index(sample.id) != Some(0) {
            return;
        }
        match sample.state {
            TouchState::Moved => self.emit(out, self.one_point_event(DragPhase::Update)),
            TouchState::Released => {
                self.emit(out, self.one_point_event(DragPhase::End));
                self.reset();
            }
            TouchState::Pressed => self.anomaly("press for a dragging contact", sample),
            TouchState::Invalid => {}
        }
    }

    fn on_two_point(&mut self, sample: &TouchSample, now: FrameStamp, out: &mut Vec<GestureEvent>) {
        self.was_two_point = true;
        match (self.logical_index(sample.id), sample.state) {
            (Some(0), TouchState::Released) => {
                if self.is_overlapping_tap(now) {
                    let tap = TapGesture {
                        position: self.touch(0).position,
                    };
                    self.emit(out, GestureEvent::Tap(tap));
                    self.last_tap_end = Some(now);
                    self.was_two_point = false;
                }
                self.shift();
                self.state = RecognizerState::OnePoint;
            }
            (Some(1), TouchState::Released) => {
                self.invalidate(1);
                self.state = RecognizerState::OnePoint;
            }
            (Some(_), TouchState::Moved) if !self.two_point_moved => {
                self.two_point_moved = true;
                if self.metrics.distance > self.config.drag_distance {
                    self.emit(out, self.two_point_event(DragPhase::Begin));
                    self.state = RecognizerState::TwoPointDrag;
                }
            }
            (Some(_), TouchState::Pressed) => self.anomaly("press for a tracked contact", sample),
            _ => {}
        }
    }

    /// A fast second tap can land one frame after the first press and be
    /// reported before the first release, which would otherwise read as a
    /// two-point gesture.
    fn is_overlapping_tap(&self, now: FrameStamp) -> bool {
        let (t0, t1) = (self.touch(0), self.touch(1));
        self.config.overlap_tap_compensation
            && now.frame == t0.start.frame + 2
            && t1.start.frame == t0.start.frame + 1
    }

    fn on_two_point_drag(&mut self, sample: &TouchSample, out: &mut Vec<GestureEvent>) {
        match (self.logical_index(sample.id), sample.state) {
            (Some(_), TouchState::Moved) if !self.two_point_moved => {
                self.two_point_moved = true;
                self.emit(out, self.two_point_event(DragPhase::Update));
            }
            (Some(0), TouchState::Released) => {
                self.emit(out, self.two_point_event(DragPhase::End));
                self.shift();
                self.state = RecognizerState::OnePoint;
            }
            (Some(1), TouchState::Released) => {
                self.emit(out, self.two_point_event(DragPhase::End));
                self.invalidate(1);
                self.state = RecognizerState::OnePoint;
            }
            (Some(_), TouchState::Pressed) => self.anomaly("press for a dragging contact", sample),
            _ => {}
        }
    }

    // =========================================================================
    // Touch slots
    // =========================================================================

    fn touch(&self, index: usize) -> &ActiveTouch {
        &self.touches[self.order[index]]
    }

    fn touch_mut(&mut self, index: usize) -> &mut ActiveTouch {
        &mut self.touches[self.order[index]]
    }

    fn logical_index(&self, id: TouchId) -> Option<usize> {
        (0..2).find(|&i| {
            let touch = self.touch(i);
            touch.valid && touch.id == id
        })
    }

    fn begin_touch(&mut self, index: usize, sample: &TouchSample, now: FrameStamp) {
        self.touch_mut(index).begin(sample, now);
    }

    fn invalidate(&mut self, index: usize) {
        self.touch_mut(index).valid = false;
    }

    /// Promote touch 1 to touch 0 and free the vacated slot.
    fn shift(&mut self) {
        self.order.swap(0, 1);
        self.invalidate(1);
    }

    fn reset(&mut self) {
        self.invalidate(0);
        self.invalidate(1);
        self.state = RecognizerState::None;
        self.was_two_point = false;
    }

    // =========================================================================
    // Events
    // =========================================================================

    fn one_point_event(&self, phase: DragPhase) -> GestureEvent {
        let touch = self.touch(0);
        GestureEvent::OnePointDrag(OnePointDragGesture {
            phase,
            start_position: touch.start_position,
            position: touch.position,
            delta: touch.delta,
        })
    }

    fn two_point_event(&self, phase: DragPhase) -> GestureEvent {
        let (t0, t1) = (self.touch(0), self.touch(1));
        let m = &self.metrics;
        GestureEvent::TwoPointDrag(TwoPointDragGesture {
            phase,
            positions: [t0.position, t1.position],
            deltas: [t0.delta, t1.delta],
            start_distance: m.start_distance,
            distance: m.distance,
            delta_distance: m.delta_distance,
            start_angle: m.start_angle,
            angle: m.angle,
            delta_angle: m.delta_angle,
            start_centroid: m.start_centroid,
            centroid: m.centroid,
            delta_centroid: m.delta_centroid,
        })
    }

    fn emit(&self, out: &mut Vec<GestureEvent>, gesture: GestureEvent) {
        tracing::trace!(gesture = gesture.label(), state = ?self.state, "gesture recognized");
        out.push(gesture);
    }

    fn anomaly(&mut self, reason: &'static str, sample: &TouchSample) {
        self.anomalies += 1;
        tracing::warn!(
            reason,
            id = sample.id.0,
            state = ?self.state,
            "malformed touch sequence ignored"
        );
    }
}
