//! Recognized gesture payloads.
//!
//! These are immutable values created by the recognizer at the moment of
//! recognition. Two-point geometry carries start, current and per-frame delta
//! of the inter-touch distance, angle and centroid.

use crate::event::EventCategory;
use crate::geometry::Point;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Phase of a continuous drag gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragPhase {
    /// First event of the drag.
    Begin,
    /// Drag continued this frame.
    Update,
    /// Drag finished.
    End,
}

impl DragPhase {
    /// Check if the drag is still in progress after this event.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Begin | Self::Update)
    }
}

/// Tap or double-tap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TapGesture {
    /// Where the contact lifted.
    pub position: Point,
}

/// Press that lasted past the tap window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoldGesture {
    /// Where the contact lifted.
    pub position: Point,
    /// How long the contact was down.
    pub duration: Duration,
}

/// Single-contact drag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OnePointDragGesture {
    /// Begin, update or end.
    pub phase: DragPhase,
    /// Where the contact went down.
    pub start_position: Point,
    /// Current contact position.
    pub position: Point,
    /// Movement since the previous frame.
    pub delta: Point,
}

impl OnePointDragGesture {
    /// Total displacement from the start position.
    #[must_use]
    pub fn translation(&self) -> Point {
        self.position - self.start_position
    }
}

/// Two-contact drag with derived pinch and rotation geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TwoPointDragGesture {
    /// Begin, update or end.
    pub phase: DragPhase,
    /// Current position of each contact.
    pub positions: [Point; 2],
    /// Per-frame movement of each contact.
    pub deltas: [Point; 2],
    /// Inter-contact distance when the second contact arrived.
    pub start_distance: f32,
    /// Current inter-contact distance.
    pub distance: f32,
    /// Distance change since the previous frame.
    pub delta_distance: f32,
    /// Angle of the first-to-second contact vector when the second contact arrived.
    pub start_angle: f32,
    /// Current angle in radians.
    pub angle: f32,
    /// Angle change since the previous frame, wrapped into (-π, π].
    pub delta_angle: f32,
    /// Midpoint when the second contact arrived.
    pub start_centroid: Point,
    /// Current midpoint.
    pub centroid: Point,
    /// Midpoint movement since the previous frame.
    pub delta_centroid: Point,
}

impl TwoPointDragGesture {
    /// Ratio of current to starting distance (1.0 when unchanged).
    #[must_use]
    pub fn scale(&self) -> f32 {
        if self.start_distance <= f32::EPSILON {
            1.0
        } else {
            self.distance / self.start_distance
        }
    }
}

/// A recognized gesture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GestureEvent {
    /// Short press and release.
    Tap(TapGesture),
    /// Tap following another tap within the double-tap window.
    DoubleTap(TapGesture),
    /// Long press and release.
    Hold(HoldGesture),
    /// Single-contact drag.
    OnePointDrag(OnePointDragGesture),
    /// Two-contact drag.
    TwoPointDrag(TwoPointDragGesture),
}

impl GestureEvent {
    /// Registration category for this gesture.
    #[must_use]
    pub const fn category(&self) -> EventCategory {
        match self {
            Self::Tap(_) => EventCategory::Tap,
            Self::DoubleTap(_) => EventCategory::DoubleTap,
            Self::Hold(_) => EventCategory::Hold,
            Self::OnePointDrag(_) => EventCategory::OnePointDrag,
            Self::TwoPointDrag(_) => EventCategory::TwoPointDrag,
        }
    }

    /// Drag phase, for drag gestures.
    #[must_use]
    pub const fn phase(&self) -> Option<DragPhase> {
        match self {
            Self::OnePointDrag(drag) => Some(drag.phase),
            Self::TwoPointDrag(drag) => Some(drag.phase),
            Self::Tap(_) | Self::DoubleTap(_) | Self::Hold(_) => None,
        }
    }

    /// Short label such as `tap` or `two_point_drag_begin`.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Tap(_) => "tap",
            Self::DoubleTap(_) => "double_tap",
            Self::Hold(_) => "hold",
            Self::OnePointDrag(drag) => match drag.phase {
                DragPhase::Begin => "one_point_drag_begin",
                DragPhase::Update => "one_point_drag_update",
                DragPhase::End => "one_point_drag_end",
            },
            Self::TwoPointDrag(drag) => match drag.phase {
                DragPhase::Begin => "two_point_drag_begin",
                DragPhase::Update => "two_point_drag_update",
                DragPhase::End => "two_point_drag_end",
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_point(phase: DragPhase, start_distance: f32, distance: f32) -> TwoPointDragGesture {
        TwoPointDragGesture {
            phase,
            positions: [Point::ORIGIN, Point::new(distance, 0.0)],
            deltas: [Point::ORIGIN; 2],
            start_distance,
            distance,
            delta_distance: 0.0,
            start_angle: 0.0,
            angle: 0.0,
            delta_angle: 0.0,
            start_centroid: Point::ORIGIN,
            centroid: Point::new(distance / 2.0, 0.0),
            delta_centroid: Point::ORIGIN,
        }
    }

    #[test]
    fn test_drag_phase_is_active() {
        assert!(DragPhase::Begin.is_active());
        assert!(DragPhase::Update.is_active());
        assert!(!DragPhase::End.is_active());
    }

    #[test]
    fn test_one_point_translation() {
        let drag = OnePointDragGesture {
            phase: DragPhase::Update,
            start_position: Point::new(10.0, 10.0),
            position: Point::new(40.0, 50.0),
            delta: Point::new(1.0, 1.0),
        };
        assert_eq!(drag.translation(), Point::new(30.0, 40.0));
    }

    #[test]
    fn test_two_point_scale() {
        assert_eq!(two_point(DragPhase::Update, 100.0, 150.0).scale(), 1.5);
        assert_eq!(two_point(DragPhase::Update, 0.0, 150.0).scale(), 1.0);
    }

    #[test]
    fn test_gesture_labels_and_categories() {
        let tap = GestureEvent::Tap(TapGesture {
            position: Point::ORIGIN,
        });
        assert_eq!(tap.label(), "tap");
        assert_eq!(tap.category(), EventCategory::Tap);
        assert_eq!(tap.phase(), None);

        let end = GestureEvent::TwoPointDrag(two_point(DragPhase::End, 10.0, 10.0));
        assert_eq!(end.label(), "two_point_drag_end");
        assert_eq!(end.category(), EventCategory::TwoPointDrag);
        assert_eq!(end.phase(), Some(DragPhase::End));
    }
}
