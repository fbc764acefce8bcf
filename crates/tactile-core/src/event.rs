//! Input events delivered to handlers.
//!
//! Every event maps to exactly one [`EventCategory`]; the dispatcher keeps one
//! registration list per category.

use crate::gamepad::GamepadEvent;
use crate::geometry::Point;
use crate::gesture::{GestureEvent, HoldGesture, OnePointDragGesture, TapGesture, TwoPointDragGesture};
use crate::handler::{HandlerRef, HandlerWeak};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// Touch identifier assigned by the platform for the lifetime of a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct TouchId(pub u32);

impl TouchId {
    /// Create a new touch ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

/// Location state reported for a touch contact in one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TouchState {
    /// Contact went down this frame.
    Pressed,
    /// Contact is still down (possibly at a new position).
    Moved,
    /// Contact lifted this frame.
    Released,
    /// Platform could not report a usable state.
    Invalid,
}

impl TouchState {
    /// Check if the contact is down (pressed or moved).
    #[must_use]
    pub const fn is_down(&self) -> bool {
        matches!(self, Self::Pressed | Self::Moved)
    }
}

/// One platform touch report for the current frame.
#[derive(Debug, Clone)]
pub struct TouchSample {
    /// Contact identifier.
    pub id: TouchId,
    /// Location state.
    pub state: TouchState,
    /// Screen position in pixels.
    pub position: Point,
    /// Object under the contact, if the platform layer resolved one.
    pub hit_object: Option<HandlerWeak>,
}

impl TouchSample {
    /// Create a sample without a hit object.
    #[must_use]
    pub const fn new(id: TouchId, state: TouchState, position: Point) -> Self {
        Self {
            id,
            state,
            position,
            hit_object: None,
        }
    }

    /// A `Pressed` sample.
    #[must_use]
    pub const fn pressed(id: u32, position: Point) -> Self {
        Self::new(TouchId(id), TouchState::Pressed, position)
    }

    /// A `Moved` sample.
    #[must_use]
    pub const fn moved(id: u32, position: Point) -> Self {
        Self::new(TouchId(id), TouchState::Moved, position)
    }

    /// A `Released` sample.
    #[must_use]
    pub const fn released(id: u32, position: Point) -> Self {
        Self::new(TouchId(id), TouchState::Released, position)
    }

    /// Attach the handler found under this contact.
    #[must_use]
    pub fn with_hit_object(mut self, handler: &HandlerRef) -> Self {
        self.hit_object = Some(Rc::downgrade(handler));
        self
    }
}

impl PartialEq for TouchSample {
    fn eq(&self, other: &Self) -> bool {
        let same_hit = match (&self.hit_object, &other.hit_object) {
            (None, None) => true,
            (Some(a), Some(b)) => a.ptr_eq(b),
            _ => false,
        };
        self.id == other.id
            && self.state == other.state
            && self.position == other.position
            && same_hit
    }
}

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    /// Left mouse button
    Left,
    /// Right mouse button
    Right,
    /// Middle mouse button (wheel click)
    Middle,
}

/// Keyboard key identifiers. Variants are named after their key caps.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    // Letters
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    // Digits
    Num0,
    Num1,
    Num2,
    Num3,
    Num4,
    Num5,
    Num6,
    Num7,
    Num8,
    Num9,
    // Editing and navigation
    Enter,
    Escape,
    Backspace,
    Tab,
    Space,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,
    // Modifiers
    Shift,
    Control,
    Alt,
}

/// Press state of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyState {
    /// Key went down.
    Pressed,
    /// Key is held and the platform generated a repeat.
    Repeat,
    /// Key went up.
    Released,
}

/// Modifier keys held during a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Modifiers {
    /// Control key.
    pub ctrl: bool,
    /// Alt key.
    pub alt: bool,
    /// Shift key.
    pub shift: bool,
}

impl Modifiers {
    /// No modifiers.
    pub const NONE: Self = Self {
        ctrl: false,
        alt: false,
        shift: false,
    };

    /// Shift only.
    pub const SHIFT: Self = Self {
        ctrl: false,
        alt: false,
        shift: true,
    };
}

/// A keyboard transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyEvent {
    /// Key that changed.
    pub key: Key,
    /// New state.
    pub state: KeyState,
    /// Modifiers held at the time.
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// Key pressed with no modifiers.
    #[must_use]
    pub const fn pressed(key: Key) -> Self {
        Self {
            key,
            state: KeyState::Pressed,
            modifiers: Modifiers::NONE,
        }
    }

    /// Key released with no modifiers.
    #[must_use]
    pub const fn released(key: Key) -> Self {
        Self {
            key,
            state: KeyState::Released,
            modifiers: Modifiers::NONE,
        }
    }

    /// Replace the modifier state.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Input event types.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Mouse button pressed
    MouseDown {
        /// Button pressed
        button: MouseButton,
        /// Cursor position
        position: Point,
    },
    /// Mouse button released
    MouseUp {
        /// Button released
        button: MouseButton,
        /// Cursor position
        position: Point,
    },
    /// Cursor moved
    MouseMove {
        /// New position
        position: Point,
        /// Movement since the previous report
        delta: Point,
    },
    /// Mouse wheel scrolled
    MouseWheel {
        /// Cursor position
        position: Point,
        /// Wheel delta in notches, positive away from the user
        delta: f32,
    },
    /// Keyboard transition
    Key(KeyEvent),
    /// Raw touch sample
    Touch(TouchSample),
    /// Tap gesture
    Tap(TapGesture),
    /// Double-tap gesture
    DoubleTap(TapGesture),
    /// Hold gesture
    Hold(HoldGesture),
    /// One-point drag (begin, update or end)
    OnePointDrag(OnePointDragGesture),
    /// Two-point drag (begin, update or end)
    TwoPointDrag(TwoPointDragGesture),
    /// Gamepad button transition
    Gamepad(GamepadEvent),
}

impl InputEvent {
    /// Registration category this event is dispatched to.
    #[must_use]
    pub const fn category(&self) -> EventCategory {
        match self {
            Self::MouseDown { button, .. } => match button {
                MouseButton::Left => EventCategory::MouseLeftDown,
                MouseButton::Right => EventCategory::MouseRightDown,
                MouseButton::Middle => EventCategory::MouseMiddleDown,
            },
            Self::MouseUp { button, .. } => match button {
                MouseButton::Left => EventCategory::MouseLeftUp,
                MouseButton::Right => EventCategory::MouseRightUp,
                MouseButton::Middle => EventCategory::MouseMiddleUp,
            },
            Self::MouseMove { .. } => EventCategory::MouseMove,
            Self::MouseWheel { .. } => EventCategory::MouseWheel,
            Self::Key(_) => EventCategory::Keyboard,
            Self::Touch(_) => EventCategory::Touch,
            Self::Tap(_) => EventCategory::Tap,
            Self::DoubleTap(_) => EventCategory::DoubleTap,
            Self::Hold(_) => EventCategory::Hold,
            Self::OnePointDrag(_) => EventCategory::OnePointDrag,
            Self::TwoPointDrag(_) => EventCategory::TwoPointDrag,
            Self::Gamepad(_) => EventCategory::Gamepad,
        }
    }

    /// Screen position of a pointer or touch event.
    #[must_use]
    pub const fn position(&self) -> Option<Point> {
        match self {
            Self::MouseDown { position, .. }
            | Self::MouseUp { position, .. }
            | Self::MouseMove { position, .. }
            | Self::MouseWheel { position, .. } => Some(*position),
            Self::Touch(sample) => Some(sample.position),
            Self::Tap(tap) | Self::DoubleTap(tap) => Some(tap.position),
            Self::Hold(hold) => Some(hold.position),
            Self::OnePointDrag(drag) => Some(drag.position),
            Self::TwoPointDrag(drag) => Some(drag.centroid),
            Self::Key(_) | Self::Gamepad(_) => None,
        }
    }
}

impl From<GestureEvent> for InputEvent {
    fn from(gesture: GestureEvent) -> Self {
        match gesture {
            GestureEvent::Tap(tap) => Self::Tap(tap),
            GestureEvent::DoubleTap(tap) => Self::DoubleTap(tap),
            GestureEvent::Hold(hold) => Self::Hold(hold),
            GestureEvent::OnePointDrag(drag) => Self::OnePointDrag(drag),
            GestureEvent::TwoPointDrag(drag) => Self::TwoPointDrag(drag),
        }
    }
}

/// Registration category: one handler list per category per scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    /// Left button down
    MouseLeftDown,
    /// Left button up
    MouseLeftUp,
    /// Right button down
    MouseRightDown,
    /// Right button up
    MouseRightUp,
    /// Middle button down
    MouseMiddleDown,
    /// Middle button up
    MouseMiddleUp,
    /// Cursor movement
    MouseMove,
    /// Wheel
    MouseWheel,
    /// Keyboard transitions
    Keyboard,
    /// Raw touch samples
    Touch,
    /// Tap gesture
    Tap,
    /// Double-tap gesture
    DoubleTap,
    /// Hold gesture
    Hold,
    /// One-point drag gesture
    OnePointDrag,
    /// Two-point drag gesture
    TwoPointDrag,
    /// Gamepad buttons
    Gamepad,
}

impl EventCategory {
    /// Number of categories.
    pub const COUNT: usize = 16;

    /// Every category, in declaration order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::MouseLeftDown,
        Self::MouseLeftUp,
        Self::MouseRightDown,
        Self::MouseRightUp,
        Self::MouseMiddleDown,
        Self::MouseMiddleUp,
        Self::MouseMove,
        Self::MouseWheel,
        Self::Keyboard,
        Self::Touch,
        Self::Tap,
        Self::DoubleTap,
        Self::Hold,
        Self::OnePointDrag,
        Self::TwoPointDrag,
        Self::Gamepad,
    ];

    /// Mouse button, movement and wheel categories.
    pub const MOUSE: [Self; 8] = [
        Self::MouseLeftDown,
        Self::MouseLeftUp,
        Self::MouseRightDown,
        Self::MouseRightUp,
        Self::MouseMiddleDown,
        Self::MouseMiddleUp,
        Self::MouseMove,
        Self::MouseWheel,
    ];

    /// Recognized gesture categories.
    pub const GESTURES: [Self; 5] = [
        Self::Tap,
        Self::DoubleTap,
        Self::Hold,
        Self::OnePointDrag,
        Self::TwoPointDrag,
    ];

    /// Dense index of this category, in `0..COUNT`.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Check if this is a mouse category.
    #[must_use]
    pub const fn is_mouse(self) -> bool {
        self.index() <= Self::MouseWheel.index()
    }

    /// Check if this is a recognized gesture category.
    #[must_use]
    pub const fn is_gesture(self) -> bool {
        matches!(
            self,
            Self::Tap | Self::DoubleTap | Self::Hold | Self::OnePointDrag | Self::TwoPointDrag
        )
    }

    /// Stable snake_case name, used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::MouseLeftDown => "mouse_left_down",
            Self::MouseLeftUp => "mouse_left_up",
            Self::MouseRightDown => "mouse_right_down",
            Self::MouseRightUp => "mouse_right_up",
            Self::MouseMiddleDown => "mouse_middle_down",
            Self::MouseMiddleUp => "mouse_middle_up",
            Self::MouseMove => "mouse_move",
            Self::MouseWheel => "mouse_wheel",
            Self::Keyboard => "keyboard",
            Self::Touch => "touch",
            Self::Tap => "tap",
            Self::DoubleTap => "double_tap",
            Self::Hold => "hold",
            Self::OnePointDrag => "one_point_drag",
            Self::TwoPointDrag => "two_point_drag",
            Self::Gamepad => "gamepad",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
