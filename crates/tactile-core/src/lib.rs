//! Core input handling for Tactile.
//!
//! This crate turns raw per-frame input into routed events:
//! - Touch gestures: [`GestureRecognizer`] turns [`TouchSample`]s into
//!   [`GestureEvent`]s (tap, double tap, hold, one- and two-point drags)
//! - Dispatch: [`EventDispatcher`] offers each [`InputEvent`] to the focus
//!   holder, the hit object, then registered [`InputHandler`]s
//! - Scopes: [`ScopeStack`] isolates modal UI from everything registered below
//! - Gamepads: [`GamepadTracker`] turns held-button masks into edges
//! - [`InputContext`] owns all of the above for one process
//! - [`TouchTrace`] records touch frames for replay

#![warn(missing_docs)]

pub mod clock;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod focus;
pub mod gamepad;
pub mod geometry;
pub mod gesture;
pub mod handler;
pub mod recognizer;
pub mod scope;
pub mod trace;

pub use clock::{FrameClock, FrameStamp};
pub use config::{DispatchConfig, GestureConfig, InputConfig};
pub use context::{FrameReport, InputContext};
pub use dispatch::{EventContext, EventDispatcher};
pub use error::{InputError, Result};
pub use event::{
    EventCategory, InputEvent, Key, KeyEvent, KeyState, Modifiers, MouseButton, TouchId,
    TouchSample, TouchState,
};
pub use focus::{FocusSlot, HitSlot};
pub use gamepad::{ButtonState, GamepadButton, GamepadEvent, GamepadTracker, PlayerIndex};
pub use geometry::{wrap_angle, Point};
pub use gesture::{
    DragPhase, GestureEvent, HoldGesture, OnePointDragGesture, TapGesture, TwoPointDragGesture,
};
pub use handler::{handler_ref, same_handler, Handled, HandlerRef, HandlerWeak, InputHandler};
pub use recognizer::{ActiveTouch, GestureRecognizer, RecognizerState, TwoPointMetrics};
pub use scope::{HandlerLists, ScopeId, ScopeStack};
pub use trace::{TouchTrace, TraceFrame, TraceTouch};
