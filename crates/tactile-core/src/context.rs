//! Per-process input context.
//!
//! [`InputContext`] owns every piece of input state (clock, recognizer,
//! dispatcher, gamepad tracker) so that independent contexts can coexist, for
//! example one per test. The platform loop drives it once per frame:
//!
//! ```
//! use std::time::Duration;
//! use tactile_core::{InputContext, Point, TouchSample};
//!
//! let mut input = InputContext::default();
//! input.begin_frame(Duration::from_millis(16));
//! input.process_touch_frame(&[TouchSample::pressed(0, Point::new(10.0, 10.0))]);
//! input.begin_frame(Duration::from_millis(16));
//! let report = input.process_touch_frame(&[TouchSample::released(0, Point::new(10.0, 10.0))]);
//! assert_eq!(report.gestures.len(), 1);
//! ```

use crate::clock::{FrameClock, FrameStamp};
use crate::config::InputConfig;
use crate::dispatch::EventDispatcher;
use crate::error::Result;
use crate::event::{InputEvent, KeyEvent, MouseButton, TouchSample};
use crate::gamepad::{GamepadButton, GamepadTracker, PlayerIndex};
use crate::geometry::Point;
use crate::gesture::GestureEvent;
use crate::recognizer::GestureRecognizer;
use std::time::Duration;

/// What happened to one frame of touch input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    /// Frame the samples belonged to.
    pub stamp: FrameStamp,
    /// Gestures recognized, in emission order.
    pub gestures: Vec<GestureEvent>,
    /// Raw samples some handler consumed.
    pub consumed_touches: usize,
    /// Gestures some handler consumed.
    pub consumed_gestures: usize,
}

/// Input state for one process (or one test).
#[derive(Debug)]
pub struct InputContext {
    config: InputConfig,
    clock: FrameClock,
    recognizer: GestureRecognizer,
    dispatcher: EventDispatcher,
    gamepads: GamepadTracker,
    mouse_position: Point,
}

impl Default for InputContext {
    fn default() -> Self {
        Self::with_valid_config(InputConfig::default())
    }
}

impl InputContext {
    /// Create a context after validating `config`.
    pub fn new(config: InputConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: InputConfig) -> Self {
        Self {
            clock: FrameClock::new(),
            recognizer: GestureRecognizer::new(config.gesture.clone()),
            dispatcher: EventDispatcher::new(config.dispatch.clone()),
            gamepads: GamepadTracker::new(),
            mouse_position: Point::ORIGIN,
            config,
        }
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &InputConfig {
        &self.config
    }

    /// Stamp of the current frame.
    #[must_use]
    pub const fn now(&self) -> FrameStamp {
        self.clock.now()
    }

    /// The frame clock.
    #[must_use]
    pub const fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// The gesture recognizer.
    #[must_use]
    pub const fn recognizer(&self) -> &GestureRecognizer {
        &self.recognizer
    }

    /// The dispatcher.
    #[must_use]
    pub const fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    /// Mutable dispatcher, for registration, focus and scopes.
    pub fn dispatcher_mut(&mut self) -> &mut EventDispatcher {
        &mut self.dispatcher
    }

    /// Check if any handler holds a focus slot.
    #[must_use]
    pub fn any_focus(&self) -> bool {
        self.dispatcher.any_focus()
    }

    /// The gamepad tracker.
    #[must_use]
    pub const fn gamepads(&self) -> &GamepadTracker {
        &self.gamepads
    }

    /// Last reported cursor position.
    #[must_use]
    pub const fn mouse_position(&self) -> Point {
        self.mouse_position
    }

    /// Start a new frame.
    pub fn begin_frame(&mut self, delta: Duration) -> FrameStamp {
        let now = self.clock.advance(delta);
        self.dispatcher.set_frame_time(now.time);
        now
    }

    /// Run one frame of touch samples through the recognizer and dispatcher.
    ///
    /// Raw samples are dispatched first, then the gestures recognized from
    /// them.
    pub fn process_touch_frame(&mut self, samples: &[TouchSample]) -> FrameReport {
        let stamp = self.clock.now();
        let gestures = self.recognizer.process_touch_samples(samples, stamp);
        let consumed_touches = samples
            .iter()
            .filter(|sample| self.dispatcher.dispatch_touch(sample))
            .count();
        let consumed_gestures = self.dispatch_gestures(&gestures);
        FrameReport {
            stamp,
            gestures,
            consumed_touches,
            consumed_gestures,
        }
    }

    /// Drop every tracked contact, dispatching the end of any active drag.
    pub fn cancel_touches(&mut self) -> FrameReport {
        let stamp = self.clock.now();
        let gestures = self.recognizer.cancel(stamp);
        let consumed_gestures = self.dispatch_gestures(&gestures);
        FrameReport {
            stamp,
            gestures,
            consumed_touches: 0,
            consumed_gestures,
        }
    }

    fn dispatch_gestures(&mut self, gestures: &[GestureEvent]) -> usize {
        gestures
            .iter()
            .filter(|&&gesture| self.dispatcher.dispatch_gesture(gesture))
            .count()
    }

    /// Deliver a mouse button press at the current cursor position.
    pub fn mouse_down(&mut self, button: MouseButton) -> bool {
        self.dispatcher
            .dispatch_mouse_down(button, self.mouse_position)
    }

    /// Deliver a mouse button release at the current cursor position.
    pub fn mouse_up(&mut self, button: MouseButton) -> bool {
        self.dispatcher.dispatch_mouse_up(button, self.mouse_position)
    }

    /// Move the cursor and deliver the movement.
    pub fn mouse_move(&mut self, position: Point) -> bool {
        let delta = position - self.mouse_position;
        self.mouse_position = position;
        self.dispatcher
            .dispatch(&InputEvent::MouseMove { position, delta })
    }

    /// Deliver a wheel movement at the current cursor position.
    pub fn mouse_wheel(&mut self, delta: f32) -> bool {
        self.dispatcher.dispatch(&InputEvent::MouseWheel {
            position: self.mouse_position,
            delta,
        })
    }

    /// Deliver a keyboard transition.
    pub fn key(&mut self, key: KeyEvent) -> bool {
        self.dispatcher.dispatch_key(key)
    }

    /// Feed a player's held buttons; returns how many transitions were consumed.
    pub fn gamepad_buttons(&mut self, player: PlayerIndex, held: &[GamepadButton]) -> usize {
        let events = self.gamepads.update(player, held);
        self.dispatch_gamepad(events)
    }

    /// Feed a player's raw button mask; returns how many transitions were consumed.
    pub fn gamepad_mask(&mut self, player: PlayerIndex, mask: u32) -> usize {
        let events = self.gamepads.update_mask(player, mask);
        self.dispatch_gamepad(events)
    }

    /// Release everything a disconnected pad was holding.
    pub fn gamepad_disconnect(&mut self, player: PlayerIndex) -> usize {
        let events = self.gamepads.disconnect(player);
        self.dispatch_gamepad(events)
    }

    fn dispatch_gamepad(&mut self, events: Vec<crate::gamepad::GamepadEvent>) -> usize {
        events
            .into_iter()
            .filter(|&event| self.dispatcher.dispatch(&InputEvent::Gamepad(event)))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DispatchConfig;
    use crate::dispatch::EventContext;
    use crate::error::InputError;
    use crate::event::{EventCategory, Key};
    use crate::handler::{handler_ref, Handled, InputHandler};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Sink {
        seen: Rc<RefCell<Vec<EventCategory>>>,
    }

    impl InputHandler for Sink {
        fn handle(&mut self, event: &InputEvent, _ctx: &mut EventContext<'_>) -> Handled {
            self.seen.borrow_mut().push(event.category());
            Handled::Consumed
        }
    }

    fn sink(input: &mut InputContext, categories: &[EventCategory]) -> Rc<RefCell<Vec<EventCategory>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let handler = handler_ref(Sink {
            seen: Rc::clone(&seen),
        });
        input.dispatcher_mut().register_all(categories, &handler);
        // The dispatcher keeps the handler alive through its registration.
        seen
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = InputConfig {
            dispatch: DispatchConfig { max_scope_depth: 0 },
            ..InputConfig::default()
        };
        assert!(matches!(
            InputContext::new(config),
            Err(InputError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_any_focus_follows_dispatcher() {
        let mut input = InputContext::default();
        assert!(!input.any_focus());
        let handler = handler_ref(Sink {
            seen: Rc::new(RefCell::new(Vec::new())),
        });
        input
            .dispatcher_mut()
            .register(EventCategory::Keyboard, &handler);
        input
            .dispatcher_mut()
            .set_focus(crate::focus::FocusSlot::Keyboard, &handler);
        assert!(input.any_focus());
        input.dispatcher_mut().unregister_all(&handler);
        assert!(!input.any_focus());
    }

    #[test]
    fn test_begin_frame_sets_dispatch_time() {
        let mut input = InputContext::default();
        let stamp = input.begin_frame(Duration::from_millis(16));
        assert_eq!(stamp.frame, 1);
        assert_eq!(input.dispatcher().frame_time(), Duration::from_millis(16));
        assert_eq!(input.now(), stamp);
    }

    #[test]
    fn test_touch_frame_dispatches_samples_then_gestures() {
        let mut input = InputContext::default();
        let seen = sink(&mut input, &[EventCategory::Touch, EventCategory::Tap]);

        input.begin_frame(Duration::from_millis(16));
        let report = input.process_touch_frame(&[TouchSample::pressed(0, Point::ORIGIN)]);
        assert!(report.gestures.is_empty());
        assert_eq!(report.consumed_touches, 1);

        input.begin_frame(Duration::from_millis(16));
        let report = input.process_touch_frame(&[TouchSample::released(0, Point::ORIGIN)]);
        assert_eq!(report.gestures.len(), 1);
        assert_eq!(report.consumed_gestures, 1);
        assert_eq!(report.stamp.frame, 2);

        assert_eq!(
            *seen.borrow(),
            [EventCategory::Touch, EventCategory::Touch, EventCategory::Tap]
        );
    }

    #[test]
    fn test_cancel_touches_dispatches_drag_end() {
        let mut input = InputContext::default();
        let seen = sink(&mut input, &[EventCategory::OnePointDrag]);
        input.begin_frame(Duration::from_millis(16));
        input.process_touch_frame(&[TouchSample::pressed(0, Point::ORIGIN)]);
        input.begin_frame(Duration::from_millis(16));
        input.process_touch_frame(&[TouchSample::moved(0, Point::new(40.0, 0.0))]);

        let report = input.cancel_touches();
        assert_eq!(report.consumed_gestures, 1);
        assert_eq!(seen.borrow().len(), 2);
        assert!(!input.recognizer().is_tracking());
    }

    #[test]
    fn test_mouse_move_tracks_delta() {
        let mut input = InputContext::default();
        input.mouse_move(Point::new(10.0, 5.0));
        assert_eq!(input.mouse_position(), Point::new(10.0, 5.0));

        let seen = sink(&mut input, &[EventCategory::MouseMove, EventCategory::MouseWheel]);
        assert!(input.mouse_move(Point::new(12.0, 5.0)));
        assert!(input.mouse_wheel(1.0));
        assert!(!input.mouse_down(MouseButton::Left));
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn test_keyboard_routed() {
        let mut input = InputContext::default();
        assert!(!input.key(KeyEvent::pressed(Key::Escape)));
        let _seen = sink(&mut input, &[EventCategory::Keyboard]);
        assert!(input.key(KeyEvent::pressed(Key::Escape)));
    }

    #[test]
    fn test_gamepad_edges_dispatched() {
        let mut input = InputContext::default();
        let seen = sink(&mut input, &[EventCategory::Gamepad]);
        let player = PlayerIndex(0);

        assert_eq!(input.gamepad_buttons(player, &[GamepadButton::A]), 1);
        assert_eq!(input.gamepad_buttons(player, &[GamepadButton::A]), 0);
        assert_eq!(input.gamepad_mask(player, 0b11), 1);
        assert_eq!(input.gamepad_disconnect(player), 2);
        assert_eq!(seen.borrow().len(), 4);
        assert!(!input.gamepads().is_held(player, GamepadButton::A));
    }
}
