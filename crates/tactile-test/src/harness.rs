//! Test harness wrapping an [`InputContext`].

use crate::recorder::{DispatchLog, RecordingHandler};
use crate::script::GestureScript;
use std::time::Duration;
use tactile_core::{
    EventCategory, EventDispatcher, FrameReport, GestureEvent, HandlerRef, InputConfig,
    InputContext, Key, KeyEvent, MouseButton, Point, TouchSample, TouchTrace,
};

/// Drives an [`InputContext`] frame by frame and records deliveries.
pub struct InputHarness {
    input: InputContext,
    log: DispatchLog,
    frame: Duration,
}

impl Default for InputHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl InputHarness {
    /// Create a harness with default config and 16 ms frames.
    #[must_use]
    pub fn new() -> Self {
        Self {
            input: InputContext::default(),
            log: DispatchLog::new(),
            frame: Duration::from_millis(16),
        }
    }

    /// Create a harness with a custom config.
    pub fn with_config(config: InputConfig) -> tactile_core::Result<Self> {
        Ok(Self {
            input: InputContext::new(config)?,
            ..Self::new()
        })
    }

    /// The shared delivery log.
    #[must_use]
    pub const fn log(&self) -> &DispatchLog {
        &self.log
    }

    /// The wrapped context.
    #[must_use]
    pub const fn input(&self) -> &InputContext {
        &self.input
    }

    /// Mutable access to the wrapped context.
    pub fn input_mut(&mut self) -> &mut InputContext {
        &mut self.input
    }

    /// Mutable access to the dispatcher.
    pub fn dispatcher(&mut self) -> &mut EventDispatcher {
        self.input.dispatcher_mut()
    }

    /// A recording handler writing into this harness's log.
    #[must_use]
    pub fn handler(&self, name: &str) -> RecordingHandler {
        RecordingHandler::new(name, &self.log)
    }

    /// Register a handler for `categories` in the active scope.
    pub fn register(&mut self, handler: RecordingHandler, categories: &[EventCategory]) -> HandlerRef {
        handler.register(self.input.dispatcher_mut(), categories)
    }

    // === Frame Simulation ===

    /// Advance one frame and feed it `samples`.
    pub fn step(&mut self, samples: &[TouchSample]) -> FrameReport {
        self.input.begin_frame(self.frame);
        self.input.process_touch_frame(samples)
    }

    /// Advance `frames` empty frames.
    pub fn wait(&mut self, frames: usize) -> &mut Self {
        for _ in 0..frames {
            self.step(&[]);
        }
        self
    }

    /// Replay a trace and return every recognized gesture.
    pub fn replay(&mut self, trace: &TouchTrace) -> Vec<GestureEvent> {
        trace.gestures(&mut self.input)
    }

    /// Replay a script and return every recognized gesture.
    pub fn run(&mut self, script: GestureScript) -> Vec<GestureEvent> {
        self.replay(&script.build())
    }

    // === Pointer and Keyboard Simulation ===

    /// Move the cursor to `position`, press and release the left button.
    pub fn click(&mut self, position: Point) -> &mut Self {
        self.input.mouse_move(position);
        self.input.mouse_down(MouseButton::Left);
        self.input.mouse_up(MouseButton::Left);
        self
    }

    /// Press and release a key.
    pub fn press_key(&mut self, key: Key) -> &mut Self {
        self.input.key(KeyEvent::pressed(key));
        self.input.key(KeyEvent::released(key));
        self
    }

    // === Assertions ===

    /// Assert the exact sequence of handlers offered events so far.
    ///
    /// # Panics
    ///
    /// Panics if the sequence differs.
    pub fn assert_seen(&self, expected: &[&str]) -> &Self {
        let names = self.log.names();
        assert_eq!(names, expected, "unexpected delivery order");
        self
    }

    /// Assert that a handler was never offered anything.
    ///
    /// # Panics
    ///
    /// Panics if the handler appears in the log.
    pub fn assert_not_seen(&self, name: &str) -> &Self {
        let count = self.log.count_for(name);
        assert_eq!(count, 0, "handler '{name}' was offered {count} event(s)");
        self
    }
}
