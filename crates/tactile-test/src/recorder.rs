//! Handlers that record what they were offered.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;
use tactile_core::{
    handler_ref, EventCategory, EventContext, EventDispatcher, FocusSlot, Handled, HandlerRef,
    InputEvent, InputHandler, Point,
};

/// One delivery observed by a [`RecordingHandler`].
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    /// Name of the handler that was offered the event.
    pub handler: String,
    /// The event.
    pub event: InputEvent,
    /// What the handler answered.
    pub handled: Handled,
}

/// Delivery log shared by every handler of a test.
#[derive(Clone, Default)]
pub struct DispatchLog {
    entries: Rc<RefCell<Vec<LogEntry>>>,
}

impl fmt::Debug for DispatchLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl DispatchLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, entry: LogEntry) {
        self.entries.borrow_mut().push(entry);
    }

    /// Every delivery, oldest first.
    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.borrow().clone()
    }

    /// Handler names in delivery order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .map(|entry| entry.handler.clone())
            .collect()
    }

    /// Categories delivered to one handler, in order.
    #[must_use]
    pub fn categories_for(&self, handler: &str) -> Vec<EventCategory> {
        self.entries
            .borrow()
            .iter()
            .filter(|entry| entry.handler == handler)
            .map(|entry| entry.event.category())
            .collect()
    }

    /// Number of deliveries to one handler.
    #[must_use]
    pub fn count_for(&self, handler: &str) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|entry| entry.handler == handler)
            .count()
    }

    /// Total deliveries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Check if nothing was delivered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Forget every delivery.
    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

/// Configurable handler that logs every event it is offered.
pub struct RecordingHandler {
    name: String,
    log: DispatchLog,
    consumes: Option<HashSet<EventCategory>>,
    modal: bool,
    active: bool,
    bounds: Option<(Point, Point)>,
    capture: Vec<(EventCategory, FocusSlot)>,
    release: Vec<(EventCategory, FocusSlot)>,
}

impl RecordingHandler {
    /// Create a handler that ignores everything.
    pub fn new(name: impl Into<String>, log: &DispatchLog) -> Self {
        Self {
            name: name.into(),
            log: log.clone(),
            consumes: Some(HashSet::new()),
            modal: false,
            active: true,
            bounds: None,
            capture: Vec::new(),
            release: Vec::new(),
        }
    }

    /// Consume every event.
    pub fn consume_all(mut self) -> Self {
        self.consumes = None;
        self
    }

    /// Consume events of these categories.
    pub fn consume(mut self, categories: &[EventCategory]) -> Self {
        if let Some(set) = self.consumes.as_mut() {
            set.extend(categories.iter().copied());
        }
        self
    }

    /// Mark as modal.
    pub const fn modal(mut self) -> Self {
        self.modal = true;
        self
    }

    /// Mark as an inactive widget.
    pub const fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Accept hit tests inside an axis-aligned box.
    pub const fn bounds(mut self, min: Point, max: Point) -> Self {
        self.bounds = Some((min, max));
        self
    }

    /// Capture `slot` whenever an event of `category` arrives.
    pub fn capture_on(mut self, category: EventCategory, slot: FocusSlot) -> Self {
        self.capture.push((category, slot));
        self
    }

    /// Release `slot` whenever an event of `category` arrives.
    pub fn release_on(mut self, category: EventCategory, slot: FocusSlot) -> Self {
        self.release.push((category, slot));
        self
    }

    /// Wrap for registration.
    pub fn into_ref(self) -> HandlerRef {
        handler_ref(self)
    }

    /// Wrap and register for `categories`.
    pub fn register(self, dispatcher: &mut EventDispatcher, categories: &[EventCategory]) -> HandlerRef {
        let handler = self.into_ref();
        dispatcher.register_all(categories, &handler);
        handler
    }
}

impl InputHandler for RecordingHandler {
    fn handle(&mut self, event: &InputEvent, ctx: &mut EventContext<'_>) -> Handled {
        let category = event.category();
        for &(c, slot) in &self.capture {
            if c == category {
                ctx.capture(slot);
            }
        }
        for &(c, slot) in &self.release {
            if c == category {
                ctx.release(slot);
            }
        }
        let handled = Handled::from(
            self.consumes
                .as_ref()
                .map_or(true, |set| set.contains(&category)),
        );
        self.log.record(LogEntry {
            handler: self.name.clone(),
            event: event.clone(),
            handled,
        });
        handled
    }

    fn is_modal(&self) -> bool {
        self.modal
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn hit_test(&self, p: Point) -> bool {
        self.bounds
            .is_some_and(|(min, max)| p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tactile_core::{Key, KeyEvent};

    #[test]
    fn test_records_and_consumes_selected() {
        let log = DispatchLog::new();
        let mut dispatcher = EventDispatcher::default();
        let _h = RecordingHandler::new("keys", &log)
            .consume(&[EventCategory::Keyboard])
            .register(&mut dispatcher, &[EventCategory::Keyboard, EventCategory::MouseMove]);

        assert!(dispatcher.dispatch_key(KeyEvent::pressed(Key::A)));
        assert!(!dispatcher.dispatch(&InputEvent::MouseMove {
            position: Point::ORIGIN,
            delta: Point::ORIGIN,
        }));

        assert_eq!(log.names(), ["keys", "keys"]);
        assert_eq!(
            log.categories_for("keys"),
            [EventCategory::Keyboard, EventCategory::MouseMove]
        );
        let entries = log.entries();
        assert_eq!(entries[0].handled, Handled::Consumed);
        assert_eq!(entries[1].handled, Handled::Ignored);
    }

    #[test]
    fn test_capture_on_category() {
        let log = DispatchLog::new();
        let mut dispatcher = EventDispatcher::default();
        let h = RecordingHandler::new("grab", &log)
            .capture_on(EventCategory::MouseLeftDown, FocusSlot::Mouse)
            .release_on(EventCategory::MouseLeftUp, FocusSlot::Mouse)
            .register(
                &mut dispatcher,
                &[EventCategory::MouseLeftDown, EventCategory::MouseLeftUp],
            );

        dispatcher.dispatch_mouse_down(tactile_core::MouseButton::Left, Point::ORIGIN);
        assert!(dispatcher.has_focus(FocusSlot::Mouse, &h));
        dispatcher.dispatch_mouse_up(tactile_core::MouseButton::Left, Point::ORIGIN);
        assert!(dispatcher.focus(FocusSlot::Mouse).is_none());
    }

    #[test]
    fn test_hit_bounds() {
        let log = DispatchLog::new();
        let h = RecordingHandler::new("box", &log).bounds(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        assert!(h.hit_test(Point::new(5.0, 5.0)));
        assert!(!h.hit_test(Point::new(11.0, 5.0)));
        assert_eq!(h.name(), "box");
    }

    #[test]
    fn test_log_clear() {
        let log = DispatchLog::new();
        let mut dispatcher = EventDispatcher::default();
        let _h = RecordingHandler::new("a", &log)
            .consume_all()
            .register(&mut dispatcher, &[EventCategory::Keyboard]);
        dispatcher.dispatch_key(KeyEvent::pressed(Key::B));
        assert_eq!(log.count_for("a"), 1);
        log.clear();
        assert!(log.is_empty());
    }
}
