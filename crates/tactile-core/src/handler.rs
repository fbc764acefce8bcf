//! The handler capability implemented by input consumers.
//!
//! Handlers are shared, single-threaded objects (`Rc<RefCell<dyn InputHandler>>`).
//! Registration lists hold strong references; focus and hit slots hold weak
//! ones, so a dropped handler simply disappears from focus.

use crate::dispatch::EventContext;
use crate::event::InputEvent;
use crate::geometry::Point;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Shared handler reference.
pub type HandlerRef = Rc<RefCell<dyn InputHandler>>;

/// Weak handler reference used by focus and hit slots.
pub type HandlerWeak = Weak<RefCell<dyn InputHandler>>;

/// Result of offering an event to a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Handled {
    /// Stop propagating the event.
    Consumed,
    /// Let the next handler see it.
    #[default]
    Ignored,
}

impl Handled {
    /// Check if the event was consumed.
    #[must_use]
    pub const fn is_consumed(self) -> bool {
        matches!(self, Self::Consumed)
    }
}

impl From<bool> for Handled {
    fn from(consumed: bool) -> Self {
        if consumed {
            Self::Consumed
        } else {
            Self::Ignored
        }
    }
}

/// An object that wants to receive input.
///
/// Only [`InputHandler::handle`] is required. A handler sees only the
/// categories it registered for, so a `match` over the handful of
/// [`InputEvent`] variants it cares about is enough.
pub trait InputHandler {
    /// React to an event.
    ///
    /// `ctx` gives access to the dispatcher (focus capture, registration,
    /// scopes) while the event is being delivered.
    fn handle(&mut self, event: &InputEvent, ctx: &mut EventContext<'_>) -> Handled;

    /// A modal handler ends dispatch at itself even when it ignores the event.
    fn is_modal(&self) -> bool {
        false
    }

    /// Inactive handlers are skipped for raw touch samples unless they hold
    /// focus or are the hit object.
    fn is_active(&self) -> bool {
        true
    }

    /// Spatial test used by [`crate::EventDispatcher::resolve_hit`].
    fn hit_test(&self, _position: Point) -> bool {
        false
    }

    /// Name shown in diagnostics.
    fn name(&self) -> &str {
        "handler"
    }
}

/// Wrap a handler for registration.
pub fn handler_ref<H: InputHandler + 'static>(handler: H) -> HandlerRef {
    Rc::new(RefCell::new(handler))
}

/// Identity comparison of two handler references.
#[must_use]
pub fn same_handler(a: &HandlerRef, b: &HandlerRef) -> bool {
    Rc::ptr_eq(a, b)
}
