//! Focus-aware event dispatch.
//!
//! The dispatcher owns the scope stack and focus state. An event is offered,
//! in order, to the focus holder for its category, then the hit object, then
//! the registration list of the active scope (most recently registered first).
//! Delivery stops at the first handler that consumes the event or is modal.
//!
//! Handlers receive an [`EventContext`] while they run, through which they can
//! capture focus for themselves, register or unregister handlers, push and pop
//! scopes, and even dispatch nested events. Lists are snapshotted before
//! delivery, so any of those mutations are safe mid-dispatch.

use crate::config::DispatchConfig;
use crate::error::Result;
use crate::event::{EventCategory, InputEvent, KeyEvent, MouseButton, TouchSample};
use crate::focus::{FocusSlot, FocusState, HitSlot};
use crate::geometry::Point;
use crate::gesture::GestureEvent;
use crate::handler::{same_handler, HandlerRef, HandlerWeak};
use crate::scope::{HandlerLists, ScopeId, ScopeStack};
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

/// Routes input events to registered handlers.
pub struct EventDispatcher {
    config: DispatchConfig,
    scopes: ScopeStack,
    focus: FocusState,
    keyboard_fallback: Option<HandlerWeak>,
    frame_time: Duration,
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new(DispatchConfig::default())
    }
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("config", &self.config)
            .field("scopes", &self.scopes)
            .field("frame_time", &self.frame_time)
            .finish_non_exhaustive()
    }
}

impl EventDispatcher {
    /// Create a dispatcher with only the base scope.
    #[must_use]
    pub fn new(config: DispatchConfig) -> Self {
        Self {
            scopes: ScopeStack::new(config.max_scope_depth),
            config,
            focus: FocusState::new(),
            keyboard_fallback: None,
            frame_time: Duration::ZERO,
        }
    }

    /// Dispatch limits in use.
    #[must_use]
    pub const fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Set the current frame time, used to timestamp touch focus.
    pub fn set_frame_time(&mut self, now: Duration) {
        self.frame_time = now;
    }

    /// Current frame time.
    #[must_use]
    pub const fn frame_time(&self) -> Duration {
        self.frame_time
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register a handler for a category in the active scope.
    ///
    /// The handler is asked before everything registered earlier. Registering
    /// twice is a no-op; returns false in that case.
    pub fn register(&mut self, category: EventCategory, handler: &HandlerRef) -> bool {
        let inserted = self.scopes.active_mut().insert_front(category, handler);
        if inserted {
            tracing::trace!(
                category = %category,
                handler = handler_name(handler),
                scope = self.scopes.depth(),
                "registered handler"
            );
        }
        inserted
    }

    /// Register a handler for several categories.
    pub fn register_all(&mut self, categories: &[EventCategory], handler: &HandlerRef) {
        for &category in categories {
            self.register(category, handler);
        }
    }

    /// Remove a handler from one category in every scope.
    ///
    /// Every focus slot the handler holds is released.
    pub fn unregister(&mut self, category: EventCategory, handler: &HandlerRef) -> bool {
        let removed = self.scopes.remove_everywhere(category, handler);
        let released = self.focus.release(handler);
        if category == EventCategory::Keyboard && self.is_keyboard_fallback(handler) {
            self.keyboard_fallback = None;
        }
        if !released.is_empty() {
            tracing::debug!(
                handler = handler_name(handler),
                ?released,
                "focus released on unregister"
            );
        }
        removed
    }

    /// Remove a handler from every category of every scope and drop all
    /// focus, hit and fallback slots it holds.
    pub fn unregister_all(&mut self, handler: &HandlerRef) -> usize {
        let removed = self.scopes.remove_all_everywhere(handler);
        let released = self.focus.release(handler);
        for slot in [HitSlot::Mouse, HitSlot::Touch] {
            if self
                .focus
                .hit_object(slot)
                .is_some_and(|hit| same_handler(&hit, handler))
            {
                self.focus.set_hit_object(slot, None);
            }
        }
        if self.is_keyboard_fallback(handler) {
            self.keyboard_fallback = None;
        }
        tracing::trace!(
            handler = handler_name(handler),
            removed,
            ?released,
            "unregistered handler"
        );
        removed
    }

    /// Check if a handler is registered for a category in the active scope.
    #[must_use]
    pub fn is_registered(&self, category: EventCategory, handler: &HandlerRef) -> bool {
        self.scopes.active().contains(category, handler)
    }

    /// Check if a handler may be offered an event of `category`.
    ///
    /// The gamepad focus holder qualifies through any registration in the
    /// active scope; everything else needs a registration for the category.
    fn is_eligible(&self, category: EventCategory, handler: &HandlerRef) -> bool {
        if category == EventCategory::Gamepad && self.focus.has_focus(FocusSlot::Gamepad, handler)
        {
            return self.scopes.active().contains_any(handler);
        }
        self.is_registered(category, handler)
    }

    /// Registrations of the active scope.
    #[must_use]
    pub fn active_scope(&self) -> &HandlerLists {
        self.scopes.active()
    }

    // =========================================================================
    // Scopes
    // =========================================================================

    /// Push an empty scope; only it receives registrations and dispatch.
    pub fn push_scope(&mut self) -> Result<ScopeId> {
        self.scopes.push()
    }

    /// Pop the active scope. See [`ScopeStack::pop`].
    pub fn pop_scope(&mut self) -> Result<()> {
        self.scopes.pop()
    }

    /// Check that nothing is registered in any scope.
    pub fn verify_empty(&self) -> Result<()> {
        self.scopes.verify_empty()
    }

    /// Number of scopes, including the base scope.
    #[must_use]
    pub fn scope_depth(&self) -> usize {
        self.scopes.depth()
    }

    // =========================================================================
    // Focus
    // =========================================================================

    /// Give a handler focus for a slot.
    pub fn set_focus(&mut self, slot: FocusSlot, handler: &HandlerRef) {
        tracing::debug!(?slot, handler = handler_name(handler), "focus set");
        self.focus.set_focus(slot, handler, self.frame_time);
    }

    /// Clear a focus slot.
    pub fn clear_focus(&mut self, slot: FocusSlot) {
        if self.focus.focus(slot).is_some() {
            tracing::debug!(?slot, "focus cleared");
        }
        self.focus.clear_focus(slot);
    }

    /// Current holder of a focus slot.
    #[must_use]
    pub fn focus(&self, slot: FocusSlot) -> Option<HandlerRef> {
        self.focus.focus(slot)
    }

    /// Check if `handler` holds a focus slot.
    #[must_use]
    pub fn has_focus(&self, slot: FocusSlot, handler: &HandlerRef) -> bool {
        self.focus.has_focus(slot, handler)
    }

    /// Check if any focus slot is held by a live handler.
    #[must_use]
    pub fn any_focus(&self) -> bool {
        self.focus.any_focus()
    }

    /// Frame time at which touch focus was acquired.
    #[must_use]
    pub fn touch_focus_since(&self) -> Option<Duration> {
        self.focus.touch_focus_since()
    }

    /// Set or clear a hit object.
    pub fn set_hit_object(&mut self, slot: HitSlot, handler: Option<&HandlerRef>) {
        self.focus.set_hit_object(slot, handler);
    }

    /// Current hit object for a slot.
    #[must_use]
    pub fn hit_object(&self, slot: HitSlot) -> Option<HandlerRef> {
        self.focus.hit_object(slot)
    }

    /// Handler offered keyboard input after every other registered handler.
    ///
    /// Only effective while it is registered for [`EventCategory::Keyboard`]
    /// in the active scope.
    pub fn set_keyboard_fallback(&mut self, handler: Option<&HandlerRef>) {
        self.keyboard_fallback = handler.map(Rc::downgrade);
    }

    /// Current keyboard fallback.
    #[must_use]
    pub fn keyboard_fallback(&self) -> Option<HandlerRef> {
        self.keyboard_fallback.as_ref().and_then(Weak::upgrade)
    }

    fn is_keyboard_fallback(&self, handler: &HandlerRef) -> bool {
        self.keyboard_fallback
            .as_ref()
            .is_some_and(|weak| weak.ptr_eq(&Rc::downgrade(handler)))
    }

    /// Forget all focus, hit and fallback slots.
    pub fn reset_focus(&mut self) {
        self.focus.clear();
        self.keyboard_fallback = None;
    }

    // =========================================================================
    // Hit testing
    // =========================================================================

    /// First handler registered for `category` in the active scope whose
    /// [`hit_test`](crate::InputHandler::hit_test) accepts `position`.
    #[must_use]
    pub fn resolve_hit(&self, category: EventCategory, position: Point) -> Option<HandlerRef> {
        self.scopes
            .active()
            .list(category)
            .iter()
            .find(|handler| {
                handler
                    .try_borrow()
                    .is_ok_and(|h| h.hit_test(position))
            })
            .cloned()
    }

    /// Resolve the mouse hit object from any mouse category and store it.
    pub fn refresh_mouse_hit(&mut self, position: Point) -> Option<HandlerRef> {
        let hit = EventCategory::MOUSE
            .iter()
            .find_map(|&category| self.resolve_hit(category, position));
        self.focus.set_hit_object(HitSlot::Mouse, hit.as_ref());
        hit
    }

    /// Resolve the touch hit object and store it.
    pub fn refresh_touch_hit(&mut self, position: Point) -> Option<HandlerRef> {
        let hit = self.resolve_hit(EventCategory::Touch, position);
        self.focus.set_hit_object(HitSlot::Touch, hit.as_ref());
        hit
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Deliver an event. Returns true if a handler consumed it.
    pub fn dispatch(&mut self, event: &InputEvent) -> bool {
        let category = event.category();
        if category == EventCategory::MouseLeftDown {
            self.clear_focus(FocusSlot::Mouse);
        }

        let candidates = self.candidates(event, category);
        for handler in &candidates {
            // Earlier handlers may have unregistered this one or pushed a scope.
            if !self.is_eligible(category, handler) {
                continue;
            }
            match self.offer(handler, event) {
                Some(Delivery::Consumed) => {
                    tracing::trace!(
                        category = %category,
                        handler = handler_name(handler),
                        "event consumed"
                    );
                    return true;
                }
                Some(Delivery::Modal) => {
                    tracing::trace!(
                        category = %category,
                        handler = handler_name(handler),
                        "dispatch stopped at modal handler"
                    );
                    return false;
                }
                Some(Delivery::Ignored) | None => {}
            }
        }
        false
    }

    /// Deliver a mouse button press.
    pub fn dispatch_mouse_down(&mut self, button: MouseButton, position: Point) -> bool {
        self.dispatch(&InputEvent::MouseDown { button, position })
    }

    /// Deliver a mouse button release.
    pub fn dispatch_mouse_up(&mut self, button: MouseButton, position: Point) -> bool {
        self.dispatch(&InputEvent::MouseUp { button, position })
    }

    /// Deliver a keyboard transition.
    pub fn dispatch_key(&mut self, key: KeyEvent) -> bool {
        self.dispatch(&InputEvent::Key(key))
    }

    /// Deliver a raw touch sample.
    pub fn dispatch_touch(&mut self, sample: &TouchSample) -> bool {
        self.dispatch(&InputEvent::Touch(sample.clone()))
    }

    /// Deliver a recognized gesture.
    pub fn dispatch_gesture(&mut self, gesture: GestureEvent) -> bool {
        self.dispatch(&InputEvent::from(gesture))
    }

    /// Handlers to offer `event` to, in precedence order.
    fn candidates(&self, event: &InputEvent, category: EventCategory) -> Vec<HandlerRef> {
        let mut out: Vec<HandlerRef> = Vec::new();
        let registered = |h: &HandlerRef| self.is_eligible(category, h);

        if !category.is_gesture() {
            if let Some(focus) = FocusSlot::for_category(category)
                .and_then(|slot| self.focus.focus(slot))
                .filter(registered)
            {
                out.push(focus);
            }
            if let Some(hit) = self.hit_for(event).filter(registered) {
                if !out.iter().any(|h| same_handler(h, &hit)) {
                    out.push(hit);
                }
            }
        }

        let fallback = if category == EventCategory::Keyboard {
            self.keyboard_fallback().filter(registered)
        } else {
            None
        };

        for handler in self.scopes.active().list(category) {
            if out.iter().any(|h| same_handler(h, handler)) {
                continue;
            }
            if fallback.as_ref().is_some_and(|fb| same_handler(fb, handler)) {
                continue;
            }
            if category == EventCategory::Touch && !is_active(handler) {
                continue;
            }
            out.push(HandlerRef::clone(handler));
        }

        if let Some(fallback) = fallback {
            if !out.iter().any(|h| same_handler(h, &fallback)) {
                out.push(fallback);
            }
        }
        out
    }

    fn hit_for(&self, event: &InputEvent) -> Option<HandlerRef> {
        if let InputEvent::Touch(sample) = event {
            if let Some(hit) = sample.hit_object.as_ref().and_then(Weak::upgrade) {
                return Some(hit);
            }
        }
        HitSlot::for_category(event.category()).and_then(|slot| self.focus.hit_object(slot))
    }

    fn offer(&mut self, handler: &HandlerRef, event: &InputEvent) -> Option<Delivery> {
        let Ok(mut target) = handler.try_borrow_mut() else {
            tracing::warn!(
                category = %event.category(),
                "handler is already handling an event; nested delivery skipped"
            );
            return None;
        };
        let mut ctx = EventContext {
            dispatcher: self,
            current: handler,
        };
        let handled = target.handle(event, &mut ctx);
        Some(if handled.is_consumed() {
            Delivery::Consumed
        } else if target.is_modal() {
            Delivery::Modal
        } else {
            Delivery::Ignored
        })
    }
}

enum Delivery {
    Consumed,
    Modal,
    Ignored,
}

fn is_active(handler: &HandlerRef) -> bool {
    handler.try_borrow().is_ok_and(|h| h.is_active())
}

fn handler_name(handler: &HandlerRef) -> String {
    handler
        .try_borrow()
        .map_or_else(|_| "<busy>".to_string(), |h| h.name().to_string())
}

/// Access to the dispatcher for the handler currently being called.
pub struct EventContext<'a> {
    dispatcher: &'a mut EventDispatcher,
    current: &'a HandlerRef,
}

impl EventContext<'_> {
    /// Shared reference to the handler being called.
    #[must_use]
    pub fn this(&self) -> HandlerRef {
        HandlerRef::clone(self.current)
    }

    /// Take a focus slot for the current handler.
    pub fn capture(&mut self, slot: FocusSlot) {
        let current = self.this();
        self.dispatcher.set_focus(slot, &current);
    }

    /// Give up a focus slot if the current handler holds it.
    pub fn release(&mut self, slot: FocusSlot) {
        if self.has_focus(slot) {
            self.dispatcher.clear_focus(slot);
        }
    }

    /// Check if the current handler holds a focus slot.
    #[must_use]
    pub fn has_focus(&self, slot: FocusSlot) -> bool {
        self.dispatcher.has_focus(slot, self.current)
    }

    /// Frame time of the event being delivered.
    #[must_use]
    pub fn frame_time(&self) -> Duration {
        self.dispatcher.frame_time()
    }

    /// The dispatcher, for registration, scopes or nested dispatch.
    pub fn dispatcher(&mut self) -> &mut EventDispatcher {
        self.dispatcher
    }
}
