//! Focus and hit-object slots.
//!
//! Focus persists across frames until changed or cleared; hit objects are
//! refreshed every frame by a hit tester outside the dispatcher. All slots are
//! weak, so a dropped handler reads back as empty.

use crate::event::EventCategory;
use crate::handler::{HandlerRef, HandlerWeak};
use std::rc::Rc;
use std::time::Duration;

/// Which focus slot a category consults first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FocusSlot {
    /// Mouse buttons, movement and wheel.
    Mouse,
    /// Keyboard.
    Keyboard,
    /// Raw touch samples.
    Touch,
    /// Focused widget of the focused dialog, offered gamepad input first.
    Gamepad,
}

impl FocusSlot {
    /// Every focus slot.
    pub const ALL: [Self; 4] = [Self::Mouse, Self::Keyboard, Self::Touch, Self::Gamepad];

    /// Focus slot used for a category; gestures have none.
    #[must_use]
    pub const fn for_category(category: EventCategory) -> Option<Self> {
        match category {
            EventCategory::Keyboard => Some(Self::Keyboard),
            EventCategory::Touch => Some(Self::Touch),
            EventCategory::Gamepad => Some(Self::Gamepad),
            c if c.is_mouse() => Some(Self::Mouse),
            _ => None,
        }
    }
}

/// Which hit slot a category consults after focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HitSlot {
    /// Object under the cursor.
    Mouse,
    /// Object under the touch contact.
    Touch,
}

impl HitSlot {
    /// Hit slot used for a category; keyboard, gamepad and gestures have none.
    #[must_use]
    pub const fn for_category(category: EventCategory) -> Option<Self> {
        match category {
            EventCategory::Touch => Some(Self::Touch),
            c if c.is_mouse() => Some(Self::Mouse),
            _ => None,
        }
    }
}

fn upgrade(slot: Option<&HandlerWeak>) -> Option<HandlerRef> {
    slot.and_then(std::rc::Weak::upgrade)
}

fn points_to(slot: Option<&HandlerWeak>, handler: &HandlerRef) -> bool {
    slot.is_some_and(|weak| weak.ptr_eq(&Rc::downgrade(handler)))
}

/// Focus and hit state owned by the dispatcher.
#[derive(Debug, Default)]
pub struct FocusState {
    mouse: Option<HandlerWeak>,
    keyboard: Option<HandlerWeak>,
    touch: Option<HandlerWeak>,
    touch_since: Option<Duration>,
    gamepad: Option<HandlerWeak>,
    mouse_hit: Option<HandlerWeak>,
    touch_hit: Option<HandlerWeak>,
}

impl FocusState {
    /// Create empty focus state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, slot: FocusSlot) -> Option<&HandlerWeak> {
        match slot {
            FocusSlot::Mouse => self.mouse.as_ref(),
            FocusSlot::Keyboard => self.keyboard.as_ref(),
            FocusSlot::Touch => self.touch.as_ref(),
            FocusSlot::Gamepad => self.gamepad.as_ref(),
        }
    }

    fn slot_mut(&mut self, slot: FocusSlot) -> &mut Option<HandlerWeak> {
        match slot {
            FocusSlot::Mouse => &mut self.mouse,
            FocusSlot::Keyboard => &mut self.keyboard,
            FocusSlot::Touch => &mut self.touch,
            FocusSlot::Gamepad => &mut self.gamepad,
        }
    }

    fn hit(&self, slot: HitSlot) -> Option<&HandlerWeak> {
        match slot {
            HitSlot::Mouse => self.mouse_hit.as_ref(),
            HitSlot::Touch => self.touch_hit.as_ref(),
        }
    }

    /// Live focus holder for a slot.
    #[must_use]
    pub fn focus(&self, slot: FocusSlot) -> Option<HandlerRef> {
        upgrade(self.slot(slot))
    }

    /// Give a handler focus. `now` is recorded for touch focus.
    pub fn set_focus(&mut self, slot: FocusSlot, handler: &HandlerRef, now: Duration) {
        *self.slot_mut(slot) = Some(Rc::downgrade(handler));
        if slot == FocusSlot::Touch {
            self.touch_since = Some(now);
        }
    }

    /// Clear a focus slot.
    pub fn clear_focus(&mut self, slot: FocusSlot) {
        *self.slot_mut(slot) = None;
        if slot == FocusSlot::Touch {
            self.touch_since = None;
        }
    }

    /// Check if `handler` holds the slot.
    #[must_use]
    pub fn has_focus(&self, slot: FocusSlot, handler: &HandlerRef) -> bool {
        points_to(self.slot(slot), handler)
    }

    /// When touch focus was acquired, if it is held.
    #[must_use]
    pub fn touch_focus_since(&self) -> Option<Duration> {
        self.focus(FocusSlot::Touch).and(self.touch_since)
    }

    /// Check if any focus slot is held by a live handler.
    #[must_use]
    pub fn any_focus(&self) -> bool {
        FocusSlot::ALL.iter().any(|&slot| self.focus(slot).is_some())
    }

    /// Clear every focus slot held by `handler`, returning the slots cleared.
    pub fn release(&mut self, handler: &HandlerRef) -> Vec<FocusSlot> {
        let held: Vec<FocusSlot> = FocusSlot::ALL
            .into_iter()
            .filter(|&slot| self.has_focus(slot, handler))
            .collect();
        for &slot in &held {
            self.clear_focus(slot);
        }
        held
    }

    /// Live hit object for a slot.
    #[must_use]
    pub fn hit_object(&self, slot: HitSlot) -> Option<HandlerRef> {
        upgrade(self.hit(slot))
    }

    /// Replace a hit object (`None` clears it).
    pub fn set_hit_object(&mut self, slot: HitSlot, handler: Option<&HandlerRef>) {
        let weak = handler.map(Rc::downgrade);
        match slot {
            HitSlot::Mouse => self.mouse_hit = weak,
            HitSlot::Touch => self.touch_hit = weak,
        }
    }

    /// Forget every slot.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
