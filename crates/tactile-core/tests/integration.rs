//! Integration tests for tactile-core.
//!
//! These drive the public API end to end: touch frames through the recognizer
//! and dispatcher, focus arbitration, and modal scopes.

use tactile_core::{
    EventCategory, FocusSlot, GestureConfig, GestureEvent, HitSlot, InputConfig, InputError,
    InputEvent, Key, KeyEvent, MouseButton, Point, TouchSample,
};
use tactile_test::{GestureScript, InputHarness};

fn labels(gestures: &[GestureEvent]) -> Vec<&'static str> {
    gestures.iter().map(GestureEvent::label).collect()
}

// =============================================================================
// Tap, hold and double tap timing
// =============================================================================

#[test]
fn test_release_at_250ms_is_tap() {
    let mut h = InputHarness::new();
    let gestures = h.run(
        GestureScript::with_frame_ms(50)
            .press(0, 40.0, 40.0)
            .idle(4)
            .release(0, 40.0, 40.0),
    );
    assert_eq!(labels(&gestures), ["tap"]);
}

#[test]
fn test_release_at_500ms_is_hold() {
    let mut h = InputHarness::new();
    let gestures = h.run(
        GestureScript::with_frame_ms(50)
            .press(0, 40.0, 40.0)
            .idle(9)
            .release(0, 40.0, 40.0),
    );
    match gestures.as_slice() {
        [GestureEvent::Hold(hold)] => assert_eq!(hold.duration.as_millis(), 500),
        other => panic!("expected a hold, got {other:?}"),
    }
}

#[test]
fn test_tap_threshold_is_configurable() {
    let config = InputConfig {
        gesture: GestureConfig {
            tap_time_ms: 100,
            ..GestureConfig::default()
        },
        ..InputConfig::default()
    };
    let mut h = InputHarness::with_config(config).expect("valid config");
    let gestures = h.run(
        GestureScript::with_frame_ms(50)
            .press(0, 0.0, 0.0)
            .idle(4)
            .release(0, 0.0, 0.0),
    );
    assert_eq!(labels(&gestures), ["hold"]);
}

#[test]
fn test_second_tap_within_window_is_double() {
    // First tap ends at 1.00 s, the next press lands at 1.20 s.
    let mut h = InputHarness::new();
    let gestures = h.run(
        GestureScript::with_frame_ms(50)
            .after_ms(950)
            .press(0, 10.0, 10.0)
            .frame()
            .release(0, 10.0, 10.0)
            .idle(2)
            .after_ms(100)
            .press(0, 10.0, 10.0)
            .frame()
            .release(0, 10.0, 10.0),
    );
    assert_eq!(labels(&gestures), ["tap", "double_tap"]);
}

#[test]
fn test_second_tap_after_window_is_plain() {
    // First tap ends at 1.00 s, the next press lands at 1.50 s.
    let mut h = InputHarness::new();
    let gestures = h.run(
        GestureScript::with_frame_ms(50)
            .after_ms(950)
            .press(0, 10.0, 10.0)
            .frame()
            .release(0, 10.0, 10.0)
            .idle(2)
            .after_ms(400)
            .press(0, 10.0, 10.0)
            .frame()
            .release(0, 10.0, 10.0),
    );
    assert_eq!(labels(&gestures), ["tap", "tap"]);
}

// =============================================================================
// Drags
// =============================================================================

#[test]
fn test_two_point_drag_single_update_per_frame() {
    let mut h = InputHarness::new();
    let gestures = h.run(
        GestureScript::new()
            .press(0, 100.0, 100.0)
            .frame()
            .press(1, 200.0, 100.0)
            .frame()
            .move_to(0, 90.0, 100.0)
            .move_to(1, 210.0, 100.0)
            .frame()
            .move_to(0, 80.0, 100.0)
            .move_to(1, 220.0, 100.0)
            .frame()
            .move_to(1, 230.0, 100.0)
            .move_to(0, 70.0, 100.0)
            .frame()
            .release(0, 70.0, 100.0)
            .release(1, 230.0, 100.0),
    );
    assert_eq!(
        labels(&gestures),
        [
            "two_point_drag_begin",
            "two_point_drag_update",
            "two_point_drag_update",
            "two_point_drag_end",
        ]
    );
    match gestures[2] {
        GestureEvent::TwoPointDrag(drag) => {
            assert_eq!(drag.distance, 160.0);
            assert_eq!(drag.delta_distance, 20.0);
            assert_eq!(drag.start_distance, 100.0);
        }
        other => panic!("unexpected gesture {other:?}"),
    }
}

#[test]
fn test_gestures_reach_handlers_after_raw_samples() {
    let mut h = InputHarness::new();
    let raw = h.handler("raw");
    h.register(raw, &[EventCategory::Touch]);
    let drags = h.handler("drags").consume_all();
    h.register(drags, &[EventCategory::OnePointDrag]);

    h.run(GestureScript::new().drag(0, Point::new(0.0, 0.0), Point::new(90.0, 0.0), 3));

    // Every move passes the drag threshold: begin, two updates, end.
    assert_eq!(h.log().count_for("raw"), 5);
    assert_eq!(h.log().count_for("drags"), 4);
    h.assert_seen(&[
        "raw", "raw", "drags", "raw", "drags", "raw", "drags", "raw", "drags",
    ]);
}

// =============================================================================
// Focus precedence
// =============================================================================

#[test]
fn test_focus_then_hit_then_list() {
    let mut h = InputHarness::new();
    let tail = h.handler("tail").consume_all();
    h.register(tail, &[EventCategory::MouseLeftUp]);
    let hit = h.handler("hit").consume_all();
    let hit = h.register(hit, &[EventCategory::MouseLeftUp]);
    let focus = h.handler("focus");
    let focus = h.register(focus, &[EventCategory::MouseLeftUp]);

    h.dispatcher().set_focus(FocusSlot::Mouse, &focus);
    h.dispatcher().set_hit_object(HitSlot::Mouse, Some(&hit));

    assert!(h.input_mut().mouse_up(MouseButton::Left));
    h.assert_seen(&["focus", "hit"]).assert_not_seen("tail");
}

#[test]
fn test_click_establishes_new_focus() {
    let mut h = InputHarness::new();
    let stale = h.handler("stale").consume_all();
    let stale = h.register(stale, &[EventCategory::MouseLeftDown]);
    let target = h
        .handler("target")
        .consume_all()
        .capture_on(EventCategory::MouseLeftDown, FocusSlot::Mouse);
    let target = h.register(target, &[EventCategory::MouseLeftDown]);

    h.dispatcher().set_focus(FocusSlot::Mouse, &stale);
    h.dispatcher().set_hit_object(HitSlot::Mouse, Some(&target));
    h.click(Point::new(5.0, 5.0));

    h.assert_seen(&["target"]);
    assert!(h.input().dispatcher().has_focus(FocusSlot::Mouse, &target));
}

#[test]
fn test_dialog_manager_sees_unhandled_keys_last() {
    let mut h = InputHarness::new();
    let label = h.handler("label");
    h.register(label, &[EventCategory::Keyboard]);
    // Registered last, the manager would otherwise be asked first.
    let manager = h.handler("dialogs").consume_all();
    let manager = h.register(manager, &[EventCategory::Keyboard]);
    h.dispatcher().set_keyboard_fallback(Some(&manager));

    h.press_key(Key::Tab);
    h.assert_seen(&["label", "dialogs", "label", "dialogs"]);
}

// =============================================================================
// Scopes
// =============================================================================

#[test]
fn test_modal_scope_isolates_lower_handlers() {
    let mut h = InputHarness::new();
    let game = h.handler("game").consume_all();
    let game = h.register(
        game,
        &[
            EventCategory::Tap,
            EventCategory::Keyboard,
            EventCategory::MouseLeftDown,
        ],
    );
    h.dispatcher().set_focus(FocusSlot::Keyboard, &game);
    h.dispatcher().set_hit_object(HitSlot::Mouse, Some(&game));

    h.dispatcher().push_scope().expect("room for a modal");
    let modal = h.handler("modal").modal();
    let modal = h.register(
        modal,
        &[
            EventCategory::Tap,
            EventCategory::Keyboard,
            EventCategory::MouseLeftDown,
        ],
    );

    h.run(GestureScript::new().tap(0, 5.0, 5.0));
    h.press_key(Key::Escape);
    h.click(Point::new(5.0, 5.0));
    h.assert_not_seen("game");
    assert_eq!(h.log().count_for("modal"), 4);

    h.dispatcher().unregister_all(&modal);
    assert!(h.dispatcher().pop_scope().is_ok());
    assert_eq!(h.input().dispatcher().scope_depth(), 1);

    h.press_key(Key::Escape);
    assert_eq!(h.log().count_for("game"), 2);
}

#[test]
fn test_leaked_scope_is_reported_and_popped() {
    let mut h = InputHarness::new();
    h.dispatcher().push_scope().expect("room");
    let forgetful = h.handler("forgetful");
    h.register(forgetful, &[EventCategory::Hold, EventCategory::Tap]);

    match h.dispatcher().pop_scope() {
        Err(InputError::ScopeLeak {
            depth,
            registrations,
            ..
        }) => {
            assert_eq!(depth, 2);
            assert_eq!(registrations, 2);
        }
        other => panic!("expected a leak, got {other:?}"),
    }
    assert_eq!(h.input().dispatcher().scope_depth(), 1);
    assert!(h.dispatcher().verify_empty().is_ok());
}

#[test]
fn test_scene_switch_validation() {
    let mut h = InputHarness::new();
    let hud = h.handler("hud");
    let hud = h.register(hud, &[EventCategory::Tap]);
    assert!(matches!(
        h.dispatcher().verify_empty(),
        Err(InputError::ScopeLeak { depth: 1, .. })
    ));
    h.dispatcher().unregister_all(&hud);
    assert!(h.dispatcher().verify_empty().is_ok());
}

#[test]
fn test_handler_opens_modal_mid_dispatch() {
    use std::cell::RefCell;
    use std::rc::Rc;
    use tactile_core::{handler_ref, EventContext, Handled, InputHandler};

    struct Opener {
        opened: Rc<RefCell<bool>>,
    }

    impl InputHandler for Opener {
        fn handle(&mut self, _event: &InputEvent, ctx: &mut EventContext<'_>) -> Handled {
            if ctx.dispatcher().push_scope().is_ok() {
                *self.opened.borrow_mut() = true;
            }
            Handled::Ignored
        }
    }

    let mut h = InputHarness::new();
    let below = h.handler("below");
    h.register(below, &[EventCategory::Keyboard]);
    let opened = Rc::new(RefCell::new(false));
    let opener = handler_ref(Opener {
        opened: Rc::clone(&opened),
    });
    h.dispatcher().register(EventCategory::Keyboard, &opener);

    assert!(!h.input_mut().key(KeyEvent::pressed(Key::Enter)));
    assert!(*opened.borrow());
    // The new scope took effect before "below" was reached.
    h.assert_not_seen("below");
    assert_eq!(h.input().dispatcher().scope_depth(), 2);
}

#[test]
fn test_touch_cancel_ends_drag_for_handlers() {
    let mut h = InputHarness::new();
    let drags = h.handler("drags").consume_all();
    h.register(drags, &[EventCategory::TwoPointDrag]);
    h.step(&[TouchSample::pressed(0, Point::new(0.0, 0.0))]);
    h.step(&[TouchSample::pressed(1, Point::new(100.0, 0.0))]);
    h.step(&[TouchSample::moved(1, Point::new(120.0, 0.0))]);

    let report = h.input_mut().cancel_touches();
    assert_eq!(labels(&report.gestures), ["two_point_drag_end"]);
    assert_eq!(h.log().count_for("drags"), 2);
}
