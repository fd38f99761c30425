use super::*;

// =============================================================
// Modifiers
// =============================================================

#[test]
fn modifiers_default_all_false() {
    let m = Modifiers::default();
    assert!(!m.shift);
    assert!(!m.ctrl);
    assert!(!m.alt);
    assert!(!m.meta);
}

// =============================================================
// Key
// =============================================================

#[test]
fn space_recognised_in_both_spellings() {
    assert!(Key::new(" ").is_space());
    assert!(Key::new("Space").is_space());
    assert!(!Key::new("s").is_space());
}

#[test]
fn escape_recognised() {
    assert!(Key::new("Escape").is_escape());
    assert!(Key::new("Esc").is_escape());
    assert!(!Key::new("Enter").is_escape());
}

// =============================================================
// InputEvent
// =============================================================

#[test]
fn event_names_match_stacked_vocabulary() {
    let m = Modifiers::default();
    let p = Point::new(1.0, 2.0);
    let cases = [
        (InputEvent::PointerDown { screen: p, button: Button::Primary, modifiers: m }, "mousedown"),
        (InputEvent::PointerMove { screen: p, modifiers: m }, "mousemove"),
        (InputEvent::PointerUp { screen: p, button: Button::Primary, modifiers: m }, "mouseup"),
        (InputEvent::Wheel { screen: p, delta: WheelDelta { dx: 0.0, dy: 1.0 }, modifiers: m }, "wheel"),
        (InputEvent::KeyDown { key: Key::new("a"), modifiers: m }, "keydown"),
        (InputEvent::KeyUp { key: Key::new("a"), modifiers: m }, "keyup"),
    ];
    for (event, name) in cases {
        assert_eq!(event.name(), name);
    }
}

#[test]
fn screen_only_for_pointer_events() {
    let m = Modifiers::default();
    let p = Point::new(3.0, 4.0);
    assert_eq!(InputEvent::PointerMove { screen: p, modifiers: m }.screen(), Some(p));
    assert_eq!(InputEvent::KeyDown { key: Key::new("a"), modifiers: m }.screen(), None);
}
