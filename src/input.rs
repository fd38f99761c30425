//! Raw device input vocabulary: buttons, modifier keys, keys, wheel deltas.
//!
//! These are the values the host forwards from DOM (or native) events. The
//! [`crate::event`] module turns them into semantic signals.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::geom::Point;

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// A keyboard key as reported by the browser (e.g. `"Delete"`, `"Escape"`, `" "`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(name.to_owned())
    }

    /// Space bar; browsers report it as `" "`, some hosts as `"Space"`.
    #[must_use]
    pub fn is_space(&self) -> bool {
        self.0 == " " || self.0 == "Space"
    }

    #[must_use]
    pub fn is_escape(&self) -> bool {
        self.0 == "Escape" || self.0 == "Esc"
    }
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// One raw device event, positions in stage pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown { screen: Point, button: Button, modifiers: Modifiers },
    PointerMove { screen: Point, modifiers: Modifiers },
    PointerUp { screen: Point, button: Button, modifiers: Modifiers },
    Wheel { screen: Point, delta: WheelDelta, modifiers: Modifiers },
    KeyDown { key: Key, modifiers: Modifiers },
    KeyUp { key: Key, modifiers: Modifiers },
}

impl InputEvent {
    /// Stacked-notifier name for this event.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::PointerDown { .. } => "mousedown",
            Self::PointerMove { .. } => "mousemove",
            Self::PointerUp { .. } => "mouseup",
            Self::Wheel { .. } => "wheel",
            Self::KeyDown { .. } => "keydown",
            Self::KeyUp { .. } => "keyup",
        }
    }

    /// Pointer position for pointer and wheel events.
    #[must_use]
    pub fn screen(&self) -> Option<Point> {
        match self {
            Self::PointerDown { screen, .. }
            | Self::PointerMove { screen, .. }
            | Self::PointerUp { screen, .. }
            | Self::Wheel { screen, .. } => Some(*screen),
            Self::KeyDown { .. } | Self::KeyUp { .. } => None,
        }
    }
}
