//! Event notification: two independent publish/subscribe mechanisms.
//!
//! | Notifier | Keys | Dispatch | Used for |
//! |----------|------|----------|----------|
//! | [`ScopedNotifier`] | dotted paths (`"memory.switch.after"`) | ancestors first, then the exact path | semantic broadcasts |
//! | [`StackedNotifier`] | flat names (`"mousedown"`) | descending priority level | raw input that a layer may claim |
//!
//! Both return `true` from `fire` when every listener ran to completion and
//! `false` when a listener stopped the chain with [`Flow::Stop`]. For the
//! stacked notifier `false` means "claimed": lower levels must not react.
//!
//! Both take `&self` and keep their tables behind `RefCell`, so a listener may
//! subscribe, unsubscribe or fire while a dispatch is running. Dispatch works
//! on a snapshot of the listener list taken when `fire` starts.

pub mod scoped;
pub mod stacked;

pub use scoped::{Scope, ScopedNotifier};
pub use stacked::StackedNotifier;

use crate::geom::{Point, Rect, Vector};
use crate::id::Id;
use crate::input::{Button, Key, Modifiers};
use crate::memory::MemoryId;

/// What a listener wants the dispatcher to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep invoking the remaining listeners.
    Continue,
    /// Skip the remaining listeners of this dispatch.
    Stop,
}

impl From<bool> for Flow {
    fn from(keep_going: bool) -> Self {
        if keep_going { Self::Continue } else { Self::Stop }
    }
}

/// Handle returned by `on`, used to unsubscribe with `off`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub(crate) u64);

/// Payload of every semantic (scoped) event the engine fires.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    /// Button press or release. `pos` is logical, `screen` is pixels.
    Pointer { pos: Point, screen: Point, button: Button },
    /// View panned by `delta` pixels.
    Pan { delta: Vector },
    /// View scale changed around `anchor` (pixels).
    Zoom { anchor: Point, logic_width: f64, level: u32 },
    /// Rubber-band selection in logical space and the registered objects it touches.
    Frame { rect: Rect, hits: Vec<Id> },
    /// Registered objects dragged by `delta` logical units since the gesture began.
    Reloc { ids: Vec<Id>, delta: Vector },
    /// Keyboard key transition.
    Key { key: Key, modifiers: Modifiers },
    /// Active memory change; `from` is `None` when there was no previous memory.
    Memory { from: Option<MemoryId>, to: MemoryId },
    /// Layer lifecycle.
    Layer { name: String },
    /// Cache rebuilt with `layers` contributions drawn.
    Cache { layers: usize },
}
