//! Gesture recognition on top of raw device events.
//!
//! Every event is first offered to the stacked input listeners through
//! [`EngineCore::emit`]; a claimed event stops here. The rest drive one
//! gesture at a time:
//!
//! | Start | Gesture | Signals |
//! |-------|---------|---------|
//! | primary down on empty space | frame | `frame.begin` `frame.ing` `frame.end` / `frame.cancel` |
//! | primary down on an object, then move past the drag threshold | reloc | `reloc.begin` `reloc.ing` `reloc.end` / `reloc.cancel` |
//! | middle down, or primary down with Space held | pan | `pan.begin` `pan.ing` `pan.end` |
//! | wheel | zoom | `zoom.begin` `zoom.ing` `zoom.end` (debounced) |
//!
//! Primary and secondary presses also fire `leftdown`/`leftup` and
//! `rightdown`/`rightup` with a [`Signal::Pointer`] payload. Keys fire
//! `key.down`/`key.up`; Escape cancels the running gesture.
//!
//! While framing or relocating, a pointer inside the edge margin slides the
//! view by one step per frame until it leaves the margin or the gesture ends.

#[cfg(test)]
#[path = "event_test.rs"]
mod event_test;

use tracing::{debug, trace};

use crate::cursor::CursorToken;
use crate::engine::{EngineCore, EngineTimer};
use crate::geom::{Point, Rect, Vector};
use crate::id::Id;
use crate::input::{Button, InputEvent, Key, Modifiers, WheelDelta};
use crate::notify::Signal;

/// Public view of the gesture in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Idle,
    Pressed,
    Panning,
    Framing,
    Relocating,
}

#[derive(Debug, Clone, PartialEq)]
enum Gesture {
    Idle,
    /// Primary button down on `id`, not yet past the drag threshold.
    Pressed { id: Id, screen: Point, origin: Point },
    Panning { last: Point, button: Button },
    /// `origin` is logical.
    Framing { origin: Point },
    Relocating { ids: Vec<Id>, origin: Point },
}

#[derive(Debug)]
pub struct EventHandler {
    gesture: Gesture,
    space_held: bool,
    zooming: bool,
    last_screen: Option<Point>,
    cursor: Option<CursorToken>,
}

impl Default for EventHandler {
    fn default() -> Self {
        Self { gesture: Gesture::Idle, space_held: false, zooming: false, last_screen: None, cursor: None }
    }
}

impl EventHandler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn gesture(&self) -> GestureKind {
        match self.gesture {
            Gesture::Idle => GestureKind::Idle,
            Gesture::Pressed { .. } => GestureKind::Pressed,
            Gesture::Panning { .. } => GestureKind::Panning,
            Gesture::Framing { .. } => GestureKind::Framing,
            Gesture::Relocating { .. } => GestureKind::Relocating,
        }
    }

    #[must_use]
    pub fn is_zooming(&self) -> bool {
        self.zooming
    }

    pub fn handle(&mut self, event: &InputEvent, core: &mut EngineCore) {
        if let Some(screen) = event.screen() {
            self.last_screen = Some(screen);
        }
        if !core.emit(event) {
            trace!(event = event.name(), "event: claimed by input listener");
            return;
        }
        match event {
            InputEvent::PointerDown { screen, button, .. } => self.pointer_down(*screen, *button, core),
            InputEvent::PointerMove { screen, .. } => self.pointer_move(*screen, core),
            InputEvent::PointerUp { screen, button, .. } => self.pointer_up(*screen, *button, core),
            InputEvent::Wheel { screen, delta, .. } => self.wheel(*screen, *delta, core),
            InputEvent::KeyDown { key, modifiers } => self.key_down(key, *modifiers, core),
            InputEvent::KeyUp { key, modifiers } => self.key_up(key, *modifiers, core),
        }
    }

    // --- Pointer ---

    fn pointer_down(&mut self, screen: Point, button: Button, core: &mut EngineCore) {
        let pos = core.pos2crd(screen);
        match button {
            Button::Primary => {
                core.fire("leftdown", &Signal::Pointer { pos, screen, button });
                if self.gesture != Gesture::Idle {
                    return;
                }
                if self.space_held {
                    self.begin_pan(screen, button, core);
                    return;
                }
                match core.object_at(pos) {
                    Some(id) => self.gesture = Gesture::Pressed { id, screen, origin: pos },
                    None => {
                        self.gesture = Gesture::Framing { origin: pos };
                        self.set_cursor("crosshair", core);
                        core.fire("frame.begin", &Signal::Frame { rect: Rect::from_points(pos, pos), hits: Vec::new() });
                    }
                }
            }
            Button::Middle => {
                if self.gesture == Gesture::Idle {
                    self.begin_pan(screen, button, core);
                }
            }
            Button::Secondary => {
                core.fire("rightdown", &Signal::Pointer { pos, screen, button });
            }
        }
    }

    fn pointer_move(&mut self, screen: Point, core: &mut EngineCore) {
        match self.gesture.clone() {
            Gesture::Idle => {}
            Gesture::Panning { last, button } => {
                let delta = screen - last;
                self.gesture = Gesture::Panning { last: screen, button };
                if !delta.is_zero() {
                    core.pan_by(delta);
                    core.fire("pan.ing", &Signal::Pan { delta });
                }
            }
            Gesture::Pressed { id, screen: down, origin } => {
                if screen.distance(down) < core.config().drag_threshold_px {
                    return;
                }
                let ids = vec![id];
                debug!(%id, "event: relocation started");
                self.gesture = Gesture::Relocating { ids: ids.clone(), origin };
                self.set_cursor("move", core);
                core.fire("reloc.begin", &Signal::Reloc { ids, delta: Vector::ZERO });
                self.update_edge_slide(screen, core);
                self.refresh_drag(core);
            }
            Gesture::Framing { .. } | Gesture::Relocating { .. } => {
                self.update_edge_slide(screen, core);
                self.refresh_drag(core);
            }
        }
    }

    fn pointer_up(&mut self, screen: Point, button: Button, core: &mut EngineCore) {
        let pos = core.pos2crd(screen);
        match button {
            Button::Primary => {
                core.fire("leftup", &Signal::Pointer { pos, screen, button });
            }
            Button::Secondary => {
                core.fire("rightup", &Signal::Pointer { pos, screen, button });
            }
            Button::Middle => {}
        }
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Panning { button: held, .. } if held == button => {
                self.release_cursor(core);
                core.fire("pan.end", &Signal::Pan { delta: Vector::ZERO });
            }
            Gesture::Framing { origin } if button == Button::Primary => {
                core.stop_slide();
                self.release_cursor(core);
                let rect = Rect::from_points(origin, pos);
                let hits = core.select_in(rect);
                debug!(hits = hits.len(), "event: frame finished");
                core.fire("frame.end", &Signal::Frame { rect, hits });
            }
            Gesture::Relocating { ids, origin } if button == Button::Primary => {
                core.stop_slide();
                self.release_cursor(core);
                self.finish_reloc(ids, pos - origin, core);
            }
            Gesture::Pressed { .. } if button == Button::Primary => {}
            other => self.gesture = other,
        }
    }

    fn finish_reloc(&mut self, ids: Vec<Id>, delta: Vector, core: &mut EngineCore) {
        let moved: Vec<Id> = ids.iter().copied().filter(|id| core.relocate_by(*id, delta)).collect();
        if moved.is_empty() {
            debug!(?ids, "event: relocation blocked");
            core.fire("reloc.cancel", &Signal::Reloc { ids, delta: Vector::ZERO });
            return;
        }
        debug!(moved = moved.len(), dx = delta.x, dy = delta.y, "event: relocation finished");
        core.fire("reloc.end", &Signal::Reloc { ids: moved, delta });
    }

    fn begin_pan(&mut self, screen: Point, button: Button, core: &mut EngineCore) {
        self.gesture = Gesture::Panning { last: screen, button };
        self.set_cursor("grabbing", core);
        core.fire("pan.begin", &Signal::Pan { delta: Vector::ZERO });
    }

    /// Re-fire the running frame/reloc update for the last pointer position,
    /// after the pointer or the view under it moved.
    fn refresh_drag(&self, core: &mut EngineCore) {
        let Some(screen) = self.last_screen else {
            return;
        };
        let pos = core.pos2crd(screen);
        match &self.gesture {
            Gesture::Framing { origin } => {
                let rect = Rect::from_points(*origin, pos);
                let hits = core.select_in(rect);
                core.fire("frame.ing", &Signal::Frame { rect, hits });
            }
            Gesture::Relocating { ids, origin } => {
                core.fire("reloc.ing", &Signal::Reloc { ids: ids.clone(), delta: pos - *origin });
            }
            Gesture::Idle | Gesture::Pressed { .. } | Gesture::Panning { .. } => {}
        }
    }

    fn update_edge_slide(&self, screen: Point, core: &mut EngineCore) {
        let margin = core.config().edge_margin_px;
        let speed = core.config().edge_slide_speed;
        let stage = core.layout().stage_size();
        let axis = |p: f64, extent: f64| {
            if p < margin {
                (margin - p) * speed
            } else if p > extent - margin {
                (extent - margin - p) * speed
            } else {
                0.0
            }
        };
        let v = Vector::new(axis(screen.x, stage.width), axis(screen.y, stage.height));
        if v.is_zero() {
            core.stop_slide();
        } else {
            core.start_slide(v);
        }
    }

    // --- Wheel ---

    fn wheel(&mut self, screen: Point, delta: WheelDelta, core: &mut EngineCore) {
        if delta.dy.abs() < f64::EPSILON {
            return;
        }
        if !self.zooming {
            self.zooming = true;
            core.fire("zoom.begin", &zoom_signal(screen, core));
        }
        if core.zoom(delta.dy, screen) {
            core.fire("zoom.ing", &zoom_signal(screen, core));
            self.refresh_drag(core);
        }
        let delay = core.config().zoom_end_delay_ms;
        core.restart_timer(delay, EngineTimer::ZoomEnd);
    }

    pub fn on_timer(&mut self, timer: EngineTimer, core: &mut EngineCore) {
        match timer {
            EngineTimer::ZoomEnd => {
                if self.zooming {
                    self.zooming = false;
                    let anchor = self.last_screen.unwrap_or(Point::ORIGIN);
                    core.fire("zoom.end", &zoom_signal(anchor, core));
                }
            }
        }
    }

    // --- Keys ---

    fn key_down(&mut self, key: &Key, modifiers: Modifiers, core: &mut EngineCore) {
        if key.is_space() {
            self.space_held = true;
        }
        core.fire("key.down", &Signal::Key { key: key.clone(), modifiers });
        if key.is_escape() {
            self.cancel(core);
        }
    }

    fn key_up(&mut self, key: &Key, modifiers: Modifiers, core: &mut EngineCore) {
        if key.is_space() {
            self.space_held = false;
        }
        core.fire("key.up", &Signal::Key { key: key.clone(), modifiers });
    }

    // --- Frame / cancel ---

    /// Per-frame work: edge sliding while a drag is running.
    pub fn on_frame(&mut self, core: &mut EngineCore) {
        match self.gesture {
            Gesture::Framing { .. } | Gesture::Relocating { .. } => {
                if core.step_slide() {
                    self.refresh_drag(core);
                }
            }
            Gesture::Idle | Gesture::Pressed { .. } | Gesture::Panning { .. } => core.stop_slide(),
        }
    }

    /// Abort the running gesture, firing its cancel or end signal.
    pub fn cancel(&mut self, core: &mut EngineCore) {
        core.stop_slide();
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Idle | Gesture::Pressed { .. } => {}
            Gesture::Panning { .. } => {
                core.fire("pan.end", &Signal::Pan { delta: Vector::ZERO });
            }
            Gesture::Framing { origin } => {
                debug!("event: frame cancelled");
                core.fire("frame.cancel", &Signal::Frame { rect: Rect::from_points(origin, origin), hits: Vec::new() });
            }
            Gesture::Relocating { ids, .. } => {
                debug!(?ids, "event: relocation cancelled");
                core.fire("reloc.cancel", &Signal::Reloc { ids, delta: Vector::ZERO });
            }
        }
        self.release_cursor(core);
    }

    fn set_cursor(&mut self, name: &str, core: &mut EngineCore) {
        self.release_cursor(core);
        self.cursor = Some(core.push_cursor(name));
    }

    fn release_cursor(&mut self, core: &mut EngineCore) {
        if let Some(token) = self.cursor.take() {
            core.pop_cursor(token);
        }
    }
}

fn zoom_signal(anchor: Point, core: &EngineCore) -> Signal {
    let layout = core.layout();
    Signal::Zoom { anchor, logic_width: layout.logic_width(), level: layout.zoom_level() }
}
