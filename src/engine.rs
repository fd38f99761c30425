//! Engine core and the surface-bound engine wrapper.
//!
//! [`EngineCore`] owns every service that does not touch a drawing surface:
//! layout, both notifiers, memories, the object registry, the scheduler, the
//! cursor stack and the outgoing [`Action`] queue. Layers and registrable
//! objects receive `&mut EngineCore`, never the whole [`Engine`].
//!
//! [`Engine`] adds the render pipeline and the gesture handler, and is what a
//! host drives: device events in, `on_frame` once per animation frame, and
//! [`Engine::take_actions`] to learn when to request the next frame or swap
//! the cursor.
//!
//! Requesting a frame is idempotent: any number of `render` calls between two
//! frames produce a single [`Action::RequestFrame`].

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::animation::{Easing, Scheduler, TweenId};
use crate::arena::{Arena, PointArena};
use crate::clock::{Clock, SystemClock};
use crate::config::{ConfigError, EngineConfig};
use crate::cursor::{CursorStack, CursorToken};
use crate::event::{EventHandler, GestureKind};
use crate::geom::{Point, Rect, Size, Vector};
use crate::id::{Id, IdSource, TimeIds};
use crate::input::{Button, InputEvent, Key, Modifiers, WheelDelta};
use crate::layout::{Layout, ViewState};
use crate::memory::{CurrentMemoryHandle, MemoryId, MemoryManager};
use crate::notify::{Flow, ListenerId, Scope, ScopedNotifier, Signal, StackedNotifier};
use crate::registry::{ObjectRegistry, Registrable};
use crate::render::{FrameStats, Layer, RenderError, RenderPipeline, Surface};

/// Memory field holding the per-document object registry.
pub const OBJECTS_FIELD: &str = "objects";
/// Memory field holding the per-document view.
pub const VIEW_FIELD: &str = "view";

/// Requests for the host, drained with `take_actions`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Call `on_frame` on the next animation frame.
    RequestFrame,
    /// Show this CSS cursor on the stage element.
    SetCursor(String),
}

/// Debounce timers the engine arms on its own scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineTimer {
    ZoomEnd,
}

/// Every engine service that does not depend on a drawing surface.
pub struct EngineCore {
    config: EngineConfig,
    layout: Layout,
    signals: Rc<ScopedNotifier<Signal>>,
    input: Rc<StackedNotifier<InputEvent>>,
    memory: MemoryManager,
    objects: CurrentMemoryHandle<ObjectRegistry>,
    view: CurrentMemoryHandle<ViewState>,
    clock: Rc<dyn Clock>,
    ids: Box<dyn IdSource>,
    cursors: CursorStack,
    scheduler: Scheduler<EngineTimer>,
    dirty: bool,
    frame_pending: bool,
    actions: Vec<Action>,
}

impl EngineCore {
    /// Core on the wall clock with time-derived ids.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`] from validating `config`.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        Self::with_parts(config, Rc::new(SystemClock), Box::new(TimeIds::new(SystemClock)))
    }

    /// Core with an explicit time source and id generator.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`] from validating `config`.
    pub fn with_parts(config: EngineConfig, clock: Rc<dyn Clock>, ids: Box<dyn IdSource>) -> Result<Self, ConfigError> {
        let layout = Layout::new(&config)?;
        let memory = MemoryManager::new();
        let objects = memory.malloc(OBJECTS_FIELD, ObjectRegistry::new());
        let view = memory.malloc(VIEW_FIELD, layout.save_view());
        let mut core = Self {
            config,
            layout,
            signals: Rc::new(ScopedNotifier::new()),
            input: Rc::new(StackedNotifier::new()),
            memory,
            objects,
            view,
            clock,
            ids,
            cursors: CursorStack::new(),
            scheduler: Scheduler::new(),
            dirty: true,
            frame_pending: false,
            actions: Vec::new(),
        };
        core.sync_crop();
        info!(memory = %core.memory.current(), "engine: core ready");
        Ok(core)
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    #[must_use]
    pub fn now(&self) -> f64 {
        self.clock.now_ms()
    }

    // --- Coordinates / view ---

    #[must_use]
    pub fn crd2pos(&self, p: Point) -> Point {
        self.layout.crd2pos(p)
    }

    #[must_use]
    pub fn pos2crd(&self, p: Point) -> Point {
        self.layout.pos2crd(p)
    }

    pub fn pan_by(&mut self, px: Vector) {
        self.layout.pan_by(px);
        self.view_changed();
    }

    /// Wheel-style zoom; see [`Layout::zoom`].
    pub fn zoom(&mut self, delta: f64, anchor: Point) -> bool {
        let changed = self.layout.zoom(delta, anchor);
        if changed {
            self.view_changed();
        }
        changed
    }

    pub fn zoom_to(&mut self, logic_width: f64, anchor: Point) -> bool {
        let changed = self.layout.zoom_to(logic_width, anchor);
        if changed {
            self.view_changed();
        }
        changed
    }

    pub fn fit(&mut self, rect: Rect, padding_px: f64) -> bool {
        let changed = self.layout.fit(rect, padding_px);
        if changed {
            self.view_changed();
        }
        changed
    }

    /// Fit every registered object of the current memory.
    pub fn fit_objects(&mut self, padding_px: f64) -> bool {
        let Some(bbox) = self.objects.with(ObjectRegistry::bounding_box).flatten() else {
            debug!("engine: nothing to fit");
            return false;
        };
        self.fit(bbox, padding_px)
    }

    pub fn center_on(&mut self, c: Point) {
        self.layout.center_on(c);
        self.view_changed();
    }

    pub fn set_stage_size(&mut self, size: Size) {
        self.layout.set_stage_size(size);
        self.view_changed();
    }

    pub fn start_slide(&mut self, px_per_frame: Vector) {
        let was = self.layout.is_sliding();
        self.layout.start_slide(px_per_frame);
        if !was && self.layout.is_sliding() {
            self.render();
        }
    }

    pub fn stop_slide(&mut self) {
        self.layout.stop_slide();
    }

    /// Apply one frame of sliding. Returns whether the view moved.
    pub fn step_slide(&mut self) -> bool {
        if self.layout.step_slide().is_none() {
            return false;
        }
        self.view_changed();
        true
    }

    fn view_changed(&mut self) {
        self.sync_crop();
        self.render_all();
    }

    fn sync_crop(&mut self) {
        let visible = self.layout.visible_rect();
        if self.objects.with_mut(|reg| reg.set_crop(Some(visible))).is_none() {
            warn!("engine: object registry unavailable for crop");
        }
    }

    // --- Signals ---

    /// The shared semantic notifier, for listeners that outlive a borrow of the core.
    #[must_use]
    pub fn signals(&self) -> Rc<ScopedNotifier<Signal>> {
        Rc::clone(&self.signals)
    }

    pub fn on<F>(&self, name: &str, callback: F) -> ListenerId
    where
        F: FnMut(&str, &Signal) -> Flow + 'static,
    {
        self.signals.on(name, callback)
    }

    pub fn off(&self, name: &str, id: ListenerId) -> bool {
        self.signals.off(name, id)
    }

    pub fn fire(&self, name: &str, payload: &Signal) -> bool {
        self.signals.fire(name, payload)
    }

    #[must_use]
    pub fn scope(&self, prefix: &str) -> Scope<Signal> {
        self.signals.scope(prefix)
    }

    // --- Raw input ---

    /// Subscribe to a raw device event at `level`; higher levels run first
    /// and may claim the event with [`Flow::Stop`].
    pub fn on_input<F>(&self, name: &str, level: i32, callback: F) -> ListenerId
    where
        F: FnMut(&InputEvent) -> Flow + 'static,
    {
        self.input.on_level(name, level, callback)
    }

    pub fn off_input(&self, name: &str, id: ListenerId) -> bool {
        self.input.off(name, id)
    }

    /// Offer `event` to the stacked listeners. `false` means it was claimed.
    pub fn emit(&self, event: &InputEvent) -> bool {
        self.input.fire(event.name(), event)
    }

    // --- Cursor ---

    pub fn push_cursor(&mut self, name: &str) -> CursorToken {
        let (token, changed) = self.cursors.push(name);
        if changed {
            self.actions.push(Action::SetCursor(name.to_owned()));
        }
        token
    }

    pub fn pop_cursor(&mut self, token: CursorToken) {
        if self.cursors.pop(token) {
            self.actions.push(Action::SetCursor(self.cursors.current().to_owned()));
        }
    }

    #[must_use]
    pub fn cursor(&self) -> &str {
        self.cursors.current()
    }

    // --- Memories ---

    #[must_use]
    pub fn memory(&self) -> &MemoryManager {
        &self.memory
    }

    /// Allocate a per-memory field; see [`MemoryManager::malloc`].
    pub fn malloc<T: Clone + 'static>(&self, name: &str, proto: T) -> CurrentMemoryHandle<T> {
        self.memory.malloc(name, proto)
    }

    #[must_use]
    pub fn current_memory(&self) -> MemoryId {
        self.memory.current()
    }

    pub fn create_memory(&mut self) -> Option<MemoryId> {
        let id = self.memory.create_memory()?;
        self.fire("memory.create", &Signal::Memory { from: None, to: id });
        Some(id)
    }

    /// Make `to` the active memory, carrying the view along with it.
    pub fn switch_memory(&mut self, to: MemoryId) -> bool {
        let from = self.memory.current();
        if from == to {
            return true;
        }
        if !self.memory.contains(to) {
            warn!(%to, "engine: switch to unknown memory");
            return false;
        }
        let payload = Signal::Memory { from: Some(from), to };
        self.fire("memory.switch.before", &payload);
        if !self.view.set(self.layout.save_view()) {
            warn!(%from, "engine: view not saved before switch");
        }
        if !self.memory.switch_memory(to) {
            return false;
        }
        if let Some(view) = self.view.get() {
            self.layout.restore_view(view);
        }
        self.layout.stop_slide();
        self.view_changed();
        info!(%from, %to, "engine: memory switched");
        self.fire("memory.switch.after", &payload);
        true
    }

    /// Drop memory `id`. Deleting the active memory first switches to its
    /// successor, else its predecessor, else a fresh memory.
    pub fn delete_memory(&mut self, id: MemoryId) -> bool {
        if !self.memory.contains(id) {
            warn!(%id, "engine: delete of unknown memory");
            return false;
        }
        if self.memory.current() == id {
            let ids = self.memory.memory_ids();
            let pos = ids.iter().position(|m| *m == id).unwrap_or_default();
            let neighbour = ids.get(pos + 1).or_else(|| pos.checked_sub(1).and_then(|p| ids.get(p))).copied();
            let next = match neighbour {
                Some(next) => next,
                None => match self.create_memory() {
                    Some(fresh) => fresh,
                    None => return false,
                },
            };
            if !self.switch_memory(next) {
                return false;
            }
        }
        if !self.memory.delete_memory(id) {
            return false;
        }
        self.fire("memory.delete", &Signal::Memory { from: Some(id), to: self.memory.current() });
        true
    }

    // --- Ids ---

    pub fn next_id(&mut self) -> Id {
        self.ids.next_id()
    }

    // --- Objects ---

    /// Index `obj` in the current memory and notify it.
    pub fn register<R: Registrable + ?Sized>(&mut self, obj: &mut R) -> bool {
        let (id, rect, level) = (obj.id(), obj.rect(), obj.level());
        if !self.objects.with_mut(|reg| reg.insert(id, rect, level)).unwrap_or(false) {
            debug!(%id, "engine: register rejected");
            return false;
        }
        obj.on_registered(self);
        self.render_all();
        true
    }

    pub fn unregister(&mut self, id: Id) -> bool {
        let removed = self.objects.with_mut(|reg| reg.remove(id)).unwrap_or(false);
        if removed {
            self.ids.release(id);
            self.render_all();
        }
        removed
    }

    /// Move `id` to `rect` on its level. Fails on collision.
    pub fn relocate(&mut self, id: Id, rect: Rect) -> bool {
        let moved = self.objects.with_mut(|reg| reg.relocate(id, rect)).unwrap_or(false);
        if moved {
            self.render_all();
        }
        moved
    }

    /// Shift `id` by `delta` logical units.
    pub fn relocate_by(&mut self, id: Id, delta: Vector) -> bool {
        let Some(rect) = self.object_rect(id) else {
            return false;
        };
        self.relocate(id, rect.translate(delta))
    }

    #[must_use]
    pub fn object_rect(&self, id: Id) -> Option<Rect> {
        self.objects.with(|reg| reg.get(id)).flatten().map(|(rect, _)| rect)
    }

    #[must_use]
    pub fn object_at(&self, p: Point) -> Option<Id> {
        self.objects.with(|reg| reg.object_at(p, None)).flatten()
    }

    #[must_use]
    pub fn objects_in(&self, rect: Rect, fill: bool) -> Vec<Id> {
        self.objects.with(|reg| reg.objects_in(rect, fill)).unwrap_or_default()
    }

    /// Objects meeting a logical selection rect, including those outside the view.
    #[must_use]
    pub fn select_in(&self, rect: Rect) -> Vec<Id> {
        self.objects.with(|reg| reg.select(rect, true)).unwrap_or_default()
    }

    /// An empty point arena for a layer's own anchors, using the configured
    /// tolerance and cropped to the current view.
    #[must_use]
    pub fn point_arena(&self) -> PointArena {
        let mut arena = PointArena::new(self.config.point_tolerance);
        arena.set_crop(Some(self.layout.visible_rect()));
        arena
    }

    #[must_use]
    pub fn object_count(&self) -> usize {
        self.objects.with(ObjectRegistry::len).unwrap_or(0)
    }

    // --- Animation ---

    /// Start a tween now. Frames keep coming until it ends.
    pub fn animate(
        &mut self,
        duration_ms: f64,
        easing: Easing,
        on_step: impl FnMut(f64) + 'static,
        on_end: Option<Box<dyn FnOnce()>>,
    ) -> TweenId {
        self.sync_scheduler();
        let id = self.scheduler.animate(duration_ms, easing, on_step, on_end);
        self.render();
        id
    }

    pub fn cancel_animation(&mut self, id: TweenId, finish: bool) -> bool {
        self.scheduler.cancel(id, finish)
    }

    /// (Re)arm `key` for `delay_ms` from now.
    pub fn restart_timer(&mut self, delay_ms: f64, key: EngineTimer) {
        self.sync_scheduler();
        self.scheduler.restart_timer(delay_ms, key);
        self.render();
    }

    #[must_use]
    pub fn has_timer(&self, key: EngineTimer) -> bool {
        self.scheduler.has_timer(&key)
    }

    fn sync_scheduler(&mut self) {
        let now = self.clock.now_ms();
        if now > self.scheduler.now() {
            self.scheduler.sync_to(now);
        }
    }

    pub(crate) fn advance_scheduler(&mut self) -> Vec<EngineTimer> {
        let now = self.clock.now_ms();
        self.scheduler.advance(now)
    }

    // --- Rendering ---

    /// Ask for one more frame without invalidating the cache.
    pub fn render(&mut self) {
        if !self.frame_pending {
            self.frame_pending = true;
            self.actions.push(Action::RequestFrame);
        }
    }

    /// Invalidate the cache and ask for a frame.
    pub fn render_all(&mut self) {
        self.dirty = true;
        self.render();
    }

    /// Alias of [`EngineCore::render_all`] for content owners.
    pub fn mark_dirty(&mut self) {
        self.render_all();
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    #[must_use]
    pub fn frame_pending(&self) -> bool {
        self.frame_pending
    }

    fn begin_frame(&mut self) {
        self.frame_pending = false;
    }

    fn wants_next_frame(&self) -> bool {
        !self.scheduler.is_idle() || self.layout.is_sliding()
    }

    pub fn take_actions(&mut self) -> Vec<Action> {
        std::mem::take(&mut self.actions)
    }
}

/// The full engine: core services plus a render pipeline over `S`.
pub struct Engine<S: Surface> {
    pub core: EngineCore,
    pipeline: RenderPipeline<S>,
    handler: EventHandler,
}

impl<S: Surface> Engine<S> {
    /// # Errors
    ///
    /// Any [`ConfigError`] from validating `config`.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        Ok(Self::with_core(EngineCore::new(config)?))
    }

    #[must_use]
    pub fn with_core(core: EngineCore) -> Self {
        Self { core, pipeline: RenderPipeline::new(), handler: EventHandler::new() }
    }

    // --- Stage ---

    /// Attach the visible surface; the layout adopts its size.
    pub fn attach_stage(&mut self, stage: S) {
        let size = stage.size();
        self.pipeline.attach_stage(stage);
        self.core.set_stage_size(size);
    }

    pub fn detach_stage(&mut self) -> Option<S> {
        self.pipeline.detach_stage()
    }

    #[must_use]
    pub fn stage(&self) -> Option<&S> {
        self.pipeline.stage()
    }

    #[must_use]
    pub fn cache(&self) -> Option<&S> {
        self.pipeline.cache()
    }

    pub fn resize(&mut self, size: Size) {
        self.pipeline.resize(size);
        self.core.set_stage_size(size);
    }

    // --- Layers ---

    pub fn mount(&mut self, layer: impl Layer<S> + 'static) {
        self.pipeline.mount(Box::new(layer), &mut self.core);
    }

    pub fn unmount(&mut self, name: &str) -> Option<Box<dyn Layer<S>>> {
        self.pipeline.unmount(name, &mut self.core)
    }

    pub fn set_layer_visible(&mut self, name: &str, visible: bool) -> bool {
        self.pipeline.set_visible(name, visible, &mut self.core)
    }

    #[must_use]
    pub fn is_layer_visible(&self, name: &str) -> Option<bool> {
        self.pipeline.is_visible(name)
    }

    #[must_use]
    pub fn layer_names(&self) -> Vec<&str> {
        self.pipeline.layer_names()
    }

    // --- Input ---

    /// Feed one device event through listeners and the gesture machine.
    pub fn handle(&mut self, event: &InputEvent) -> Vec<Action> {
        self.handler.handle(event, &mut self.core);
        self.core.take_actions()
    }

    pub fn on_pointer_down(&mut self, screen: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.handle(&InputEvent::PointerDown { screen, button, modifiers })
    }

    pub fn on_pointer_move(&mut self, screen: Point, modifiers: Modifiers) -> Vec<Action> {
        self.handle(&InputEvent::PointerMove { screen, modifiers })
    }

    pub fn on_pointer_up(&mut self, screen: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.handle(&InputEvent::PointerUp { screen, button, modifiers })
    }

    pub fn on_wheel(&mut self, screen: Point, delta: WheelDelta, modifiers: Modifiers) -> Vec<Action> {
        self.handle(&InputEvent::Wheel { screen, delta, modifiers })
    }

    pub fn on_key_down(&mut self, key: &str, modifiers: Modifiers) -> Vec<Action> {
        self.handle(&InputEvent::KeyDown { key: Key::new(key), modifiers })
    }

    pub fn on_key_up(&mut self, key: &str, modifiers: Modifiers) -> Vec<Action> {
        self.handle(&InputEvent::KeyUp { key: Key::new(key), modifiers })
    }

    /// Abort any gesture in progress, firing its cancel signal.
    pub fn cancel_gesture(&mut self) -> Vec<Action> {
        self.handler.cancel(&mut self.core);
        self.core.take_actions()
    }

    #[must_use]
    pub fn gesture(&self) -> GestureKind {
        self.handler.gesture()
    }

    // --- Frame ---

    /// Run one animation frame: timers and tweens, edge sliding, then composition.
    ///
    /// # Errors
    ///
    /// [`RenderError::DuplicateLayer`] while two layers share a name.
    pub fn on_frame(&mut self) -> Result<FrameStats, RenderError> {
        self.core.begin_frame();
        for timer in self.core.advance_scheduler() {
            self.handler.on_timer(timer, &mut self.core);
        }
        self.handler.on_frame(&mut self.core);
        let stats = self.pipeline.render_frame(&mut self.core)?;
        if self.core.wants_next_frame() {
            self.core.render();
        }
        Ok(stats)
    }

    pub fn take_actions(&mut self) -> Vec<Action> {
        self.core.take_actions()
    }

    // --- Memories ---

    pub fn create_memory(&mut self) -> Option<MemoryId> {
        self.core.create_memory()
    }

    /// Switch documents. A gesture in progress is cancelled first.
    pub fn switch_memory(&mut self, to: MemoryId) -> bool {
        if to != self.core.current_memory() {
            self.handler.cancel(&mut self.core);
        }
        self.core.switch_memory(to)
    }

    pub fn delete_memory(&mut self, id: MemoryId) -> bool {
        if id == self.core.current_memory() {
            self.handler.cancel(&mut self.core);
        }
        self.core.delete_memory(id)
    }
}
