//! Layered frame composition over a cache surface and the visible stage.
//!
//! DESIGN
//! ======
//! Layers are kept sorted by level (mount order breaks ties). A frame runs:
//!
//! 1. If the engine is dirty: clear the cache surface and let every visible
//!    layer draw its cached contribution (`on_cache`), ascending level order.
//! 2. Clear the stage and paint background layers (level < 0).
//! 3. Blit the cache onto the stage.
//! 4. Paint foreground layers (level >= 0).
//!
//! Expensive, rarely changing content belongs in `on_cache`; drag ghosts,
//! handles and other per-frame overlays belong in `on_paint`.
//!
//! TRADE-OFFS
//! ==========
//! Duplicate layer names are only detected on the next frame after a mount
//! and then fail every frame with [`RenderError::DuplicateLayer`] until one of
//! the duplicates is unmounted. A frame without a stage logs an error and
//! draws nothing. If the stage cannot allocate an offscreen surface, cache
//! contributions are drawn straight onto the stage every frame instead.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::collections::HashSet;

use tracing::{debug, error, trace, warn};

use crate::engine::EngineCore;
use crate::geom::{Point, Size};
use crate::notify::Signal;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("duplicate layer name: {0}")]
    DuplicateLayer(String),
}

/// A drawable bitmap: the stage, the cache, or a layer's private buffer.
pub trait Surface: Sized + 'static {
    fn size(&self) -> Size;
    fn resize(&mut self, size: Size);
    fn clear(&mut self);
    /// A new, blank surface compatible with this one, if the backend supports it.
    fn offscreen(&self, size: Size) -> Option<Self>;
    /// Copy `src` onto this surface with its top-left at `at`.
    fn draw_surface(&mut self, src: &Self, at: Point);
}

/// What a layer receives while mounting.
pub struct MountContext<'a, S> {
    pub core: &'a mut EngineCore,
    stage: Option<&'a S>,
}

impl<S: Surface> MountContext<'_, S> {
    /// A private offscreen surface. `None` before a stage is attached or when
    /// the backend cannot allocate one.
    pub fn alloc_surface(&self, size: Size) -> Option<S> {
        let Some(stage) = self.stage else {
            warn!("render: surface requested before stage attach");
            return None;
        };
        stage.offscreen(size)
    }
}

/// One contributor to the frame.
///
/// `on_cache` and `on_paint` return whether anything was drawn, which only
/// feeds [`FrameStats`].
pub trait Layer<S: Surface> {
    fn name(&self) -> &str;

    /// Negative levels paint under the cache, the rest over it.
    fn level(&self) -> i32;

    fn on_mount(&mut self, _ctx: &mut MountContext<'_, S>) {}

    fn on_unmount(&mut self, _core: &mut EngineCore) {}

    fn on_cache(&mut self, _cache: &mut S, _core: &mut EngineCore) -> bool {
        false
    }

    fn on_paint(&mut self, _stage: &mut S, _core: &mut EngineCore) -> bool {
        false
    }
}

/// Per-frame accounting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Whether the cache was rebuilt this frame.
    pub rebuilt: bool,
    /// Layers that drew into the cache.
    pub cached: usize,
    /// Layers that painted onto the stage.
    pub painted: usize,
}

struct Slot<S> {
    name: String,
    level: i32,
    visible: bool,
    layer: Box<dyn Layer<S>>,
}

pub struct RenderPipeline<S: Surface> {
    slots: Vec<Slot<S>>,
    stage: Option<S>,
    cache: Option<S>,
    check_names: bool,
}

impl<S: Surface> Default for RenderPipeline<S> {
    fn default() -> Self {
        Self { slots: Vec::new(), stage: None, cache: None, check_names: false }
    }
}

impl<S: Surface> RenderPipeline<S> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Stage ---

    /// Attach the visible surface and allocate a matching cache.
    pub fn attach_stage(&mut self, stage: S) {
        self.cache = stage.offscreen(stage.size());
        if self.cache.is_none() {
            warn!("render: offscreen surfaces unavailable, caching disabled");
        }
        debug!(width = stage.size().width, height = stage.size().height, "render: stage attached");
        self.stage = Some(stage);
    }

    pub fn detach_stage(&mut self) -> Option<S> {
        self.cache = None;
        self.stage.take()
    }

    #[must_use]
    pub fn stage(&self) -> Option<&S> {
        self.stage.as_ref()
    }

    #[must_use]
    pub fn cache(&self) -> Option<&S> {
        self.cache.as_ref()
    }

    /// Resize stage and cache. The caller marks the engine dirty.
    pub fn resize(&mut self, size: Size) {
        if let Some(stage) = self.stage.as_mut() {
            stage.resize(size);
        }
        if let Some(cache) = self.cache.as_mut() {
            cache.resize(size);
        }
    }

    // --- Layers ---

    pub fn mount(&mut self, mut layer: Box<dyn Layer<S>>, core: &mut EngineCore) {
        let name = layer.name().to_owned();
        let level = layer.level();
        {
            let mut ctx = MountContext { core: &mut *core, stage: self.stage.as_ref() };
            layer.on_mount(&mut ctx);
        }
        let at = self.slots.iter().position(|s| s.level > level).unwrap_or(self.slots.len());
        self.slots.insert(at, Slot { name: name.clone(), level, visible: true, layer });
        self.check_names = true;
        debug!(layer = %name, level, "render: layer mounted");
        core.fire("layer.mount", &Signal::Layer { name });
        core.render_all();
    }

    /// Detach the first layer called `name` and hand it back.
    pub fn unmount(&mut self, name: &str, core: &mut EngineCore) -> Option<Box<dyn Layer<S>>> {
        let Some(pos) = self.slots.iter().position(|s| s.name == name) else {
            warn!(layer = name, "render: unmount of unknown layer");
            return None;
        };
        let mut slot = self.slots.remove(pos);
        slot.layer.on_unmount(core);
        self.check_names = true;
        debug!(layer = name, "render: layer unmounted");
        core.fire("layer.unmount", &Signal::Layer { name: slot.name });
        core.render_all();
        Some(slot.layer)
    }

    pub fn set_visible(&mut self, name: &str, visible: bool, core: &mut EngineCore) -> bool {
        let Some(slot) = self.slots.iter_mut().find(|s| s.name == name) else {
            warn!(layer = name, "render: visibility change for unknown layer");
            return false;
        };
        if slot.visible != visible {
            slot.visible = visible;
            core.render_all();
        }
        true
    }

    #[must_use]
    pub fn is_visible(&self, name: &str) -> Option<bool> {
        self.slots.iter().find(|s| s.name == name).map(|s| s.visible)
    }

    /// Mounted layer names in paint order.
    #[must_use]
    pub fn layer_names(&self) -> Vec<&str> {
        self.slots.iter().map(|s| s.name.as_str()).collect()
    }

    fn duplicate_name(&self) -> Option<String> {
        let mut seen = HashSet::new();
        self.slots.iter().find(|s| !seen.insert(s.name.as_str())).map(|s| s.name.clone())
    }

    // --- Frame ---

    /// Compose one frame.
    ///
    /// # Errors
    ///
    /// [`RenderError::DuplicateLayer`] while two mounted layers share a name.
    pub fn render_frame(&mut self, core: &mut EngineCore) -> Result<FrameStats, RenderError> {
        if self.check_names {
            if let Some(dup) = self.duplicate_name() {
                error!(layer = %dup, "render: duplicate layer name");
                return Err(RenderError::DuplicateLayer(dup));
            }
            self.check_names = false;
        }
        let Some(stage) = self.stage.as_mut() else {
            error!("render: no stage attached, frame skipped");
            return Ok(FrameStats::default());
        };

        let mut stats = FrameStats::default();
        let rebuild = core.is_dirty();
        if rebuild {
            if let Some(cache) = self.cache.as_mut() {
                cache.clear();
                for slot in self.slots.iter_mut().filter(|s| s.visible) {
                    if slot.layer.on_cache(cache, core) {
                        stats.cached += 1;
                    }
                }
            }
            core.clear_dirty();
            stats.rebuilt = true;
        }

        stage.clear();
        for slot in self.slots.iter_mut().filter(|s| s.visible && s.level < 0) {
            if slot.layer.on_paint(stage, core) {
                stats.painted += 1;
            }
        }
        match self.cache.as_ref() {
            Some(cache) => stage.draw_surface(cache, Point::ORIGIN),
            None => {
                for slot in self.slots.iter_mut().filter(|s| s.visible) {
                    if slot.layer.on_cache(stage, core) {
                        stats.cached += 1;
                    }
                }
            }
        }
        for slot in self.slots.iter_mut().filter(|s| s.visible && s.level >= 0) {
            if slot.layer.on_paint(stage, core) {
                stats.painted += 1;
            }
        }

        if rebuild {
            core.fire("render.cache", &Signal::Cache { layers: stats.cached });
        }
        trace!(rebuilt = stats.rebuilt, cached = stats.cached, painted = stats.painted, "render: frame");
        Ok(stats)
    }
}
