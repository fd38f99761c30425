//! Spatial index of registered scene objects, one rect arena per level.
//!
//! The registry is stored as a memory field, so every document carries its
//! own index and switching memories swaps hit-testing along with the rest of
//! the document state. Objects themselves stay with their owner; the registry
//! only records id → (rect, level).

#[cfg(test)]
#[path = "registry_test.rs"]
mod registry_test;

use std::collections::{BTreeMap, HashMap};

use tracing::warn;

use crate::arena::{Arena, RectArena};
use crate::engine::EngineCore;
use crate::geom::{Point, Rect};
use crate::id::Id;

/// Anything the engine can index for hit-testing.
pub trait Registrable {
    fn id(&self) -> Id;

    /// Logical bounds.
    fn rect(&self) -> Rect;

    /// Stacking level; higher levels win hit-tests. Objects on different
    /// levels may overlap, objects on one level may not.
    fn level(&self) -> i32 {
        0
    }

    /// Called once the object is indexed.
    fn on_registered(&mut self, _core: &mut EngineCore) {}
}

#[derive(Debug, Clone, Default)]
pub struct ObjectRegistry {
    levels: BTreeMap<i32, RectArena>,
    level_of: HashMap<Id, i32>,
    crop: Option<Rect>,
}

impl ObjectRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Index `id` at `rect` on `level`. Fails on a known id or an overlap within the level.
    pub fn insert(&mut self, id: Id, rect: Rect, level: i32) -> bool {
        if self.level_of.contains_key(&id) {
            warn!(%id, "registry: object already registered");
            return false;
        }
        let crop = self.crop;
        let arena = self.levels.entry(level).or_insert_with(|| {
            let mut arena = RectArena::new();
            arena.set_crop(crop);
            arena
        });
        if !arena.add_object(id, rect) {
            return false;
        }
        self.level_of.insert(id, level);
        true
    }

    pub fn remove(&mut self, id: Id) -> bool {
        let Some(level) = self.level_of.remove(&id) else {
            warn!(%id, "registry: remove of unregistered object");
            return false;
        };
        let Some(arena) = self.levels.get_mut(&level) else {
            return false;
        };
        let removed = arena.del_object(id);
        if arena.is_empty() {
            self.levels.remove(&level);
        }
        removed
    }

    /// Move `id` to `rect` on its current level.
    pub fn relocate(&mut self, id: Id, rect: Rect) -> bool {
        let Some(arena) = self.level_of.get(&id).and_then(|l| self.levels.get_mut(l)) else {
            warn!(%id, "registry: relocate of unregistered object");
            return false;
        };
        arena.set_object(id, rect)
    }

    #[must_use]
    pub fn get(&self, id: Id) -> Option<(Rect, i32)> {
        let level = *self.level_of.get(&id)?;
        self.levels.get(&level)?.get(id).map(|r| (r, level))
    }

    #[must_use]
    pub fn contains(&self, id: Id) -> bool {
        self.level_of.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.level_of.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.level_of.is_empty()
    }

    /// Topmost object under `p`.
    #[must_use]
    pub fn object_at(&self, p: Point, except: Option<Id>) -> Option<Id> {
        self.levels.values().rev().find_map(|arena| arena.pos_occupied(p, except))
    }

    /// Every object meeting `rect`, topmost level first.
    #[must_use]
    pub fn objects_in(&self, rect: Rect, fill: bool) -> Vec<Id> {
        let mut hits = Vec::new();
        for arena in self.levels.values().rev() {
            match arena.rect_occupied_set(rect, fill, None) {
                Ok(ids) => hits.extend(ids),
                Err(err) => warn!(%err, "registry: rect query failed"),
            }
        }
        hits
    }

    /// Like [`Self::objects_in`], but unaffected by the crop.
    #[must_use]
    pub fn select(&self, rect: Rect, fill: bool) -> Vec<Id> {
        self.levels.values().rev().flat_map(|arena| arena.select(&rect, fill)).collect()
    }

    /// Whether `rect` on `level` would collide with anything except `except`.
    #[must_use]
    pub fn collides(&self, rect: Rect, level: i32, except: Option<Id>) -> bool {
        self.levels
            .get(&level)
            .is_some_and(|arena| arena.overlapping(&rect, except).is_some())
    }

    /// Restrict hit-tests to `crop`, usually the visible viewport.
    pub fn set_crop(&mut self, crop: Option<Rect>) {
        self.crop = crop;
        for arena in self.levels.values_mut() {
            arena.set_crop(crop);
        }
    }

    /// Union of every level's bounding box.
    #[must_use]
    pub fn bounding_box(&self) -> Option<Rect> {
        self.levels
            .values()
            .filter_map(|arena| arena.bounding_box())
            .reduce(|a, b| a.union(&b))
    }

    pub fn clear(&mut self) {
        self.levels.clear();
        self.level_of.clear();
    }
}
