//! Overlap-free rect arena.

#[cfg(test)]
#[path = "rect_test.rs"]
mod rect_test;

use std::collections::BTreeMap;

use tracing::warn;

use super::{Arena, ArenaError, crop_scope};
use crate::geom::{Point, Rect};
use crate::id::Id;

/// Rects keyed by id. No two live rects overlap (shared edges are allowed).
#[derive(Debug, Clone, Default)]
pub struct RectArena {
    objects: BTreeMap<Id, Rect>,
    bbox: Option<Rect>,
    crop: Option<Rect>,
    scope: Option<Rect>,
}

impl RectArena {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Live ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = Id> + '_ {
        self.objects.keys().copied()
    }

    /// The first live rect overlapping `rect`, other than `except`.
    #[must_use]
    pub fn overlapping(&self, rect: &Rect, except: Option<Id>) -> Option<Id> {
        self.objects
            .iter()
            .find(|(id, r)| Some(**id) != except && r.intersects_rect(rect))
            .map(|(id, _)| *id)
    }

    /// Every rect meeting `rect`, ignoring the crop. For explicit
    /// selections that may reach past the visible region.
    #[must_use]
    pub fn select(&self, rect: &Rect, fill: bool) -> Vec<Id> {
        self.objects
            .iter()
            .filter(|(_, r)| Self::meets(rect, r, fill))
            .map(|(id, _)| *id)
            .collect()
    }

    fn refresh_scope(&mut self) {
        self.scope = crop_scope(self.crop, self.bbox);
    }

    fn rebuild_bbox(&mut self) {
        self.bbox = self.objects.values().fold(None, |acc: Option<Rect>, r| Some(acc.map_or(*r, |a| a.union(r))));
        self.refresh_scope();
    }

    fn grow_bbox(&mut self, rect: &Rect) {
        self.bbox = Some(self.bbox.map_or(*rect, |b| b.union(rect)));
        self.refresh_scope();
    }

    /// Whether removing `old` could shrink the bounding box.
    fn on_bbox_edge(&self, old: &Rect) -> bool {
        self.bbox.is_none_or(|b| {
            old.left() <= b.left() || old.top() <= b.top() || old.right() >= b.right() || old.bottom() >= b.bottom()
        })
    }

    fn candidates(&self, except: Option<Id>) -> impl Iterator<Item = (Id, &Rect)> + '_ {
        let scope = self.scope;
        self.objects
            .iter()
            .filter(move |(id, r)| Some(**id) != except && scope.is_some_and(|s| s.touches(r)))
            .map(|(id, r)| (*id, r))
    }

    fn meets(query: &Rect, r: &Rect, fill: bool) -> bool {
        if fill {
            return query.intersects_rect(r);
        }
        // Outline only: touching, but not strictly inside the query.
        let inside = r.left() > query.left()
            && r.right() < query.right()
            && r.top() > query.top()
            && r.bottom() < query.bottom();
        query.touches(r) && !inside
    }
}

impl Arena for RectArena {
    type Region = Rect;

    const KIND: &'static str = "rect arena";

    fn add_object(&mut self, id: Id, rect: Rect) -> bool {
        if self.objects.contains_key(&id) {
            warn!(%id, "arena: duplicate id rejected");
            return false;
        }
        if let Some(other) = self.overlapping(&rect, None) {
            warn!(%id, %other, "arena: overlapping rect rejected");
            return false;
        }
        self.objects.insert(id, rect);
        self.grow_bbox(&rect);
        true
    }

    fn set_object(&mut self, id: Id, rect: Rect) -> bool {
        let Some(old) = self.objects.get(&id).copied() else {
            warn!(%id, "arena: set on unknown id");
            return false;
        };
        if let Some(other) = self.overlapping(&rect, Some(id)) {
            warn!(%id, %other, "arena: overlapping rect rejected");
            return false;
        }
        self.objects.insert(id, rect);
        if self.on_bbox_edge(&old) {
            self.rebuild_bbox();
        } else {
            self.grow_bbox(&rect);
        }
        true
    }

    fn del_object(&mut self, id: Id) -> bool {
        let Some(old) = self.objects.remove(&id) else {
            warn!(%id, "arena: delete of unknown id");
            return false;
        };
        if self.on_bbox_edge(&old) {
            self.rebuild_bbox();
        }
        true
    }

    fn get(&self, id: Id) -> Option<Rect> {
        self.objects.get(&id).copied()
    }

    fn len(&self) -> usize {
        self.objects.len()
    }

    fn clear(&mut self) {
        self.objects.clear();
        self.bbox = None;
        self.refresh_scope();
    }

    fn bounding_box(&self) -> Option<Rect> {
        self.bbox
    }

    fn set_crop(&mut self, crop: Option<Rect>) {
        self.crop = crop;
        self.refresh_scope();
    }

    fn scope(&self) -> Option<Rect> {
        self.scope
    }

    fn pos_occupied(&self, p: Point, except: Option<Id>) -> Option<Id> {
        if !self.scope.is_some_and(|s| s.contains_point(p)) {
            return None;
        }
        self.candidates(except).find(|(_, r)| r.contains_point(p)).map(|(id, _)| id)
    }

    fn pos_occupied_set(&self, p: Point, except: Option<Id>) -> Vec<Id> {
        if !self.scope.is_some_and(|s| s.contains_point(p)) {
            return Vec::new();
        }
        self.candidates(except).filter(|(_, r)| r.contains_point(p)).map(|(id, _)| id).collect()
    }

    fn line_occupied(&self, a: Point, b: Point, except: Option<Id>) -> Result<Option<Id>, ArenaError> {
        Ok(self.candidates(except).find(|(_, r)| r.intersects_segment(a, b)).map(|(id, _)| id))
    }

    fn line_occupied_set(&self, a: Point, b: Point, except: Option<Id>) -> Result<Vec<Id>, ArenaError> {
        Ok(self
            .candidates(except)
            .filter(|(_, r)| r.intersects_segment(a, b))
            .map(|(id, _)| id)
            .collect())
    }

    fn rect_occupied(&self, rect: Rect, fill: bool, except: Option<Id>) -> Result<Option<Id>, ArenaError> {
        Ok(self.candidates(except).find(|(_, r)| Self::meets(&rect, r, fill)).map(|(id, _)| id))
    }

    fn rect_occupied_set(&self, rect: Rect, fill: bool, except: Option<Id>) -> Result<Vec<Id>, ArenaError> {
        Ok(self
            .candidates(except)
            .filter(|(_, r)| Self::meets(&rect, r, fill))
            .map(|(id, _)| id)
            .collect())
    }
}
