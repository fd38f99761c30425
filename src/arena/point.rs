//! Point arena with tolerance-based nearest matching.
//!
//! Queries match the nearest stored point within `tolerance` of the query
//! point. The scope is the crop ∩ bounding box, padded by the tolerance, and
//! is recomputed whenever the crop, the tolerance or the contents change.
//! Segment and rect queries are not implemented for this variant.

#[cfg(test)]
#[path = "point_test.rs"]
mod point_test;

use std::collections::BTreeMap;

use tracing::warn;

use super::{Arena, crop_scope};
use crate::geom::{Point, Rect, Size};
use crate::id::Id;

/// Points keyed by id. No two live points coincide exactly.
#[derive(Debug, Clone, Default)]
pub struct PointArena {
    points: BTreeMap<Id, Point>,
    tolerance: f64,
    bbox: Option<Rect>,
    crop: Option<Rect>,
    /// Crop ∩ bbox, before tolerance padding.
    base: Option<Rect>,
}

impl PointArena {
    #[must_use]
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance: tolerance.abs(), ..Self::default() }
    }

    #[must_use]
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn set_tolerance(&mut self, tolerance: f64) {
        self.tolerance = tolerance.abs();
    }

    pub fn ids(&self) -> impl Iterator<Item = Id> + '_ {
        self.points.keys().copied()
    }

    /// Nearest live point within tolerance of `p`, with its distance.
    /// Equal distances resolve to the lower id.
    #[must_use]
    pub fn nearest(&self, p: Point, except: Option<Id>) -> Option<(Id, f64)> {
        let mut best: Option<(Id, f64)> = None;
        for (id, d) in self.within(p, except) {
            if best.is_none_or(|(_, bd)| d < bd) {
                best = Some((id, d));
            }
        }
        best
    }

    fn within(&self, p: Point, except: Option<Id>) -> Vec<(Id, f64)> {
        let Some(base) = self.base else {
            return Vec::new();
        };
        if !base.inflate(self.tolerance).contains_point(p) {
            return Vec::new();
        }
        self.points
            .iter()
            .filter(|(id, q)| Some(**id) != except && base.contains_point(**q))
            .map(|(id, q)| (*id, p.distance(*q)))
            .filter(|(_, d)| *d <= self.tolerance)
            .collect()
    }

    fn coincident(&self, p: Point, except: Option<Id>) -> Option<Id> {
        self.points
            .iter()
            .find(|(id, q)| Some(**id) != except && **q == p)
            .map(|(id, _)| *id)
    }

    fn rebuild(&mut self) {
        self.bbox = self.points.values().fold(None, |acc: Option<Rect>, p| {
            let r = Rect::from_pos_size(*p, Size::ZERO);
            Some(acc.map_or(r, |a| a.union(&r)))
        });
        self.base = crop_scope(self.crop, self.bbox);
    }
}

impl Arena for PointArena {
    type Region = Point;

    const KIND: &'static str = "point arena";

    fn add_object(&mut self, id: Id, p: Point) -> bool {
        if self.points.contains_key(&id) {
            warn!(%id, "arena: duplicate id rejected");
            return false;
        }
        if let Some(other) = self.coincident(p, None) {
            warn!(%id, %other, "arena: coincident point rejected");
            return false;
        }
        self.points.insert(id, p);
        self.rebuild();
        true
    }

    fn set_object(&mut self, id: Id, p: Point) -> bool {
        if !self.points.contains_key(&id) {
            warn!(%id, "arena: set on unknown id");
            return false;
        }
        if let Some(other) = self.coincident(p, Some(id)) {
            warn!(%id, %other, "arena: coincident point rejected");
            return false;
        }
        self.points.insert(id, p);
        self.rebuild();
        true
    }

    fn del_object(&mut self, id: Id) -> bool {
        if self.points.remove(&id).is_none() {
            warn!(%id, "arena: delete of unknown id");
            return false;
        }
        self.rebuild();
        true
    }

    fn get(&self, id: Id) -> Option<Point> {
        self.points.get(&id).copied()
    }

    fn len(&self) -> usize {
        self.points.len()
    }

    fn clear(&mut self) {
        self.points.clear();
        self.rebuild();
    }

    fn bounding_box(&self) -> Option<Rect> {
        self.bbox
    }

    fn set_crop(&mut self, crop: Option<Rect>) {
        self.crop = crop;
        self.base = crop_scope(self.crop, self.bbox);
    }

    fn scope(&self) -> Option<Rect> {
        self.base.map(|b| b.inflate(self.tolerance))
    }

    fn pos_occupied(&self, p: Point, except: Option<Id>) -> Option<Id> {
        self.nearest(p, except).map(|(id, _)| id)
    }

    /// All points within tolerance, nearest first.
    fn pos_occupied_set(&self, p: Point, except: Option<Id>) -> Vec<Id> {
        let mut hits = self.within(p, except);
        hits.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        hits.into_iter().map(|(id, _)| id).collect()
    }
}
