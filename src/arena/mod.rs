//! Spatial arenas: identifier → region indexes used for hit-testing.
//!
//! DESIGN
//! ======
//! Two variants share the [`Arena`] contract:
//! - [`RectArena`]: regions are rects, no two live rects may overlap.
//! - [`PointArena`]: regions are points, no two live points may coincide;
//!   queries match the nearest point within a tolerance radius.
//!
//! Both keep the bounding box of all live regions and an optional crop rect
//! (usually the visible viewport). Queries only consider the scope, the
//! intersection of crop and bounding box, which keeps scans limited to what
//! is on screen.
//!
//! TRADE-OFFS
//! ==========
//! Every query is a linear scan over a `BTreeMap` (deterministic id order).
//! That is the contract for the object counts a diagram holds; there is no
//! R-tree or grid behind it.
//!
//! Rejected mutations (duplicate id, overlap, coincidence, unknown id) return
//! `false` and log a warning. Query kinds a variant cannot answer return
//! [`ArenaError::Unsupported`] instead of an empty result.

pub mod point;
pub mod rect;

pub use point::PointArena;
pub use rect::RectArena;

use crate::geom::{Point, Rect};
use crate::id::Id;

/// Query kind a given arena variant does not implement.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArenaError {
    #[error("{op} is not implemented for {arena}")]
    Unsupported { arena: &'static str, op: &'static str },
}

/// Shared contract of every spatial arena.
pub trait Arena {
    /// Region stored per id (`Rect` or `Point`).
    type Region: Copy;

    /// Variant name used in diagnostics.
    const KIND: &'static str;

    /// Insert a new entry. Rejects duplicate ids and overlapping/coincident regions.
    fn add_object(&mut self, id: Id, region: Self::Region) -> bool;

    /// Move an existing entry. Rejects unknown ids and overlapping/coincident regions.
    fn set_object(&mut self, id: Id, region: Self::Region) -> bool;

    /// Remove an entry. Returns `false` for unknown ids.
    fn del_object(&mut self, id: Id) -> bool;

    fn get(&self, id: Id) -> Option<Self::Region>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn clear(&mut self);

    /// Union of all live regions.
    fn bounding_box(&self) -> Option<Rect>;

    /// Restrict queries to `crop` ∩ bounding box. `None` lifts the restriction.
    fn set_crop(&mut self, crop: Option<Rect>);

    /// Current query scope, `None` when nothing can match.
    fn scope(&self) -> Option<Rect>;

    /// First entry occupying `p`, ignoring `except`.
    fn pos_occupied(&self, p: Point, except: Option<Id>) -> Option<Id>;

    /// Every entry occupying `p`, ignoring `except`.
    fn pos_occupied_set(&self, p: Point, except: Option<Id>) -> Vec<Id>;

    /// First entry crossed by segment `a`-`b`.
    ///
    /// # Errors
    ///
    /// [`ArenaError::Unsupported`] unless the variant implements segment queries.
    fn line_occupied(&self, _a: Point, _b: Point, _except: Option<Id>) -> Result<Option<Id>, ArenaError> {
        Err(ArenaError::Unsupported { arena: Self::KIND, op: "line_occupied" })
    }

    /// Every entry crossed by segment `a`-`b`.
    ///
    /// # Errors
    ///
    /// [`ArenaError::Unsupported`] unless the variant implements segment queries.
    fn line_occupied_set(&self, _a: Point, _b: Point, _except: Option<Id>) -> Result<Vec<Id>, ArenaError> {
        Err(ArenaError::Unsupported { arena: Self::KIND, op: "line_occupied_set" })
    }

    /// First entry meeting `rect`. With `fill` the entry must overlap the rect's
    /// area; without it the entry must meet the rect's outline.
    ///
    /// # Errors
    ///
    /// [`ArenaError::Unsupported`] unless the variant implements rect queries.
    fn rect_occupied(&self, _rect: Rect, _fill: bool, _except: Option<Id>) -> Result<Option<Id>, ArenaError> {
        Err(ArenaError::Unsupported { arena: Self::KIND, op: "rect_occupied" })
    }

    /// Every entry meeting `rect`; see [`Arena::rect_occupied`].
    ///
    /// # Errors
    ///
    /// [`ArenaError::Unsupported`] unless the variant implements rect queries.
    fn rect_occupied_set(&self, _rect: Rect, _fill: bool, _except: Option<Id>) -> Result<Vec<Id>, ArenaError> {
        Err(ArenaError::Unsupported { arena: Self::KIND, op: "rect_occupied_set" })
    }
}

/// `crop` ∩ `bbox`, or `bbox` alone when there is no crop.
fn crop_scope(crop: Option<Rect>, bbox: Option<Rect>) -> Option<Rect> {
    match (crop, bbox) {
        (Some(c), Some(b)) => c.intersection(&b),
        (None, b) => b,
        (Some(_), None) => None,
    }
}
