//! Geometric value types: points, vectors, sizes, rects and scalar bounds.
//!
//! Every type here is a plain `Copy` value. Equality is exact coordinate
//! equality, and hashing is derived from the coordinate bit patterns (with
//! `-0.0` folded onto `0.0`) so equal values always hash equally and can key a
//! `HashMap`.
//!
//! `Rect` keeps `width`/`height` non-negative: every constructor and setter
//! normalizes a negative extent by moving the origin, so the corner accessors
//! always agree with `pos` + `size`.

#[cfg(test)]
#[path = "geom_test.rs"]
mod geom_test;

use std::hash::{Hash, Hasher};
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// Error raised when a geometric invariant is violated at construction time.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeomError {
    /// A [`Bound`] was built with `min > max` (or a NaN limit).
    #[error("inverted bound: min {min} is greater than max {max}")]
    InvertedBound { min: f64, max: f64 },
}

fn hash_coord<H: Hasher>(v: f64, state: &mut H) {
    // -0.0 == 0.0, so they must share a hash.
    let v = if v == 0.0 { 0.0 } else { v };
    v.to_bits().hash(state);
}

// =============================================================
// Point
// =============================================================

/// A position in either logical or pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Eq for Point {}

impl Hash for Point {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_coord(self.x, state);
        hash_coord(self.y, state);
    }
}

impl Point {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (other - self).length()
    }

    /// Linear interpolation towards `other`; `t = 0` is `self`, `t = 1` is `other`.
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self::new(self.x + (other.x - self.x) * t, self.y + (other.y - self.y) * t)
    }

    /// The vector from the origin to this point.
    #[must_use]
    pub const fn to_vector(self) -> Vector {
        Vector::new(self.x, self.y)
    }
}

impl Add<Vector> for Point {
    type Output = Self;
    fn add(self, v: Vector) -> Self {
        Self::new(self.x + v.x, self.y + v.y)
    }
}

impl AddAssign<Vector> for Point {
    fn add_assign(&mut self, v: Vector) {
        self.x += v.x;
        self.y += v.y;
    }
}

impl Sub<Vector> for Point {
    type Output = Self;
    fn sub(self, v: Vector) -> Self {
        Self::new(self.x - v.x, self.y - v.y)
    }
}

impl SubAssign<Vector> for Point {
    fn sub_assign(&mut self, v: Vector) {
        self.x -= v.x;
        self.y -= v.y;
    }
}

impl Sub for Point {
    type Output = Vector;
    fn sub(self, other: Self) -> Vector {
        Vector::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<f64> for Point {
    type Output = Self;
    fn mul(self, k: f64) -> Self {
        Self::new(self.x * k, self.y * k)
    }
}

impl Div<f64> for Point {
    type Output = Self;
    fn div(self, k: f64) -> Self {
        Self::new(self.x / k, self.y / k)
    }
}

// =============================================================
// Vector
// =============================================================

/// A displacement (pan offset, drag delta, per-frame slide).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
}

impl Eq for Vector {}

impl Hash for Vector {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_coord(self.x, state);
        hash_coord(self.y, state);
    }
}

impl Vector {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Unit vector in the same direction; the zero vector stays zero.
    #[must_use]
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len == 0.0 { Self::ZERO } else { self / len }
    }

    #[must_use]
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

impl Add for Vector {
    type Output = Self;
    fn add(self, v: Self) -> Self {
        Self::new(self.x + v.x, self.y + v.y)
    }
}

impl AddAssign for Vector {
    fn add_assign(&mut self, v: Self) {
        self.x += v.x;
        self.y += v.y;
    }
}

impl Sub for Vector {
    type Output = Self;
    fn sub(self, v: Self) -> Self {
        Self::new(self.x - v.x, self.y - v.y)
    }
}

impl Neg for Vector {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl Mul<f64> for Vector {
    type Output = Self;
    fn mul(self, k: f64) -> Self {
        Self::new(self.x * k, self.y * k)
    }
}

impl Div<f64> for Vector {
    type Output = Self;
    fn div(self, k: f64) -> Self {
        Self::new(self.x / k, self.y / k)
    }
}

// =============================================================
// Size
// =============================================================

/// Non-negative extent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Eq for Size {}

impl Hash for Size {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_coord(self.width, state);
        hash_coord(self.height, state);
    }
}

impl Size {
    pub const ZERO: Self = Self { width: 0.0, height: 0.0 };

    /// Build a size; negative extents are taken by magnitude.
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width: width.abs(), height: height.abs() }
    }

    #[must_use]
    pub fn area(self) -> f64 {
        self.width * self.height
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

// =============================================================
// Rect
// =============================================================

/// Axis-aligned rectangle stored as top-left `pos` plus `size`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "RawRect")]
pub struct Rect {
    pos: Point,
    size: Size,
}

/// Wire form of [`Rect`]; decoded through [`Rect::new`] so extents stay non-negative.
#[derive(Deserialize)]
struct RawRect {
    pos: Point,
    size: Size,
}

impl From<RawRect> for Rect {
    fn from(raw: RawRect) -> Self {
        Self::new(raw.pos.x, raw.pos.y, raw.size.width, raw.size.height)
    }
}

impl Eq for Rect {}

impl Hash for Rect {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pos.hash(state);
        self.size.hash(state);
    }
}

impl Rect {
    /// Build a rect from an origin and a possibly negative extent.
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        let (x, width) = if width < 0.0 { (x + width, -width) } else { (x, width) };
        let (y, height) = if height < 0.0 { (y + height, -height) } else { (y, height) };
        Self { pos: Point::new(x, y), size: Size { width, height } }
    }

    #[must_use]
    pub fn from_pos_size(pos: Point, size: Size) -> Self {
        Self::new(pos.x, pos.y, size.width, size.height)
    }

    /// Smallest rect with both points on its boundary.
    #[must_use]
    pub fn from_points(a: Point, b: Point) -> Self {
        Self::new(a.x, a.y, b.x - a.x, b.y - a.y)
    }

    /// Square of side `2 * radius` centred on `center`.
    #[must_use]
    pub fn around(center: Point, radius: f64) -> Self {
        let r = radius.abs();
        Self::new(center.x - r, center.y - r, r * 2.0, r * 2.0)
    }

    #[must_use]
    pub fn pos(&self) -> Point {
        self.pos
    }

    #[must_use]
    pub fn size(&self) -> Size {
        self.size
    }

    pub fn set_pos(&mut self, pos: Point) {
        self.pos = pos;
    }

    /// Replace the extent, keeping `pos` unless the new extent is negative.
    pub fn set_size(&mut self, width: f64, height: f64) {
        *self = Self::new(self.pos.x, self.pos.y, width, height);
    }

    #[must_use]
    pub fn left(&self) -> f64 {
        self.pos.x
    }

    #[must_use]
    pub fn top(&self) -> f64 {
        self.pos.y
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.pos.x + self.size.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.pos.y + self.size.height
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.size.width
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.size.height
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.pos.x + self.size.width / 2.0, self.pos.y + self.size.height / 2.0)
    }

    /// Corners clockwise from the top-left.
    #[must_use]
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.left(), self.top()),
            Point::new(self.right(), self.top()),
            Point::new(self.right(), self.bottom()),
            Point::new(self.left(), self.bottom()),
        ]
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size.is_empty()
    }

    #[must_use]
    pub fn translate(&self, v: Vector) -> Self {
        Self { pos: self.pos + v, size: self.size }
    }

    /// Grow every edge outward by `pad`; a negative `pad` shrinks, collapsing at the center.
    #[must_use]
    pub fn inflate(&self, pad: f64) -> Self {
        let w = (self.size.width + pad * 2.0).max(0.0);
        let h = (self.size.height + pad * 2.0).max(0.0);
        let c = self.center();
        Self::new(c.x - w / 2.0, c.y - h / 2.0, w, h)
    }

    /// Scale the rect about `anchor`, which stays fixed.
    #[must_use]
    pub fn scale_about(&self, anchor: Point, factor: f64) -> Self {
        let tl = anchor + (self.pos - anchor) * factor;
        Self::new(tl.x, tl.y, self.size.width * factor, self.size.height * factor)
    }

    /// Closed containment: points on the boundary are inside.
    #[must_use]
    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }

    /// Open containment: points on the boundary are outside.
    #[must_use]
    pub fn contains_point_strict(&self, p: Point) -> bool {
        p.x > self.left() && p.x < self.right() && p.y > self.top() && p.y < self.bottom()
    }

    /// Closed containment of a whole rect.
    #[must_use]
    pub fn contains_rect(&self, other: &Self) -> bool {
        other.left() >= self.left()
            && other.right() <= self.right()
            && other.top() >= self.top()
            && other.bottom() <= self.bottom()
    }

    /// Area overlap. Rects that only share an edge or corner do not intersect.
    #[must_use]
    pub fn intersects_rect(&self, other: &Self) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    /// Closed intersection: shared edges and corners count.
    #[must_use]
    pub fn touches(&self, other: &Self) -> bool {
        self.left() <= other.right()
            && other.left() <= self.right()
            && self.top() <= other.bottom()
            && other.top() <= self.bottom()
    }

    /// Closed intersection region, possibly zero-sized when the rects only touch.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        if !self.touches(other) {
            return None;
        }
        let left = self.left().max(other.left());
        let top = self.top().max(other.top());
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        Some(Self::new(left, top, right - left, bottom - top))
    }

    /// Smallest rect containing both.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let left = self.left().min(other.left());
        let top = self.top().min(other.top());
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Self::new(left, top, right - left, bottom - top)
    }

    /// Whether the closed segment `a`-`b` meets this rect (Liang–Barsky clip).
    #[must_use]
    pub fn intersects_segment(&self, a: Point, b: Point) -> bool {
        let d = b - a;
        let mut t0 = 0.0_f64;
        let mut t1 = 1.0_f64;
        let checks = [
            (-d.x, a.x - self.left()),
            (d.x, self.right() - a.x),
            (-d.y, a.y - self.top()),
            (d.y, self.bottom() - a.y),
        ];
        for (p, q) in checks {
            if p == 0.0 {
                if q < 0.0 {
                    return false;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                if r > t1 {
                    return false;
                }
                t0 = t0.max(r);
            } else {
                if r < t0 {
                    return false;
                }
                t1 = t1.min(r);
            }
        }
        t0 <= t1
    }
}

// =============================================================
// Bound
// =============================================================

/// Closed scalar interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBound")]
pub struct Bound {
    min: f64,
    max: f64,
}

#[derive(Deserialize)]
struct RawBound {
    min: f64,
    max: f64,
}

impl TryFrom<RawBound> for Bound {
    type Error = GeomError;

    fn try_from(raw: RawBound) -> Result<Self, Self::Error> {
        Self::new(raw.min, raw.max)
    }
}

impl Bound {
    /// # Errors
    ///
    /// Returns [`GeomError::InvertedBound`] when `min > max` or either limit is NaN.
    pub fn new(min: f64, max: f64) -> Result<Self, GeomError> {
        if min.is_nan() || max.is_nan() || min > max {
            tracing::error!(min, max, "geom: inverted bound");
            return Err(GeomError::InvertedBound { min, max });
        }
        Ok(Self { min, max })
    }

    #[must_use]
    pub fn min(&self) -> f64 {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> f64 {
        self.max
    }

    #[must_use]
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    #[must_use]
    pub fn contains(&self, v: f64) -> bool {
        v >= self.min && v <= self.max
    }

    #[must_use]
    pub fn clamp(&self, v: f64) -> f64 {
        v.clamp(self.min, self.max)
    }
}
