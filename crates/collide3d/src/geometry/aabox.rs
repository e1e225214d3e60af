//! Axis-aligned boxes in center/extent and min/max corner form
//!
//! The two representations are freely convertible. `AABox` (center +
//! half-widths) is the form the collision math projects onto axes;
//! `MinMaxAABox` is the form the tree stores and unions incrementally.

use crate::foundation::math::Vec3;

use super::line_segment::LineSegment;
use super::obbox::OBBox;

/// Axis-aligned box stored as center + extent (half-widths).
///
/// Invariant: all `extent` components are >= 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABox {
    /// Center of the box in world space
    pub center: Vec3,
    /// Half-widths along each world axis (componentwise >= 0)
    pub extent: Vec3,
}

impl AABox {
    /// Create a box from its center and half-widths
    pub fn new(center: Vec3, extent: Vec3) -> Self {
        debug_assert!(extent.x >= 0.0 && extent.y >= 0.0 && extent.z >= 0.0);
        Self { center, extent }
    }

    /// Create a box from explicit min/max corners
    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        Self {
            center: (min + max) * 0.5,
            extent: (max - min) * 0.5,
        }
    }

    /// Smallest box enclosing a set of points
    ///
    /// Returns a degenerate box at the origin for an empty slice.
    pub fn from_points(points: &[Vec3]) -> Self {
        let Some(first) = points.first() else {
            return Self::new(Vec3::zeros(), Vec3::zeros());
        };
        let mut bounds = MinMaxAABox::new(*first, *first);
        for p in &points[1..] {
            bounds.add_point(*p);
        }
        bounds.to_aabox()
    }

    /// Smallest box enclosing both endpoints of a line segment
    pub fn from_segment(segment: &LineSegment) -> Self {
        let mut bounds = MinMaxAABox::new(segment.p0, segment.p0);
        bounds.add_point(segment.p1());
        bounds.to_aabox()
    }

    /// Minimum corner of the box
    pub fn min(&self) -> Vec3 {
        self.center - self.extent
    }

    /// Maximum corner of the box
    pub fn max(&self) -> Vec3 {
        self.center + self.extent
    }

    /// Grow the box so it encloses `point`
    pub fn add_point(&mut self, point: Vec3) {
        let mut bounds = self.to_min_max();
        bounds.add_point(point);
        *self = bounds.to_aabox();
    }

    /// Grow the box so it encloses `other`
    pub fn add_box(&mut self, other: &Self) {
        let mut bounds = self.to_min_max();
        bounds.add_box(&other.to_min_max());
        *self = bounds.to_aabox();
    }

    /// Check if the box contains a point (boundary inclusive)
    pub fn contains_point(&self, point: Vec3) -> bool {
        let d = point - self.center;
        d.x.abs() <= self.extent.x && d.y.abs() <= self.extent.y && d.z.abs() <= self.extent.z
    }

    /// Project the box onto an arbitrary axis.
    ///
    /// Returns `(center, radius)`: the projection of the box center and
    /// the half-length of the projected interval.
    pub fn project_onto_axis(&self, axis: &Vec3) -> (f32, f32) {
        let c = self.center.dot(axis);
        let r = self.extent.x * axis.x.abs()
            + self.extent.y * axis.y.abs()
            + self.extent.z * axis.z.abs();
        (c, r)
    }

    /// Volume of the box
    pub fn volume(&self) -> f32 {
        8.0 * self.extent.x * self.extent.y * self.extent.z
    }

    /// Translate the box
    pub fn translate(&self, delta: Vec3) -> Self {
        Self::new(self.center + delta, self.extent)
    }

    /// Convert to explicit min/max corner form
    pub fn to_min_max(&self) -> MinMaxAABox {
        MinMaxAABox::new(self.min(), self.max())
    }

    /// View this box as an oriented box with the identity basis
    pub fn to_obbox(&self) -> OBBox {
        OBBox::from_aabox(self)
    }
}

/// Axis-aligned box stored as explicit min/max corners
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinMaxAABox {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl MinMaxAABox {
    /// Create a box from min and max corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// An "empty" box: min at +inf, max at -inf, absorbed by the first
    /// `add_point`/`add_box`
    pub fn empty() -> Self {
        Self {
            min: Vec3::repeat(f32::MAX),
            max: Vec3::repeat(f32::MIN),
        }
    }

    /// Smallest box enclosing a set of points
    pub fn from_points(points: &[Vec3]) -> Self {
        let mut bounds = Self::empty();
        for p in points {
            bounds.add_point(*p);
        }
        bounds
    }

    /// Center of the box
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Half-widths of the box
    pub fn extent(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Volume of the box (zero for an empty box)
    pub fn volume(&self) -> f32 {
        let d = self.max - self.min;
        if d.x <= 0.0 || d.y <= 0.0 || d.z <= 0.0 {
            return 0.0;
        }
        d.x * d.y * d.z
    }

    /// Grow the box so it encloses `point`
    pub fn add_point(&mut self, point: Vec3) {
        self.min = self.min.inf(&point);
        self.max = self.max.sup(&point);
    }

    /// Grow the box so it encloses `other`
    pub fn add_box(&mut self, other: &Self) {
        self.min = self.min.inf(&other.min);
        self.max = self.max.sup(&other.max);
    }

    /// Check if the box contains a point (boundary inclusive)
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Check per-axis interval overlap with another box
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Convert to center/extent form
    pub fn to_aabox(&self) -> AABox {
        AABox::from_min_max(self.min, self.max)
    }
}
