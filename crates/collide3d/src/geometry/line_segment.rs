//! Bounded line segments for ray casting
//!
//! A segment is a start point plus a direction-times-length vector; every
//! cast result fraction is measured along that vector.

use crate::foundation::math::Vec3;

use super::aabox::MinMaxAABox;

/// Line segment from `p0` to `p0 + dp`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    /// Start point of the segment
    pub p0: Vec3,
    /// Direction times length; the endpoint is `p0 + dp`
    pub dp: Vec3,
}

impl LineSegment {
    /// Create a segment from a start point and delta vector
    pub fn new(p0: Vec3, dp: Vec3) -> Self {
        Self { p0, dp }
    }

    /// Create a segment from explicit endpoints
    pub fn from_endpoints(p0: Vec3, p1: Vec3) -> Self {
        Self { p0, dp: p1 - p0 }
    }

    /// End point of the segment
    pub fn p1(&self) -> Vec3 {
        self.p0 + self.dp
    }

    /// Point at fraction `t` along the segment
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.p0 + self.dp * t
    }

    /// Smallest axis-aligned box enclosing the segment
    pub fn bounds(&self) -> MinMaxAABox {
        let mut bounds = MinMaxAABox::new(self.p0, self.p0);
        bounds.add_point(self.p1());
        bounds
    }
}
