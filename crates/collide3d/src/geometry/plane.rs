//! Planes: axis-aligned and general
//!
//! An axis-aligned plane is `(axis, distance)`; a general plane is
//! `(unit normal, distance)`. Both are immutable value types.

use crate::foundation::math::Vec3;

/// One of the three world axes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// World x axis
    X,
    /// World y axis
    Y,
    /// World z axis
    Z,
}

impl Axis {
    /// Component index of this axis (x=0, y=1, z=2)
    pub fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    /// Unit vector along this axis
    pub fn unit_vector(self) -> Vec3 {
        match self {
            Self::X => Vec3::x(),
            Self::Y => Vec3::y(),
            Self::Z => Vec3::z(),
        }
    }

    /// Axis for a component index (x=0, y=1, z=2)
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Self::X,
            1 => Self::Y,
            2 => Self::Z,
            _ => unreachable!("axis index out of range"),
        }
    }
}

/// Axis-aligned plane: all points with `point[axis] == dist`.
///
/// The positive side is the side the axis points toward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AAPlane {
    /// World axis the plane is perpendicular to
    pub axis: Axis,
    /// Distance of the plane along that axis
    pub dist: f32,
}

impl AAPlane {
    /// Create an axis-aligned plane
    pub fn new(axis: Axis, dist: f32) -> Self {
        Self { axis, dist }
    }

    /// Signed distance from the plane to a point (positive side = +axis)
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        point[self.axis.index()] - self.dist
    }
}

/// General plane: unit normal and distance from the origin.
///
/// Points `p` on the plane satisfy `dot(normal, p) == dist`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Unit normal of the plane
    pub normal: Vec3,
    /// Distance from the origin along the normal
    pub dist: f32,
}

impl Plane {
    /// Create a plane from a unit normal and distance
    pub fn new(normal: Vec3, dist: f32) -> Self {
        Self { normal, dist }
    }

    /// Plane through `point` with the given unit normal
    pub fn from_point_normal(point: Vec3, normal: Vec3) -> Self {
        Self {
            normal,
            dist: normal.dot(&point),
        }
    }

    /// Plane through three counter-clockwise points
    pub fn from_points(p0: Vec3, p1: Vec3, p2: Vec3) -> Self {
        let normal = (p1 - p0).cross(&(p2 - p0)).normalize();
        Self::from_point_normal(p0, normal)
    }

    /// Signed distance from the plane to a point (positive = normal side)
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(&point) - self.dist
    }

    /// Normalize in place so the normal is unit length.
    ///
    /// Needed after extracting plane coefficients from a matrix.
    pub fn normalize(&mut self) {
        let len = self.normal.magnitude();
        if len > 0.0 {
            self.normal /= len;
            self.dist /= len;
        }
    }
}

impl From<AAPlane> for Plane {
    fn from(p: AAPlane) -> Self {
        Self::new(p.axis.unit_vector(), p.dist)
    }
}
