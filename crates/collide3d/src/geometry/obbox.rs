//! Oriented bounding boxes
//!
//! A rotated box: center, half-widths, and an orthonormal 3x3 basis whose
//! columns are the box's local axes expressed in world space.

use crate::foundation::math::{Mat3, Vec3};

use super::aabox::AABox;

/// Oriented box: center, extent, and an orthonormal rotation basis.
///
/// Invariant: basis columns are unit length and mutually orthogonal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OBBox {
    /// Center of the box in world space
    pub center: Vec3,
    /// Half-widths along each local basis axis (componentwise >= 0)
    pub extent: Vec3,
    /// Orthonormal basis; column i is local axis i in world space
    pub basis: Mat3,
}

impl OBBox {
    /// Create an oriented box from center, extent, and basis
    pub fn new(center: Vec3, extent: Vec3, basis: Mat3) -> Self {
        debug_assert!(extent.x >= 0.0 && extent.y >= 0.0 && extent.z >= 0.0);
        Self {
            center,
            extent,
            basis,
        }
    }

    /// Axis-aligned box viewed as an oriented box with the identity basis
    pub fn from_aabox(aabox: &AABox) -> Self {
        Self::new(aabox.center, aabox.extent, Mat3::identity())
    }

    /// Local basis axis `i` (0..3) in world space
    pub fn axis(&self, i: usize) -> Vec3 {
        debug_assert!(i < 3);
        self.basis.column(i).into()
    }

    /// Project the box onto an arbitrary world-space axis.
    ///
    /// Returns `(center, radius)`: the projection of the box center and
    /// the half-length of the projected interval.
    pub fn project_onto_axis(&self, axis: &Vec3) -> (f32, f32) {
        let c = self.center.dot(axis);
        let r = self.extent.x * self.axis(0).dot(axis).abs()
            + self.extent.y * self.axis(1).dot(axis).abs()
            + self.extent.z * self.axis(2).dot(axis).abs();
        (c, r)
    }

    /// Half-widths of the smallest axis-aligned box enclosing this box.
    ///
    /// The oriented extents projected onto the three world axes; used to
    /// build conservative sweep envelopes for tree culling.
    pub fn world_extent(&self) -> Vec3 {
        Vec3::new(
            self.project_onto_axis(&Vec3::x()).1,
            self.project_onto_axis(&Vec3::y()).1,
            self.project_onto_axis(&Vec3::z()).1,
        )
    }

    /// Smallest axis-aligned box enclosing this box
    pub fn world_bounds(&self) -> AABox {
        AABox::new(self.center, self.world_extent())
    }

    /// Transform a world-space point into the box's local frame
    pub fn world_to_local(&self, point: Vec3) -> Vec3 {
        self.basis.transpose() * (point - self.center)
    }

    /// Transform a local-frame point back to world space
    pub fn local_to_world(&self, point: Vec3) -> Vec3 {
        self.center + self.basis * point
    }

    /// Check if the box contains a world-space point (boundary inclusive)
    pub fn contains_point(&self, point: Vec3) -> bool {
        let local = self.world_to_local(point);
        local.x.abs() <= self.extent.x
            && local.y.abs() <= self.extent.y
            && local.z.abs() <= self.extent.z
    }

    /// Support point of the box in world space for a world-space direction.
    ///
    /// The corner of the box farthest along `dir`.
    pub fn support_point(&self, dir: &Vec3) -> Vec3 {
        let mut p = self.center;
        for i in 0..3 {
            let a = self.axis(i);
            let sign = if a.dot(dir) >= 0.0 { 1.0 } else { -1.0 };
            p += a * (sign * self.extent[i]);
        }
        p
    }
}
