//! View frustums for visibility culling
//!
//! Six inward-facing planes extracted from a view-projection matrix using
//! the Gribb-Hartmann method.

use crate::foundation::math::{Mat4, Vec3};

use super::aabox::AABox;
use super::plane::Plane;

/// Frustum defined by six inward-facing planes
/// (left, right, bottom, top, near, far)
#[derive(Debug, Clone, PartialEq)]
pub struct Frustum {
    /// The six planes; points inside the frustum are on the positive side
    /// of every plane
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Create a frustum from six inward-facing planes
    pub fn new(planes: [Plane; 6]) -> Self {
        Self { planes }
    }

    /// Extract frustum planes from a view-projection matrix.
    ///
    /// Gribb-Hartmann extraction: each plane is a sum or difference of the
    /// fourth row of the matrix with one of the other rows. Assumes a
    /// depth range of [0, 1] for the near plane.
    pub fn from_matrix(vp: &Mat4) -> Self {
        let row = |i: usize| Vec3::new(vp[(i, 0)], vp[(i, 1)], vp[(i, 2)]);
        let w = |i: usize| vp[(i, 3)];

        // normal dot p + d >= 0 inside; stored as dot(normal, p) >= dist.
        let make = |n: Vec3, d: f32| {
            let mut plane = Plane::new(n, -d);
            plane.normalize();
            plane
        };

        let planes = [
            make(row(3) + row(0), w(3) + w(0)), // left
            make(row(3) - row(0), w(3) - w(0)), // right
            make(row(3) + row(1), w(3) + w(1)), // bottom
            make(row(3) - row(1), w(3) - w(1)), // top
            make(row(2), w(2)),                 // near (z >= 0)
            make(row(3) - row(2), w(3) - w(2)), // far
        ];
        Self { planes }
    }

    /// Check if a point is inside the frustum (boundary inclusive)
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.signed_distance(point) >= 0.0)
    }

    /// Conservative frustum/box rejection test.
    ///
    /// Returns false only when the box is provably outside one plane; a
    /// true result may still be a near-miss at frustum corners.
    pub fn intersects_aabox(&self, aabox: &AABox) -> bool {
        for plane in &self.planes {
            // Distance from the plane to the box corner farthest inside.
            let r = aabox.extent.x * plane.normal.x.abs()
                + aabox.extent.y * plane.normal.y.abs()
                + aabox.extent.z * plane.normal.z.abs();
            if plane.signed_distance(aabox.center) < -r {
                return false;
            }
        }
        true
    }
}
