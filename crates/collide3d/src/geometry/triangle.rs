//! Triangles with a cached unit normal
//!
//! The collision math relies on the normal being current: callers that
//! mutate vertices must call [`Triangle::compute_normal`] afterwards.

use crate::foundation::math::Vec3;

use super::aabox::MinMaxAABox;

/// A triangle with a precomputed unit normal.
///
/// Vertices are held by value; building one from a mesh copies three
/// `Vec3`s rather than borrowing into the mesh's vertex array.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// The three vertices, counter-clockwise around the normal
    pub v: [Vec3; 3],
    /// Unit normal; normalized cross product of the first two edges
    pub normal: Vec3,
}

impl Triangle {
    /// Create a triangle and compute its normal
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        let mut tri = Self {
            v: [v0, v1, v2],
            normal: Vec3::zeros(),
        };
        tri.compute_normal();
        tri
    }

    /// Build a triangle from a mesh's vertex and index arrays
    pub fn from_mesh(vertices: &[Vec3], indices: &[u32; 3]) -> Self {
        Self::new(
            vertices[indices[0] as usize],
            vertices[indices[1] as usize],
            vertices[indices[2] as usize],
        )
    }

    /// Recompute the cached normal from the current vertices.
    ///
    /// Degenerate triangles (zero-area) get a zero normal.
    pub fn compute_normal(&mut self) {
        let cross = (self.v[1] - self.v[0]).cross(&(self.v[2] - self.v[0]));
        let len = cross.magnitude();
        self.normal = if len > 0.0 { cross / len } else { Vec3::zeros() };
    }

    /// First edge, `v1 - v0`
    pub fn edge0(&self) -> Vec3 {
        self.v[1] - self.v[0]
    }

    /// Second independent edge, `v2 - v0`
    pub fn edge1(&self) -> Vec3 {
        self.v[2] - self.v[0]
    }

    /// Centroid of the triangle
    pub fn centroid(&self) -> Vec3 {
        (self.v[0] + self.v[1] + self.v[2]) / 3.0
    }

    /// Project the triangle onto an arbitrary axis.
    ///
    /// Returns `(min, max, argmin, argmax)`: the projected interval and
    /// the vertex indices that produced each bound. The supporting-vertex
    /// indices let swept tests reconstruct contact points afterwards.
    pub fn project_onto_axis(&self, axis: &Vec3) -> (f32, f32, usize, usize) {
        let mut min = self.v[0].dot(axis);
        let mut max = min;
        let (mut argmin, mut argmax) = (0, 0);
        for i in 1..3 {
            let d = self.v[i].dot(axis);
            if d < min {
                min = d;
                argmin = i;
            }
            if d > max {
                max = d;
                argmax = i;
            }
        }
        (min, max, argmin, argmax)
    }

    /// Smallest axis-aligned box enclosing the triangle
    pub fn bounds(&self) -> MinMaxAABox {
        MinMaxAABox::from_points(&self.v)
    }
}
