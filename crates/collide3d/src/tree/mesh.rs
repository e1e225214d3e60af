//! Mesh access for tree queries
//!
//! The tree never owns mesh data. Every query takes the mesh as a
//! [`CollisionMesh`] parameter, so the same tree can serve a mesh whose
//! vertices are deformed between queries (followed by
//! [`super::AabTree::update_bounding_boxes`]) or a mesh stored in an
//! engine-specific container.

use crate::foundation::math::Vec3;
use crate::geometry::Triangle;

/// Read access to an indexed triangle mesh.
///
/// Polygon indices used by the tree refer to positions in `polygons()`.
pub trait CollisionMesh {
    /// Shared vertex array
    fn vertices(&self) -> &[Vec3];

    /// Triangles as index triples into the vertex array
    fn polygons(&self) -> &[[u32; 3]];

    /// Surface type of one polygon, stamped into cast results on a hit
    fn poly_surface_type(&self, poly: usize) -> u8;

    /// Build the triangle (with its normal) for one polygon
    fn triangle(&self, poly: usize) -> Triangle {
        Triangle::from_mesh(self.vertices(), &self.polygons()[poly])
    }
}

/// Owning mesh for tests and standalone use
#[derive(Debug, Clone, Default)]
pub struct SimpleMesh {
    vertices: Vec<Vec3>,
    polygons: Vec<[u32; 3]>,
    surface_types: Vec<u8>,
}

impl SimpleMesh {
    /// Create a mesh with all surface types zero.
    ///
    /// Every index must be in range for the vertex array.
    pub fn new(vertices: Vec<Vec3>, polygons: Vec<[u32; 3]>) -> Self {
        debug_assert!(polygons
            .iter()
            .all(|p| p.iter().all(|&i| (i as usize) < vertices.len())));
        Self {
            vertices,
            polygons,
            surface_types: Vec::new(),
        }
    }

    /// Attach a per-polygon surface-type table (one entry per polygon)
    pub fn with_surface_types(mut self, surface_types: Vec<u8>) -> Self {
        debug_assert_eq!(surface_types.len(), self.polygons.len());
        self.surface_types = surface_types;
        self
    }

    /// Mutable vertex access for deformation.
    ///
    /// Call [`super::AabTree::update_bounding_boxes`] afterwards.
    pub fn vertices_mut(&mut self) -> &mut [Vec3] {
        &mut self.vertices
    }
}

impl CollisionMesh for SimpleMesh {
    fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    fn polygons(&self) -> &[[u32; 3]] {
        &self.polygons
    }

    fn poly_surface_type(&self, poly: usize) -> u8 {
        self.surface_types.get(poly).copied().unwrap_or(0)
    }
}
