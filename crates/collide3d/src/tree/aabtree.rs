//! The tree itself and its queries
//!
//! A static bounding-volume hierarchy over mesh polygons: a flat preorder
//! node arena plus a shared polygon-index array. All queries are recursive
//! descents with a per-node cull against the query's conservative sweep
//! bounds; leaves run the exact collision math from [`crate::collision`]
//! against the mesh's triangles. Queries never mutate the tree, so a built
//! tree is freely shared.

use crate::collision::cast::{AABoxCast, CastResult, OBBoxCast, RayCast};
use crate::collision::ray::{
    cast_ray_triangle, cast_semi_infinite_ray_triangle, AxisDir, RaycastFlags,
};
use crate::collision::{intersect, sweep};
use crate::foundation::math::{other_axes, Vec3};
use crate::geometry::{MinMaxAABox, OBBox};

use super::mesh::CollisionMesh;
use super::node::{Node, NodeKind};

/// Static bounding-volume hierarchy over an indexed triangle mesh.
///
/// Built by [`super::AabTreeBuilder`] or loaded via [`super::io`]. The
/// tree stores only bounds and polygon indices; the mesh is passed to each
/// query so the tree can outlive (or be rebound to) its mesh data.
#[derive(Debug, Clone)]
pub struct AabTree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) poly_indices: Vec<u32>,
}

impl AabTree {
    pub(crate) fn from_parts(nodes: Vec<Node>, poly_indices: Vec<u32>) -> Self {
        Self { nodes, poly_indices }
    }

    /// All nodes in preorder
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// The shared polygon-index array the leaves point into
    pub fn poly_indices(&self) -> &[u32] {
        &self.poly_indices
    }

    /// Polygon indices of one leaf node
    fn leaf_polys(&self, first_poly: u32, poly_count: u32) -> &[u32] {
        let first = first_poly as usize;
        &self.poly_indices[first..first + poly_count as usize]
    }

    /// Cast a bounded ray through the tree.
    ///
    /// Accumulates the closest triangle hit into `raycast.result`, stamps
    /// the hit polygon's surface type, and ORs per-triangle flag bits into
    /// `raycast.flags`. Returns whether anything was hit.
    pub fn cast_ray(&self, mesh: &impl CollisionMesh, raycast: &mut RayCast) -> bool {
        if self.nodes.is_empty() {
            return false;
        }
        self.cast_ray_node(mesh, raycast, 0)
    }

    fn cast_ray_node(&self, mesh: &impl CollisionMesh, raycast: &mut RayCast, idx: usize) -> bool {
        let node = &self.nodes[idx];
        if raycast.cull(&node.min, &node.max) {
            return false;
        }
        match node.kind {
            NodeKind::Internal { front, back } => {
                // Both children unconditionally: the closest hit can live
                // in either subtree.
                let hit_front = self.cast_ray_node(mesh, raycast, front as usize);
                let hit_back = self.cast_ray_node(mesh, raycast, back as usize);
                hit_front || hit_back
            }
            NodeKind::Leaf {
                first_poly,
                poly_count,
            } => {
                let mut hit = false;
                for &poly in self.leaf_polys(first_poly, poly_count) {
                    let tri = mesh.triangle(poly as usize);
                    let flags = cast_ray_triangle(&raycast.segment, &tri, &mut raycast.result);
                    if flags.contains(RaycastFlags::HIT) {
                        raycast.flags |= flags;
                        raycast.result.surface_type = mesh.poly_surface_type(poly as usize);
                        hit = true;
                    }
                }
                hit
            }
        }
    }

    /// Sweep an axis-aligned box through the tree.
    ///
    /// `start_bad` at any leaf aborts the rest of the descent; the whole
    /// motion is already invalid and no later fraction can matter.
    pub fn cast_aabox(&self, mesh: &impl CollisionMesh, boxcast: &mut AABoxCast) -> bool {
        if self.nodes.is_empty() {
            return false;
        }
        self.cast_aabox_node(mesh, boxcast, 0)
    }

    fn cast_aabox_node(
        &self,
        mesh: &impl CollisionMesh,
        boxcast: &mut AABoxCast,
        idx: usize,
    ) -> bool {
        let node = &self.nodes[idx];
        if boxcast.cull(&node.min, &node.max) {
            return false;
        }
        match node.kind {
            NodeKind::Internal { front, back } => {
                let hit_front = self.cast_aabox_node(mesh, boxcast, front as usize);
                if boxcast.result.start_bad {
                    return true;
                }
                let hit_back = self.cast_aabox_node(mesh, boxcast, back as usize);
                hit_front || hit_back
            }
            NodeKind::Leaf {
                first_poly,
                poly_count,
            } => {
                let mut hit = false;
                for &poly in self.leaf_polys(first_poly, poly_count) {
                    let tri = mesh.triangle(poly as usize);
                    if sweep::collide_aabox_triangle(
                        &boxcast.aabox,
                        &boxcast.motion,
                        &tri,
                        &Vec3::zeros(),
                        &mut boxcast.result,
                    ) {
                        boxcast.result.surface_type = mesh.poly_surface_type(poly as usize);
                        hit = true;
                        if boxcast.result.start_bad {
                            return true;
                        }
                    }
                }
                hit
            }
        }
    }

    /// Sweep an oriented box through the tree
    pub fn cast_obbox(&self, mesh: &impl CollisionMesh, boxcast: &mut OBBoxCast) -> bool {
        if self.nodes.is_empty() {
            return false;
        }
        self.cast_obbox_node(mesh, boxcast, 0)
    }

    fn cast_obbox_node(
        &self,
        mesh: &impl CollisionMesh,
        boxcast: &mut OBBoxCast,
        idx: usize,
    ) -> bool {
        let node = &self.nodes[idx];
        if boxcast.cull(&node.min, &node.max) {
            return false;
        }
        match node.kind {
            NodeKind::Internal { front, back } => {
                let hit_front = self.cast_obbox_node(mesh, boxcast, front as usize);
                if boxcast.result.start_bad {
                    return true;
                }
                let hit_back = self.cast_obbox_node(mesh, boxcast, back as usize);
                hit_front || hit_back
            }
            NodeKind::Leaf {
                first_poly,
                poly_count,
            } => {
                let mut hit = false;
                for &poly in self.leaf_polys(first_poly, poly_count) {
                    let tri = mesh.triangle(poly as usize);
                    if sweep::collide_obbox_triangle(
                        &boxcast.obbox,
                        &boxcast.motion,
                        &tri,
                        &Vec3::zeros(),
                        &mut boxcast.result,
                    ) {
                        boxcast.result.surface_type = mesh.poly_surface_type(poly as usize);
                        hit = true;
                        if boxcast.result.start_bad {
                            return true;
                        }
                    }
                }
                hit
            }
        }
    }

    /// Discrete test: does the oriented box touch any mesh polygon.
    ///
    /// Returns on the first intersecting polygon.
    pub fn intersect_obbox(&self, mesh: &impl CollisionMesh, obb: &OBBox) -> bool {
        if self.nodes.is_empty() {
            return false;
        }
        let envelope = obb.world_bounds().to_min_max();
        self.intersect_obbox_node(mesh, obb, &envelope, 0)
    }

    fn intersect_obbox_node(
        &self,
        mesh: &impl CollisionMesh,
        obb: &OBBox,
        envelope: &MinMaxAABox,
        idx: usize,
    ) -> bool {
        let node = &self.nodes[idx];
        if !envelope.intersects(&node.bounds()) {
            return false;
        }
        match node.kind {
            NodeKind::Internal { front, back } => {
                self.intersect_obbox_node(mesh, obb, envelope, front as usize)
                    || self.intersect_obbox_node(mesh, obb, envelope, back as usize)
            }
            NodeKind::Leaf {
                first_poly,
                poly_count,
            } => self
                .leaf_polys(first_poly, poly_count)
                .iter()
                .any(|&poly| intersect::obbox_triangle(obb, &mesh.triangle(poly as usize))),
        }
    }

    /// Collect the polygons an oriented box touches (active polygon table).
    ///
    /// Appends each touching polygon index once (straddling polygons are
    /// stored in more than one leaf, so the collected set is deduplicated).
    /// With `view_dir` set, polygons facing away from the viewer
    /// (`dot(normal, view_dir) >= 0`) are filtered out.
    pub fn generate_apt(
        &self,
        mesh: &impl CollisionMesh,
        obb: &OBBox,
        view_dir: Option<&Vec3>,
        out: &mut Vec<u32>,
    ) {
        if self.nodes.is_empty() {
            return;
        }
        let start = out.len();
        let envelope = obb.world_bounds().to_min_max();
        self.generate_apt_node(mesh, obb, view_dir, &envelope, 0, out);
        let appended = &mut out[start..];
        appended.sort_unstable();
        let dedup_len = {
            let mut keep = start;
            for i in start..out.len() {
                if i == start || out[i] != out[i - 1] {
                    out[keep] = out[i];
                    keep += 1;
                }
            }
            keep
        };
        out.truncate(dedup_len);
    }

    fn generate_apt_node(
        &self,
        mesh: &impl CollisionMesh,
        obb: &OBBox,
        view_dir: Option<&Vec3>,
        envelope: &MinMaxAABox,
        idx: usize,
        out: &mut Vec<u32>,
    ) {
        let node = &self.nodes[idx];
        if !envelope.intersects(&node.bounds()) {
            return;
        }
        match node.kind {
            NodeKind::Internal { front, back } => {
                self.generate_apt_node(mesh, obb, view_dir, envelope, front as usize, out);
                self.generate_apt_node(mesh, obb, view_dir, envelope, back as usize, out);
            }
            NodeKind::Leaf {
                first_poly,
                poly_count,
            } => {
                for &poly in self.leaf_polys(first_poly, poly_count) {
                    let tri = mesh.triangle(poly as usize);
                    if let Some(dir) = view_dir {
                        if tri.normal.dot(dir) >= 0.0 {
                            continue;
                        }
                    }
                    if intersect::obbox_triangle(obb, &tri) {
                        out.push(poly);
                    }
                }
            }
        }
    }

    /// Cast a semi-infinite axis-aligned ray down the tree.
    ///
    /// `result.fraction` carries the world-space distance along the axis
    /// rather than a parametric fraction; seed it with the maximum
    /// distance of interest (for example `f32::MAX`) before the first
    /// call. Returns the accumulated flag bits.
    pub fn cast_semi_infinite_axis_aligned_ray(
        &self,
        mesh: &impl CollisionMesh,
        start: &Vec3,
        dir: AxisDir,
        result: &mut CastResult,
    ) -> RaycastFlags {
        if self.nodes.is_empty() {
            return RaycastFlags::empty();
        }
        self.semi_infinite_node(mesh, start, dir, result, 0)
    }

    fn semi_infinite_node(
        &self,
        mesh: &impl CollisionMesh,
        start: &Vec3,
        dir: AxisDir,
        result: &mut CastResult,
        idx: usize,
    ) -> RaycastFlags {
        let node = &self.nodes[idx];
        if Self::semi_infinite_cull(node, start, dir) {
            return RaycastFlags::empty();
        }
        match node.kind {
            NodeKind::Internal { front, back } => {
                self.semi_infinite_node(mesh, start, dir, result, front as usize)
                    | self.semi_infinite_node(mesh, start, dir, result, back as usize)
            }
            NodeKind::Leaf {
                first_poly,
                poly_count,
            } => {
                let mut flags = RaycastFlags::empty();
                for &poly in self.leaf_polys(first_poly, poly_count) {
                    let tri = mesh.triangle(poly as usize);
                    let tri_flags = cast_semi_infinite_ray_triangle(start, dir, &tri, result);
                    if tri_flags.contains(RaycastFlags::HIT)
                        && !tri_flags.contains(RaycastFlags::START_IN_TRI)
                    {
                        result.surface_type = mesh.poly_surface_type(poly as usize);
                    }
                    flags |= tri_flags;
                }
                flags
            }
        }
    }

    /// A node is culled when the ray's fixed coordinates fall outside its
    /// cross-axis slabs or the node lies entirely behind the start point.
    fn semi_infinite_cull(node: &Node, start: &Vec3, dir: AxisDir) -> bool {
        let axis = dir.axis();
        let (a1, a2) = other_axes(axis);
        if start[a1] < node.min[a1] || start[a1] > node.max[a1] {
            return true;
        }
        if start[a2] < node.min[a2] || start[a2] > node.max[a2] {
            return true;
        }
        if dir.is_positive() {
            start[axis] > node.max[axis]
        } else {
            start[axis] < node.min[axis]
        }
    }

    /// Uniformly scale all node bounds (matching a uniform mesh rescale)
    pub fn scale(&mut self, factor: f32) {
        debug_assert!(factor > 0.0);
        for node in &mut self.nodes {
            node.min *= factor;
            node.max *= factor;
        }
    }

    /// Recompute every node's bounds from the mesh, bottom-up.
    ///
    /// Required after vertex deformation; the tree topology is kept, only
    /// the boxes move.
    pub fn update_bounding_boxes(&mut self, mesh: &impl CollisionMesh) {
        if !self.nodes.is_empty() {
            self.update_node_bounds(mesh, 0);
        }
    }

    fn update_node_bounds(&mut self, mesh: &impl CollisionMesh, idx: usize) -> MinMaxAABox {
        let bounds = match self.nodes[idx].kind {
            NodeKind::Internal { front, back } => {
                let mut bounds = self.update_node_bounds(mesh, front as usize);
                bounds.add_box(&self.update_node_bounds(mesh, back as usize));
                bounds
            }
            NodeKind::Leaf {
                first_poly,
                poly_count,
            } => {
                let first = first_poly as usize;
                let mut bounds = MinMaxAABox::empty();
                for i in first..first + poly_count as usize {
                    let poly = self.poly_indices[i] as usize;
                    bounds.add_box(&mesh.triangle(poly).bounds());
                }
                if poly_count == 0 {
                    bounds = MinMaxAABox::new(Vec3::zeros(), Vec3::zeros());
                }
                bounds
            }
        };
        self.nodes[idx].min = bounds.min;
        self.nodes[idx].max = bounds.max;
        bounds
    }
}
