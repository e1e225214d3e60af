//! Top-down tree construction
//!
//! Recursive median-free build: at each step candidate axis-aligned
//! splitting planes are sampled through polygon centroids and scored by
//! `front_volume * front_count + back_volume * back_count`; the cheapest
//! valid plane wins. Polygons straddling the chosen plane are duplicated
//! into both children, which keeps leaves tight at the cost of some index
//! duplication (the shared polygon-index array absorbs it).
//!
//! Nodes are written directly into the flat arena in preorder; there is
//! no intermediate pointer tree.

use log::debug;

use crate::foundation::math::Vec3;
use crate::geometry::{AAPlane, Axis, MinMaxAABox};

use super::aabtree::AabTree;
use super::mesh::CollisionMesh;
use super::node::{Node, NodeKind};

/// Tuning knobs for tree construction
#[derive(Debug, Clone, Copy)]
pub struct BuildConfig {
    /// Stop splitting below this many polygons
    pub min_polys_per_leaf: usize,
    /// Centroid samples per axis when selecting a splitting plane
    pub max_plane_candidates: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            min_polys_per_leaf: 4,
            max_plane_candidates: 8,
        }
    }
}

/// Builds an [`AabTree`] from a mesh
#[derive(Debug, Default)]
pub struct AabTreeBuilder {
    config: BuildConfig,
}

/// Which side of a splitting plane a polygon's bounds fall on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PolySide {
    Front,
    Back,
    Both,
}

/// Precomputed per-polygon data shared across the whole build
struct BuildContext {
    bounds: Vec<MinMaxAABox>,
    centroids: Vec<Vec3>,
}

#[derive(Debug, Default)]
struct BuildStats {
    leaves: usize,
    max_depth: usize,
    duplicated: usize,
}

impl AabTreeBuilder {
    /// Builder with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder with explicit tuning
    pub fn with_config(config: BuildConfig) -> Self {
        Self { config }
    }

    /// Build a tree over every polygon of the mesh
    pub fn build(&self, mesh: &impl CollisionMesh) -> AabTree {
        let poly_count = mesh.polygons().len();
        let mut ctx = BuildContext {
            bounds: Vec::with_capacity(poly_count),
            centroids: Vec::with_capacity(poly_count),
        };
        for poly in 0..poly_count {
            let tri = mesh.triangle(poly);
            ctx.bounds.push(tri.bounds());
            ctx.centroids.push(tri.centroid());
        }

        let mut nodes = Vec::new();
        let mut poly_indices = Vec::new();
        let mut stats = BuildStats::default();
        let polys: Vec<u32> = (0..poly_count as u32).collect();
        self.build_node(&ctx, &mut nodes, &mut poly_indices, polys, 0, &mut stats);

        debug!(
            "aabtree built: {} polys, {} nodes, {} leaves, depth {}, {} duplicated",
            poly_count,
            nodes.len(),
            stats.leaves,
            stats.max_depth,
            stats.duplicated
        );
        AabTree::from_parts(nodes, poly_indices)
    }

    /// Recursively build the subtree for `polys`, returning its arena index
    fn build_node(
        &self,
        ctx: &BuildContext,
        nodes: &mut Vec<Node>,
        poly_indices: &mut Vec<u32>,
        polys: Vec<u32>,
        depth: usize,
        stats: &mut BuildStats,
    ) -> u32 {
        stats.max_depth = stats.max_depth.max(depth);
        let idx = nodes.len() as u32;
        nodes.push(Node {
            min: Vec3::zeros(),
            max: Vec3::zeros(),
            kind: NodeKind::Leaf {
                first_poly: 0,
                poly_count: 0,
            },
        });

        let mut bounds = MinMaxAABox::empty();
        for &poly in &polys {
            bounds.add_box(&ctx.bounds[poly as usize]);
        }
        if polys.is_empty() {
            bounds = MinMaxAABox::new(Vec3::zeros(), Vec3::zeros());
        }

        let split = if polys.len() <= self.config.min_polys_per_leaf {
            None
        } else {
            self.select_splitting_plane(ctx, &polys)
        };

        match split {
            None => {
                stats.leaves += 1;
                let first_poly = poly_indices.len() as u32;
                let poly_count = polys.len() as u32;
                poly_indices.extend_from_slice(&polys);
                nodes[idx as usize].kind = NodeKind::Leaf {
                    first_poly,
                    poly_count,
                };
            }
            Some(plane) => {
                let mut front = Vec::new();
                let mut back = Vec::new();
                for &poly in &polys {
                    match side_of_plane(&ctx.bounds[poly as usize], &plane) {
                        PolySide::Front => front.push(poly),
                        PolySide::Back => back.push(poly),
                        PolySide::Both => {
                            stats.duplicated += 1;
                            front.push(poly);
                            back.push(poly);
                        }
                    }
                }
                debug_assert!(front.len() < polys.len() && back.len() < polys.len());
                let front_idx =
                    self.build_node(ctx, nodes, poly_indices, front, depth + 1, stats);
                let back_idx = self.build_node(ctx, nodes, poly_indices, back, depth + 1, stats);
                nodes[idx as usize].kind = NodeKind::Internal {
                    front: front_idx,
                    back: back_idx,
                };
            }
        }

        nodes[idx as usize].min = bounds.min;
        nodes[idx as usize].max = bounds.max;
        idx
    }

    /// Pick the cheapest valid axis-aligned splitting plane.
    ///
    /// Candidates pass through sampled polygon centroids on each axis. A
    /// candidate is invalid when either side ends up empty or when either
    /// side keeps every polygon (no progress, would recurse forever).
    fn select_splitting_plane(&self, ctx: &BuildContext, polys: &[u32]) -> Option<AAPlane> {
        let step = (polys.len() / self.config.max_plane_candidates).max(1);
        let mut best: Option<(f32, AAPlane)> = None;
        for axis in [Axis::X, Axis::Y, Axis::Z] {
            for &poly in polys.iter().step_by(step).take(self.config.max_plane_candidates) {
                let plane = AAPlane::new(axis, ctx.centroids[poly as usize][axis.index()]);
                if let Some(score) = score_plane(ctx, polys, &plane) {
                    if best.map_or(true, |(best_score, _)| score < best_score) {
                        best = Some((score, plane));
                    }
                }
            }
        }
        best.map(|(_, plane)| plane)
    }
}

/// Classify a polygon's bounds against a splitting plane.
///
/// Coplanar bounds (min == max == dist) go Front, not Both, so flat runs
/// of coplanar polygons are not duplicated.
fn side_of_plane(bounds: &MinMaxAABox, plane: &AAPlane) -> PolySide {
    let i = plane.axis.index();
    if bounds.min[i] >= plane.dist {
        PolySide::Front
    } else if bounds.max[i] <= plane.dist {
        PolySide::Back
    } else {
        PolySide::Both
    }
}

/// Expected query cost of a candidate plane, or None when invalid
fn score_plane(ctx: &BuildContext, polys: &[u32], plane: &AAPlane) -> Option<f32> {
    let mut front_bounds = MinMaxAABox::empty();
    let mut back_bounds = MinMaxAABox::empty();
    let mut front_count = 0usize;
    let mut back_count = 0usize;
    for &poly in polys {
        let bounds = &ctx.bounds[poly as usize];
        match side_of_plane(bounds, plane) {
            PolySide::Front => {
                front_bounds.add_box(bounds);
                front_count += 1;
            }
            PolySide::Back => {
                back_bounds.add_box(bounds);
                back_count += 1;
            }
            PolySide::Both => {
                front_bounds.add_box(bounds);
                back_bounds.add_box(bounds);
                front_count += 1;
                back_count += 1;
            }
        }
    }
    let n = polys.len();
    if front_count == 0 || back_count == 0 || front_count == n || back_count == n {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    Some(
        front_bounds.volume() * front_count as f32 + back_bounds.volume() * back_count as f32,
    )
}
