//! Tree query equivalence suite
//!
//! The tree must give byte-identical answers to brute-force loops over
//! every mesh polygon; these tests pin that down for each query type on a
//! grid mesh, plus builder/persistence invariants.

use approx::assert_relative_eq;
use nalgebra::Rotation3;

use crate::collision::cast::{AABoxCast, CastResult, OBBoxCast, RayCast};
use crate::collision::ray::{cast_ray_triangle, AxisDir, RaycastFlags};
use crate::collision::sweep;
use crate::foundation::math::Vec3;
use crate::geometry::{AABox, LineSegment, MinMaxAABox, OBBox};

use super::node::NodeKind;
use super::{AabTree, AabTreeBuilder, BuildConfig, CollisionMesh, SimpleMesh};

/// Flat n-by-n cell grid on the z=0 plane, two triangles per cell,
/// normals +z, surface type = polygon index mod 251
fn grid_mesh(n: u32) -> SimpleMesh {
    let mut vertices = Vec::new();
    for j in 0..=n {
        for i in 0..=n {
            vertices.push(Vec3::new(i as f32, j as f32, 0.0));
        }
    }
    let vert = |i: u32, j: u32| j * (n + 1) + i;
    let mut polygons = Vec::new();
    for j in 0..n {
        for i in 0..n {
            polygons.push([vert(i, j), vert(i + 1, j), vert(i + 1, j + 1)]);
            polygons.push([vert(i, j), vert(i + 1, j + 1), vert(i, j + 1)]);
        }
    }
    let surface_types = (0..polygons.len()).map(|p| (p % 251) as u8).collect();
    SimpleMesh::new(vertices, polygons).with_surface_types(surface_types)
}

fn grid_tree(mesh: &SimpleMesh) -> AabTree {
    AabTreeBuilder::new().build(mesh)
}

fn brute_force_ray(mesh: &SimpleMesh, segment: &LineSegment) -> (CastResult, RaycastFlags) {
    let mut result = CastResult::new();
    let mut flags = RaycastFlags::empty();
    for poly in 0..mesh.polygons().len() {
        let f = cast_ray_triangle(segment, &mesh.triangle(poly), &mut result);
        if f.contains(RaycastFlags::HIT) {
            flags |= f;
            result.surface_type = mesh.poly_surface_type(poly);
        }
    }
    (result, flags)
}

#[test]
fn ray_casts_match_brute_force() {
    let mesh = grid_mesh(4);
    let tree = grid_tree(&mesh);
    let segments = [
        // Clean miss outside the grid.
        LineSegment::new(Vec3::new(10.5, 10.5, 5.0), Vec3::new(0.0, 0.0, -10.0)),
        // Straight-down hit in a cell interior.
        LineSegment::new(Vec3::new(1.3, 2.2, 3.0), Vec3::new(0.0, 0.0, -6.0)),
        // Oblique hit crossing several cells.
        LineSegment::new(Vec3::new(0.2, 0.3, 2.0), Vec3::new(3.1, 2.9, -4.0)),
        // Graze down a shared lattice edge.
        LineSegment::new(Vec3::new(2.0, 1.5, 2.0), Vec3::new(0.0, 0.0, -4.0)),
        // Starts below the surface heading away.
        LineSegment::new(Vec3::new(1.5, 1.5, -1.0), Vec3::new(0.0, 0.0, -5.0)),
    ];
    for segment in &segments {
        let (brute, brute_flags) = brute_force_ray(&mesh, segment);
        let mut raycast = RayCast::new(*segment);
        let hit = tree.cast_ray(&mesh, &mut raycast);
        assert_eq!(hit, brute.hit(), "segment from {:?}", segment.p0);
        assert_relative_eq!(raycast.result.fraction, brute.fraction, epsilon = 1e-6);
        assert_eq!(
            raycast.flags.contains(RaycastFlags::HIT_EDGE),
            brute_flags.contains(RaycastFlags::HIT_EDGE),
            "edge flag for segment from {:?}",
            segment.p0
        );
        if hit {
            assert_relative_eq!(raycast.result.normal, brute.normal, epsilon = 1e-6);
        }
    }
}

#[test]
fn ray_hit_stamps_surface_type() {
    let mesh = grid_mesh(4);
    let tree = grid_tree(&mesh);
    // Strictly inside one triangle: no ties with a neighbor.
    let segment = LineSegment::new(Vec3::new(1.25, 2.75, 3.0), Vec3::new(0.0, 0.0, -6.0));
    let (brute, _) = brute_force_ray(&mesh, &segment);
    let mut raycast = RayCast::new(segment);
    assert!(tree.cast_ray(&mesh, &mut raycast));
    assert_eq!(raycast.result.surface_type, brute.surface_type);
}

#[test]
fn swept_aabox_matches_brute_force() {
    let mesh = grid_mesh(4);
    let tree = grid_tree(&mesh);
    let aabox = AABox::new(Vec3::new(2.0, 2.0, 3.0), Vec3::new(0.5, 0.5, 0.5));
    let motion = Vec3::new(0.0, 0.0, -5.0);

    let mut brute = CastResult::new();
    for poly in 0..mesh.polygons().len() {
        sweep::collide_aabox_triangle(
            &aabox,
            &motion,
            &mesh.triangle(poly),
            &Vec3::zeros(),
            &mut brute,
        );
    }

    let mut boxcast = AABoxCast::new(aabox, motion);
    assert!(tree.cast_aabox(&mesh, &mut boxcast));
    assert_relative_eq!(boxcast.result.fraction, brute.fraction, epsilon = 1e-5);
    // Bottom face falls from z = 2.5 to the plane over a motion of 5.
    assert_relative_eq!(boxcast.result.fraction, 0.5, epsilon = 1e-5);
    assert_relative_eq!(boxcast.result.normal, Vec3::z(), epsilon = 1e-5);
}

#[test]
fn embedded_box_aborts_with_start_bad() {
    let mesh = grid_mesh(4);
    let tree = grid_tree(&mesh);
    let embedded = AABox::new(Vec3::new(2.0, 2.0, 0.0), Vec3::new(0.5, 0.5, 0.5));
    let mut boxcast = AABoxCast::new(embedded, Vec3::new(0.0, 0.0, -1.0));
    assert!(tree.cast_aabox(&mesh, &mut boxcast));
    assert!(boxcast.result.start_bad);
    assert_relative_eq!(boxcast.result.fraction, 0.0);
}

#[test]
fn swept_obbox_matches_brute_force() {
    let mesh = grid_mesh(4);
    let tree = grid_tree(&mesh);
    let rot = Rotation3::from_axis_angle(&Vec3::x_axis(), std::f32::consts::FRAC_PI_4);
    let obb = OBBox::new(
        Vec3::new(2.0, 2.0, 4.0),
        Vec3::new(0.5, 0.5, 0.5),
        rot.into_inner(),
    );
    let motion = Vec3::new(0.0, 0.0, -6.0);

    let mut brute = CastResult::new();
    for poly in 0..mesh.polygons().len() {
        sweep::collide_obbox_triangle(
            &obb,
            &motion,
            &mesh.triangle(poly),
            &Vec3::zeros(),
            &mut brute,
        );
    }

    let mut boxcast = OBBoxCast::new(obb, motion);
    assert!(tree.cast_obbox(&mesh, &mut boxcast));
    assert_relative_eq!(boxcast.result.fraction, brute.fraction, epsilon = 1e-5);
    assert_relative_eq!(boxcast.result.normal, brute.normal, epsilon = 1e-5);
}

#[test]
fn discrete_obbox_intersection() {
    let mesh = grid_mesh(4);
    let tree = grid_tree(&mesh);
    let touching = OBBox::new(
        Vec3::new(2.0, 2.0, 0.5),
        Vec3::new(1.0, 1.0, 1.0),
        crate::foundation::math::Mat3::identity(),
    );
    assert!(tree.intersect_obbox(&mesh, &touching));
    let above = OBBox::new(
        Vec3::new(2.0, 2.0, 5.0),
        Vec3::new(1.0, 1.0, 1.0),
        crate::foundation::math::Mat3::identity(),
    );
    assert!(!tree.intersect_obbox(&mesh, &above));
}

#[test]
fn apt_is_deduplicated_and_backface_filtered() {
    let mesh = grid_mesh(4);
    let tree = grid_tree(&mesh);
    let obb = OBBox::new(
        Vec3::new(2.0, 2.0, 0.0),
        Vec3::new(0.6, 0.6, 1.0),
        crate::foundation::math::Mat3::identity(),
    );

    let mut polys = Vec::new();
    tree.generate_apt(&mesh, &obb, None, &mut polys);
    // The box overlaps the four cells around (2,2): eight triangles.
    assert_eq!(polys.len(), 8);
    assert!(polys.windows(2).all(|w| w[0] < w[1]), "sorted and unique");

    // Looking down: all grid normals (+z) face the viewer.
    let mut facing = Vec::new();
    tree.generate_apt(&mesh, &obb, Some(&Vec3::new(0.0, 0.0, -1.0)), &mut facing);
    assert_eq!(facing, polys);

    // Looking up: every polygon is backfacing.
    let mut away = Vec::new();
    tree.generate_apt(&mesh, &obb, Some(&Vec3::new(0.0, 0.0, 1.0)), &mut away);
    assert!(away.is_empty());
}

#[test]
fn semi_infinite_ray_through_tree() {
    let mesh = grid_mesh(4);
    let tree = grid_tree(&mesh);

    let mut result = CastResult::new();
    result.fraction = f32::MAX;
    let flags = tree.cast_semi_infinite_axis_aligned_ray(
        &mesh,
        &Vec3::new(1.3, 2.2, 5.0),
        AxisDir::NegZ,
        &mut result,
    );
    assert!(flags.contains(RaycastFlags::HIT));
    assert_relative_eq!(result.fraction, 5.0, epsilon = 1e-5);
    assert_relative_eq!(result.normal, Vec3::z(), epsilon = 1e-6);

    // Down a lattice line: edge flag set.
    let mut result = CastResult::new();
    result.fraction = f32::MAX;
    let flags = tree.cast_semi_infinite_axis_aligned_ray(
        &mesh,
        &Vec3::new(2.0, 1.5, 3.0),
        AxisDir::NegZ,
        &mut result,
    );
    assert!(flags.contains(RaycastFlags::HIT_EDGE));

    // Pointing away from the surface.
    let mut result = CastResult::new();
    result.fraction = f32::MAX;
    let flags = tree.cast_semi_infinite_axis_aligned_ray(
        &mesh,
        &Vec3::new(1.3, 2.2, 5.0),
        AxisDir::PosZ,
        &mut result,
    );
    assert!(flags.is_empty());
    assert_relative_eq!(result.fraction, f32::MAX);
}

#[test]
fn builder_invariants() {
    let mesh = grid_mesh(4);
    let tree = AabTreeBuilder::with_config(BuildConfig {
        min_polys_per_leaf: 4,
        max_plane_candidates: 8,
    })
    .build(&mesh);
    let poly_count = mesh.polygons().len() as u32;

    let mut seen = vec![false; poly_count as usize];
    let mut leaf_bounds = MinMaxAABox::empty();
    for (idx, node) in tree.nodes().iter().enumerate() {
        match node.kind {
            NodeKind::Internal { front, back } => {
                // Preorder arena: children always come after their parent.
                assert!(front as usize > idx && back as usize > idx);
                assert!((front as usize) < tree.nodes().len());
                assert!((back as usize) < tree.nodes().len());
            }
            NodeKind::Leaf {
                first_poly,
                poly_count: count,
            } => {
                let first = first_poly as usize;
                let run = &tree.poly_indices()[first..first + count as usize];
                let node_bounds = node.bounds();
                for &poly in run {
                    seen[poly as usize] = true;
                    // Every leaf polygon fits inside its leaf's box.
                    let tri_bounds = mesh.triangle(poly as usize).bounds();
                    assert!(node_bounds.contains_point(tri_bounds.min));
                    assert!(node_bounds.contains_point(tri_bounds.max));
                }
                leaf_bounds.add_box(&node_bounds);
            }
        }
    }
    assert!(seen.iter().all(|&s| s), "every polygon lands in >= 1 leaf");
    let root = tree.nodes()[0].bounds();
    assert_relative_eq!(leaf_bounds.min, root.min, epsilon = 1e-6);
    assert_relative_eq!(leaf_bounds.max, root.max, epsilon = 1e-6);
    // The grid splits: more than one node.
    assert!(tree.nodes().len() > 1);
}

#[test]
fn persistence_round_trips_byte_for_byte() {
    let mesh = grid_mesh(4);
    let tree = grid_tree(&mesh);

    let mut bytes = Vec::new();
    super::io::write_tree(&mut bytes, &tree).unwrap();
    let mut cursor = std::io::Cursor::new(&bytes);
    let loaded = super::io::read_tree(&mut cursor).unwrap();

    let mut bytes_again = Vec::new();
    super::io::write_tree(&mut bytes_again, &loaded).unwrap();
    assert_eq!(bytes, bytes_again);

    // The loaded tree answers queries identically.
    let segment = LineSegment::new(Vec3::new(1.3, 2.2, 3.0), Vec3::new(0.0, 0.0, -6.0));
    let mut original = RayCast::new(segment);
    let mut reloaded = RayCast::new(segment);
    tree.cast_ray(&mesh, &mut original);
    loaded.cast_ray(&mesh, &mut reloaded);
    assert_relative_eq!(original.result.fraction, reloaded.result.fraction);
}

#[test]
fn fractions_are_scale_invariant() {
    let mesh = grid_mesh(4);
    let tree = grid_tree(&mesh);
    let segment = LineSegment::new(Vec3::new(1.3, 2.2, 3.0), Vec3::new(0.0, 0.0, -6.0));
    let mut raycast = RayCast::new(segment);
    tree.cast_ray(&mesh, &mut raycast);

    let factor = 2.5;
    let mut scaled_tree = tree.clone();
    scaled_tree.scale(factor);
    let mut scaled_mesh = grid_mesh(4);
    for v in scaled_mesh.vertices_mut() {
        *v *= factor;
    }
    let scaled_segment = LineSegment::new(segment.p0 * factor, segment.dp * factor);
    let mut scaled_cast = RayCast::new(scaled_segment);
    scaled_tree.cast_ray(&scaled_mesh, &mut scaled_cast);

    assert_relative_eq!(
        raycast.result.fraction,
        scaled_cast.result.fraction,
        epsilon = 1e-6
    );
}

#[test]
fn update_bounding_boxes_follows_deformation() {
    let mut mesh = grid_mesh(4);
    let mut tree = grid_tree(&mesh);

    // Lift the whole surface well above its old bounds.
    for v in mesh.vertices_mut() {
        v.z += 10.0;
    }
    let segment = LineSegment::new(Vec3::new(1.3, 2.2, 12.0), Vec3::new(0.0, 0.0, -4.0));

    // Stale boxes cull the ray away from the moved geometry.
    let mut stale = RayCast::new(segment);
    assert!(!tree.cast_ray(&mesh, &mut stale));

    tree.update_bounding_boxes(&mesh);
    let mut fresh = RayCast::new(segment);
    assert!(tree.cast_ray(&mesh, &mut fresh));
    assert_relative_eq!(fresh.result.fraction, 0.5, epsilon = 1e-5);
}
