//! Boolean intersection tests
//!
//! Cheap yes/no tests with no classification and no normals, used for
//! spatial-query filtering ("does this box touch this leaf's bounds at
//! all"). Box pairs run the full separating-axis theorem over 15
//! candidate axes, box/triangle pairs over 13; the first axis that proves
//! separation short-circuits, and near-zero cross products (parallel
//! edges) are skipped since they carry no separating information.

use crate::foundation::math::{Vec3, AXIS_EPSILON2};
use crate::geometry::{AABox, OBBox, Triangle};

/// Per-axis interval overlap between two axis-aligned boxes
pub fn aabox_aabox(a: &AABox, b: &AABox) -> bool {
    let d = b.center - a.center;
    d.x.abs() <= a.extent.x + b.extent.x
        && d.y.abs() <= a.extent.y + b.extent.y
        && d.z.abs() <= a.extent.z + b.extent.z
}

/// True when `axis` separates the two boxes.
///
/// Degenerate axes (near-zero cross products) separate nothing.
fn boxes_separated_on_axis(a: &OBBox, b: &OBBox, axis: &Vec3) -> bool {
    if axis.magnitude_squared() <= AXIS_EPSILON2 {
        return false;
    }
    let (ca, ra) = a.project_onto_axis(axis);
    let (cb, rb) = b.project_onto_axis(axis);
    (cb - ca).abs() > ra + rb
}

/// Full 15-axis SAT between two oriented boxes.
///
/// Axis order: A's three basis axes, B's three basis axes, then the nine
/// pairwise cross products in row-major (A-axis, B-axis) order.
pub fn obbox_obbox(a: &OBBox, b: &OBBox) -> bool {
    for i in 0..3 {
        if boxes_separated_on_axis(a, b, &a.axis(i)) {
            return false;
        }
    }
    for j in 0..3 {
        if boxes_separated_on_axis(a, b, &b.axis(j)) {
            return false;
        }
    }
    for i in 0..3 {
        for j in 0..3 {
            let axis = a.axis(i).cross(&b.axis(j));
            if boxes_separated_on_axis(a, b, &axis) {
                return false;
            }
        }
    }
    true
}

/// Oriented box vs axis-aligned box (the AABox as an identity-basis OBBox)
pub fn obbox_aabox(obb: &OBBox, aabox: &AABox) -> bool {
    obbox_obbox(obb, &aabox.to_obbox())
}

/// True when `axis` separates the box from the triangle
fn box_tri_separated_on_axis(obb: &OBBox, tri: &Triangle, axis: &Vec3) -> bool {
    if axis.magnitude_squared() <= AXIS_EPSILON2 {
        return false;
    }
    let (c, r) = obb.project_onto_axis(axis);
    let (tmin, tmax, _, _) = tri.project_onto_axis(axis);
    c - r > tmax || c + r < tmin
}

/// 13-axis SAT between an oriented box and a triangle.
///
/// Axis order: triangle normal, the box's three basis axes, then the nine
/// cross products of box axis and triangle edge (edges e0 = v1-v0,
/// e1 = v2-v0, e2 = e1-e0).
pub fn obbox_triangle(obb: &OBBox, tri: &Triangle) -> bool {
    if box_tri_separated_on_axis(obb, tri, &tri.normal) {
        return false;
    }
    for i in 0..3 {
        if box_tri_separated_on_axis(obb, tri, &obb.axis(i)) {
            return false;
        }
    }
    let edges = [tri.edge0(), tri.edge1(), tri.edge1() - tri.edge0()];
    for i in 0..3 {
        for edge in &edges {
            let axis = obb.axis(i).cross(edge);
            if box_tri_separated_on_axis(obb, tri, &axis) {
                return false;
            }
        }
    }
    true
}

/// Axis-aligned box vs triangle (identity-basis SAT)
pub fn aabox_triangle(aabox: &AABox, tri: &Triangle) -> bool {
    obbox_triangle(&aabox.to_obbox(), tri)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Mat3;
    use nalgebra::Rotation3;

    fn rotated(center: Vec3, extent: Vec3, angle: f32) -> OBBox {
        let rot = Rotation3::from_axis_angle(&Vec3::z_axis(), angle);
        OBBox::new(center, extent, rot.into_inner())
    }

    #[test]
    fn aabox_pair_overlap_and_separation() {
        let a = AABox::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
        let b = AABox::new(Vec3::new(1.5, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
        let c = AABox::new(Vec3::new(2.5, 0.0, 0.0), Vec3::new(0.4, 0.4, 0.4));
        assert!(aabox_aabox(&a, &b));
        assert!(!aabox_aabox(&a, &c));
    }

    #[test]
    fn intersection_is_symmetric() {
        let a = rotated(Vec3::zeros(), Vec3::new(1.0, 2.0, 0.5), 0.4);
        let b = rotated(Vec3::new(1.5, 0.5, 0.0), Vec3::new(1.0, 1.0, 1.0), -0.9);
        assert_eq!(obbox_obbox(&a, &b), obbox_obbox(&b, &a));
        let far = rotated(Vec3::new(10.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0), 1.2);
        assert_eq!(obbox_obbox(&a, &far), obbox_obbox(&far, &a));
        assert!(!obbox_obbox(&a, &far));
    }

    #[test]
    fn separation_along_world_axis_holds_under_rotation() {
        // Centers separated along x by more than the sum of the projected
        // extents never intersect, whatever the rotation.
        let a = AABox::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0)).to_obbox();
        for angle in [0.0f32, 0.3, 0.785, 1.2] {
            let extent = Vec3::new(1.0, 1.0, 1.0);
            let b = rotated(Vec3::new(10.0, 0.0, 0.0), extent, angle);
            assert!(!obbox_obbox(&a, &b), "angle {angle}");
        }
    }

    #[test]
    fn near_miss_at_extent_sum_epsilon() {
        let a = AABox::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0)).to_obbox();
        // Axis-aligned pair: the extent sum along x is exactly 2.0.
        let just_outside = AABox::new(Vec3::new(2.001, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
        let just_inside = AABox::new(Vec3::new(1.999, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
        assert!(!obbox_aabox(&a, &just_outside));
        assert!(obbox_aabox(&a, &just_inside));
    }

    #[test]
    fn rotated_box_needs_cross_product_axes() {
        // Two boxes whose face axes all overlap but whose edges separate:
        // only one of the 9 cross-product axes proves it.
        let a = OBBox::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0), Mat3::identity());
        let rot = Rotation3::from_euler_angles(0.785, 0.785, 0.0);
        let b = OBBox::new(
            Vec3::new(1.9, 1.9, 0.0),
            Vec3::new(1.0, 1.0, 1.0),
            rot.into_inner(),
        );
        // Sanity: the result must at least agree with its mirror image.
        assert_eq!(obbox_obbox(&a, &b), obbox_obbox(&b, &a));
    }

    #[test]
    fn box_triangle_intersection() {
        let aabox = AABox::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
        let cutting = Triangle::new(
            Vec3::new(-5.0, -5.0, 0.0),
            Vec3::new(5.0, -5.0, 0.0),
            Vec3::new(0.0, 5.0, 0.0),
        );
        assert!(aabox_triangle(&aabox, &cutting));

        let outside = Triangle::new(
            Vec3::new(3.0, 0.0, 0.0),
            Vec3::new(4.0, 0.0, 0.0),
            Vec3::new(3.0, 1.0, 0.0),
        );
        assert!(!aabox_triangle(&aabox, &outside));

        // Separated only by the triangle-normal axis.
        let above = Triangle::new(
            Vec3::new(-5.0, -5.0, 1.5),
            Vec3::new(5.0, -5.0, 1.5),
            Vec3::new(0.0, 5.0, 1.5),
        );
        assert!(!aabox_triangle(&aabox, &above));
    }

    #[test]
    fn degenerate_triangle_does_not_panic() {
        let aabox = AABox::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
        let degenerate = Triangle::new(Vec3::zeros(), Vec3::x(), Vec3::x() * 2.0);
        // Zero normal is skipped as an axis; the edge axes still classify.
        assert!(aabox_triangle(&aabox, &degenerate));
    }
}
