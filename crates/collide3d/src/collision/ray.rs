//! Ray and segment casts
//!
//! Ray/triangle casting works plane-first: intersect the segment with the
//! triangle's plane, then run a 2D point-in-triangle test in the plane's
//! dominant-axis projection. The 2D test reports edge grazes separately so
//! callers stitching rays across shared mesh edges can tell a real miss
//! from a hit that landed exactly on the seam.
//!
//! Ray/box casting is the classic slab test, with each axis classified
//! into a [`BoxSide`] first so a ray starting inside the box is detected
//! as `start_bad` before any plane math runs.

use bitflags::bitflags;

use crate::foundation::math::{
    find_dominant_axis, other_axes, Vec3, COINCIDENCE_EPSILON, PARALLEL_EPSILON,
};
use crate::geometry::{AABox, LineSegment, OBBox, Triangle};

use super::cast::CastResult;

bitflags! {
    /// Outcome bits of a ray/triangle test
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct RaycastFlags: u8 {
        /// The ray hit the triangle interior or boundary
        const HIT = 0b001;
        /// The hit landed on an edge or vertex, within epsilon
        const HIT_EDGE = 0b010;
        /// The ray origin lies in the triangle's plane inside the triangle
        const START_IN_TRI = 0b100;
    }
}

/// Which side of a slab a ray origin starts on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxSide {
    /// Below the slab's minimum plane
    Bottom,
    /// Above the slab's maximum plane
    Top,
    /// Between the planes
    Middle,
}

/// One of the six signed world axis directions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisDir {
    /// +X
    PosX,
    /// -X
    NegX,
    /// +Y
    PosY,
    /// -Y
    NegY,
    /// +Z
    PosZ,
    /// -Z
    NegZ,
}

impl AxisDir {
    /// Index of the world axis this direction runs along
    pub fn axis(self) -> usize {
        match self {
            Self::PosX | Self::NegX => 0,
            Self::PosY | Self::NegY => 1,
            Self::PosZ | Self::NegZ => 2,
        }
    }

    /// Whether the direction points along the positive axis
    pub fn is_positive(self) -> bool {
        matches!(self, Self::PosX | Self::PosY | Self::PosZ)
    }

    /// Unit vector for this direction
    pub fn unit_vector(self) -> Vec3 {
        let v = Vec3::ith(self.axis(), 1.0);
        if self.is_positive() {
            v
        } else {
            -v
        }
    }
}

/// 2D point-in-triangle test in the (`a1`, `a2`) coordinate plane.
///
/// Classifies by normalized barycentric coordinates: any coordinate below
/// `-epsilon` is outside, any within epsilon of zero marks an edge graze.
/// Returns empty flags for a miss or a degenerate projection.
pub fn point_in_triangle_2d(point: &Vec3, v: &[Vec3; 3], a1: usize, a2: usize) -> RaycastFlags {
    let cross_2d = |ox: f32, oy: f32, ax: f32, ay: f32, bx: f32, by: f32| -> f32 {
        (ax - ox) * (by - oy) - (ay - oy) * (bx - ox)
    };
    let area2 = cross_2d(v[0][a1], v[0][a2], v[1][a1], v[1][a2], v[2][a1], v[2][a2]);
    if area2.abs() <= PARALLEL_EPSILON {
        return RaycastFlags::empty();
    }
    let (px, py) = (point[a1], point[a2]);
    let mut flags = RaycastFlags::HIT;
    for i in 0..3 {
        let (p, q) = (v[i], v[(i + 1) % 3]);
        let w = cross_2d(p[a1], p[a2], q[a1], q[a2], px, py) / area2;
        if w < -COINCIDENCE_EPSILON {
            return RaycastFlags::empty();
        }
        if w <= COINCIDENCE_EPSILON {
            flags |= RaycastFlags::HIT_EDGE;
        }
    }
    flags
}

/// Cast a bounded segment against a triangle.
///
/// On a hit earlier than the recorded fraction, updates the result's
/// fraction, normal (flipped to oppose the ray), and contact point when
/// requested. Returns the hit flags; an empty set means the result was
/// left untouched.
pub fn cast_ray_triangle(
    segment: &LineSegment,
    tri: &Triangle,
    result: &mut CastResult,
) -> RaycastFlags {
    let n = tri.normal;
    let den = n.dot(&segment.dp);
    if den.abs() <= PARALLEL_EPSILON {
        return RaycastFlags::empty();
    }
    let s = (n.dot(&tri.v[0]) - n.dot(&segment.p0)) / den;
    if s < 0.0 || s > 1.0 || s >= result.fraction {
        return RaycastFlags::empty();
    }
    let point = segment.point_at(s);
    let axis = find_dominant_axis(&n);
    let (a1, a2) = other_axes(axis);
    let flags = point_in_triangle_2d(&point, &tri.v, a1, a2);
    if !flags.contains(RaycastFlags::HIT) {
        return RaycastFlags::empty();
    }
    result.fraction = s;
    result.normal = if den > 0.0 { -n } else { n };
    if result.compute_contact_point {
        result.contact_point = Some(point);
    }
    flags
}

/// Cast a bounded segment against an axis-aligned box (slab test).
///
/// A ray starting inside the box flags `start_bad` at fraction zero.
/// Returns whether the result was updated.
pub fn cast_ray_aabox(segment: &LineSegment, aabox: &AABox, result: &mut CastResult) -> bool {
    let min = aabox.min();
    let max = aabox.max();
    let mut sides = [BoxSide::Middle; 3];
    let mut entry = [-1.0f32; 3];
    let mut inside = true;

    for i in 0..3 {
        if segment.p0[i] < min[i] {
            sides[i] = BoxSide::Bottom;
            inside = false;
            if segment.dp[i] == 0.0 {
                return false;
            }
            entry[i] = (min[i] - segment.p0[i]) / segment.dp[i];
        } else if segment.p0[i] > max[i] {
            sides[i] = BoxSide::Top;
            inside = false;
            if segment.dp[i] == 0.0 {
                return false;
            }
            entry[i] = (max[i] - segment.p0[i]) / segment.dp[i];
        }
    }

    if inside {
        result.start_bad = true;
        result.fraction = 0.0;
        return true;
    }

    // Latest slab entry is the candidate hit; Middle axes never qualify
    // (their sentinel stays negative).
    let mut which = 0;
    for i in 1..3 {
        if entry[i] > entry[which] {
            which = i;
        }
    }
    let t = entry[which];
    if t < 0.0 || t > 1.0 || t >= result.fraction {
        return false;
    }

    let point = segment.point_at(t);
    for i in 0..3 {
        if i != which && (point[i] < min[i] || point[i] > max[i]) {
            return false;
        }
    }

    result.fraction = t;
    result.normal = match sides[which] {
        BoxSide::Bottom => -Vec3::ith(which, 1.0),
        _ => Vec3::ith(which, 1.0),
    };
    if result.compute_contact_point {
        result.contact_point = Some(point);
    }
    true
}

/// Cast a bounded segment against an oriented box.
///
/// Runs the slab test in the box's local frame and rotates the hit normal
/// and contact point back to world space.
pub fn cast_ray_obbox(segment: &LineSegment, obb: &OBBox, result: &mut CastResult) -> bool {
    let local_p0 = obb.world_to_local(segment.p0);
    let local_dp = obb.basis.transpose() * segment.dp;
    let local_segment = LineSegment::new(local_p0, local_dp);
    let local_box = AABox::new(Vec3::zeros(), obb.extent);

    let mut local_result = CastResult::new();
    local_result.fraction = result.fraction;
    local_result.compute_contact_point = result.compute_contact_point;
    if !cast_ray_aabox(&local_segment, &local_box, &mut local_result) {
        return false;
    }

    result.fraction = local_result.fraction;
    result.start_bad = local_result.start_bad;
    result.normal = obb.basis * local_result.normal;
    if let Some(local_contact) = local_result.contact_point {
        result.contact_point = Some(obb.local_to_world(local_contact));
    }
    true
}

/// Cast a semi-infinite axis-aligned ray against a triangle.
///
/// Specialized for vertical drops and similar axis-aligned probes: the 2D
/// containment test needs no plane projection since the ray axis picks it,
/// and `result.fraction` stores the world-space distance to the hit rather
/// than a parametric fraction (callers seed it with the maximum distance
/// of interest). A start point within epsilon of the triangle's plane
/// reports `START_IN_TRI`.
pub fn cast_semi_infinite_ray_triangle(
    start: &Vec3,
    dir: AxisDir,
    tri: &Triangle,
    result: &mut CastResult,
) -> RaycastFlags {
    let axis = dir.axis();
    let n = tri.normal;
    if n[axis].abs() <= PARALLEL_EPSILON {
        return RaycastFlags::empty();
    }
    let (a1, a2) = other_axes(axis);
    let flags = point_in_triangle_2d(start, &tri.v, a1, a2);
    if !flags.contains(RaycastFlags::HIT) {
        return RaycastFlags::empty();
    }

    // Plane coordinate along the ray axis above/below the start point.
    let coord = (n.dot(&tri.v[0]) - n[a1] * start[a1] - n[a2] * start[a2]) / n[axis];
    let dist = if dir.is_positive() {
        coord - start[axis]
    } else {
        start[axis] - coord
    };
    if dist.abs() <= COINCIDENCE_EPSILON {
        return flags | RaycastFlags::START_IN_TRI;
    }
    if dist < 0.0 || dist >= result.fraction {
        return RaycastFlags::empty();
    }

    result.fraction = dist;
    let ray_dir = dir.unit_vector();
    result.normal = if n.dot(&ray_dir) > 0.0 { -n } else { n };
    if result.compute_contact_point {
        result.contact_point = Some(start + ray_dir * dist);
    }
    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Rotation3;

    fn floor_triangle() -> Triangle {
        Triangle::new(
            Vec3::new(-10.0, -10.0, 0.0),
            Vec3::new(10.0, -10.0, 0.0),
            Vec3::new(0.0, 10.0, 0.0),
        )
    }

    #[test]
    fn ray_hits_triangle_interior() {
        let tri = floor_triangle();
        let segment = LineSegment::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -10.0));
        let mut result = CastResult::with_contact_point();
        let flags = cast_ray_triangle(&segment, &tri, &mut result);
        assert!(flags.contains(RaycastFlags::HIT));
        assert!(!flags.contains(RaycastFlags::HIT_EDGE));
        assert_relative_eq!(result.fraction, 0.5, epsilon = 1e-6);
        // Normal opposes the downward ray.
        assert_relative_eq!(result.normal, Vec3::z(), epsilon = 1e-6);
        let contact = result.contact_point.expect("contact point was requested");
        assert_relative_eq!(contact, Vec3::zeros(), epsilon = 1e-5);
    }

    #[test]
    fn ray_missing_triangle_leaves_result_alone() {
        let tri = floor_triangle();
        let segment = LineSegment::new(Vec3::new(50.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -10.0));
        let mut result = CastResult::new();
        assert!(cast_ray_triangle(&segment, &tri, &mut result).is_empty());
        assert_relative_eq!(result.fraction, 1.0);

        // Parallel ray never hits.
        let parallel = LineSegment::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(10.0, 0.0, 0.0));
        assert!(cast_ray_triangle(&parallel, &tri, &mut result).is_empty());
    }

    #[test]
    fn shared_edge_hit_is_flagged() {
        let tri = floor_triangle();
        // Straight down onto the v0->v1 edge (y = -10).
        let segment = LineSegment::new(Vec3::new(0.0, -10.0, 5.0), Vec3::new(0.0, 0.0, -10.0));
        let mut result = CastResult::new();
        let flags = cast_ray_triangle(&segment, &tri, &mut result);
        assert!(flags.contains(RaycastFlags::HIT));
        assert!(flags.contains(RaycastFlags::HIT_EDGE));
    }

    #[test]
    fn triangle_test_respects_recorded_fraction() {
        let tri = floor_triangle();
        let segment = LineSegment::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -10.0));
        let mut result = CastResult::new();
        result.fraction = 0.25; // something closer already recorded
        assert!(cast_ray_triangle(&segment, &tri, &mut result).is_empty());
        assert_relative_eq!(result.fraction, 0.25);
    }

    #[test]
    fn slab_test_against_box() {
        let aabox = AABox::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
        let segment = LineSegment::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::new(10.0, 0.0, 0.0));
        let mut result = CastResult::new();
        assert!(cast_ray_aabox(&segment, &aabox, &mut result));
        assert_relative_eq!(result.fraction, 0.4, epsilon = 1e-6);
        assert_relative_eq!(result.normal, Vec3::new(-1.0, 0.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn ray_starting_inside_box_is_start_bad() {
        let aabox = AABox::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
        let segment = LineSegment::new(Vec3::new(0.5, 0.0, 0.0), Vec3::new(10.0, 0.0, 0.0));
        let mut result = CastResult::new();
        assert!(cast_ray_aabox(&segment, &aabox, &mut result));
        assert!(result.start_bad);
        assert_relative_eq!(result.fraction, 0.0);
    }

    #[test]
    fn ray_parallel_outside_slab_misses() {
        let aabox = AABox::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
        // Outside the y slab, moving only along x.
        let segment = LineSegment::new(Vec3::new(-5.0, 3.0, 0.0), Vec3::new(10.0, 0.0, 0.0));
        let mut result = CastResult::new();
        assert!(!cast_ray_aabox(&segment, &aabox, &mut result));
        assert!(!result.hit());
    }

    #[test]
    fn corner_graze_verifies_other_axes() {
        let aabox = AABox::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
        // Enters the x slab late but has already left the y slab.
        let segment = LineSegment::new(Vec3::new(-3.0, 3.5, 0.0), Vec3::new(4.0, -1.0, 0.0));
        let mut result = CastResult::new();
        assert!(!cast_ray_aabox(&segment, &aabox, &mut result));
    }

    #[test]
    fn oriented_box_cast_matches_rotated_frame() {
        let rot = Rotation3::from_axis_angle(&Vec3::z_axis(), std::f32::consts::FRAC_PI_2);
        let obb = OBBox::new(
            Vec3::new(3.0, 0.0, 0.0),
            Vec3::new(1.0, 2.0, 1.0),
            rot.into_inner(),
        );
        // A quarter turn about z swaps x and y extents: the face along
        // world x now sits 2.0 from the center.
        let segment = LineSegment::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::new(10.0, 0.0, 0.0));
        let mut result = CastResult::with_contact_point();
        assert!(cast_ray_obbox(&segment, &obb, &mut result));
        assert_relative_eq!(result.fraction, 0.6, epsilon = 1e-5);
        let contact = result.contact_point.expect("contact point was requested");
        assert_relative_eq!(contact.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(result.normal.dot(&Vec3::x()), -1.0, epsilon = 1e-5);
    }

    #[test]
    fn semi_infinite_ray_reports_world_distance() {
        let tri = floor_triangle();
        let mut result = CastResult::new();
        result.fraction = f32::MAX;
        let flags =
            cast_semi_infinite_ray_triangle(&Vec3::new(0.0, 0.0, 7.5), AxisDir::NegZ, &tri, &mut result);
        assert!(flags.contains(RaycastFlags::HIT));
        assert_relative_eq!(result.fraction, 7.5, epsilon = 1e-5);
        assert_relative_eq!(result.normal, Vec3::z(), epsilon = 1e-6);
    }

    #[test]
    fn semi_infinite_ray_behind_start_misses() {
        let tri = floor_triangle();
        let mut result = CastResult::new();
        result.fraction = f32::MAX;
        // Pointing up, triangle below.
        let flags =
            cast_semi_infinite_ray_triangle(&Vec3::new(0.0, 0.0, 5.0), AxisDir::PosZ, &tri, &mut result);
        assert!(flags.is_empty());
        assert_relative_eq!(result.fraction, f32::MAX);
    }

    #[test]
    fn start_on_triangle_plane_is_flagged() {
        let tri = floor_triangle();
        let mut result = CastResult::new();
        result.fraction = f32::MAX;
        let flags = cast_semi_infinite_ray_triangle(
            &Vec3::new(0.0, 0.0, 1e-4),
            AxisDir::NegZ,
            &tri,
            &mut result,
        );
        assert!(flags.contains(RaycastFlags::START_IN_TRI));
        // The recorded distance is left untouched for a coplanar start.
        assert_relative_eq!(result.fraction, f32::MAX);
    }

    #[test]
    fn barycentric_test_in_each_projection_plane() {
        // Triangle in the yz plane: dominant axis x.
        let tri = Triangle::new(
            Vec3::new(0.0, -1.0, -1.0),
            Vec3::new(0.0, 1.0, -1.0),
            Vec3::new(0.0, 0.0, 1.0),
        );
        let (a1, a2) = other_axes(find_dominant_axis(&tri.normal));
        let inside = point_in_triangle_2d(&Vec3::new(0.0, 0.0, 0.0), &tri.v, a1, a2);
        assert!(inside.contains(RaycastFlags::HIT));
        let outside = point_in_triangle_2d(&Vec3::new(0.0, 2.0, 0.0), &tri.v, a1, a2);
        assert!(outside.is_empty());
    }
}
