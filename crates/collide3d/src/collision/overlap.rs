//! Discrete overlap classification
//!
//! `Overlap_Test(A, B)` style classification: is B entirely on the
//! positive side of A, entirely on the negative side, exactly on the
//! boundary, or straddling it. Every compound test here is built the same
//! way: classify each constituent point into an [`OverlapMask`], OR the
//! masks together, and map the combined mask to a single class with
//! [`eval_overlap_mask`].

use bitflags::bitflags;

use crate::foundation::math::{Vec3, COINCIDENCE_EPSILON};
use crate::geometry::{AABox, AAPlane, Frustum, Plane, Triangle};

use super::intersect;

bitflags! {
    /// Per-point classification bits against a boundary
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OverlapMask: u8 {
        /// On the positive (outside) side
        const POS = 0b001;
        /// On the negative (inside) side
        const NEG = 0b010;
        /// On the boundary, within epsilon
        const ON = 0b100;
    }
}

/// Aggregate classification of one shape against another's boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapClass {
    /// Entirely on the positive / outside side
    Positive,
    /// Entirely on the negative / inside side
    Negative,
    /// Exactly coincident with the boundary
    On,
    /// Straddles the boundary
    Both,
}

/// Collapse an OR-ed per-point mask into a single classification.
///
/// POS|ON aggregates to Positive, NEG|ON to Negative, any mix of POS and
/// NEG to Both, ON alone stays On.
pub fn eval_overlap_mask(mask: OverlapMask) -> OverlapClass {
    let pos = mask.contains(OverlapMask::POS);
    let neg = mask.contains(OverlapMask::NEG);
    match (pos, neg) {
        (true, true) => OverlapClass::Both,
        (true, false) => OverlapClass::Positive,
        (false, true) => OverlapClass::Negative,
        (false, false) => OverlapClass::On,
    }
}

/// Mask for a signed distance: positive, negative, or on within epsilon
pub fn classify_distance(d: f32) -> OverlapMask {
    if d > COINCIDENCE_EPSILON {
        OverlapMask::POS
    } else if d < -COINCIDENCE_EPSILON {
        OverlapMask::NEG
    } else {
        OverlapMask::ON
    }
}

/// Classify a point against a general plane
pub fn classify_plane_point(plane: &Plane, point: Vec3) -> OverlapMask {
    classify_distance(plane.signed_distance(point))
}

/// Classify a point against an axis-aligned plane
pub fn classify_aaplane_point(plane: &AAPlane, point: Vec3) -> OverlapMask {
    classify_distance(plane.signed_distance(point))
}

/// Classify a triangle against a general plane (per-vertex merge)
pub fn overlap_plane_triangle(plane: &Plane, tri: &Triangle) -> OverlapClass {
    let mut mask = OverlapMask::empty();
    for v in &tri.v {
        mask |= classify_plane_point(plane, *v);
    }
    eval_overlap_mask(mask)
}

/// Classify a triangle against an axis-aligned plane (per-vertex merge)
pub fn overlap_aaplane_triangle(plane: &AAPlane, tri: &Triangle) -> OverlapClass {
    let mut mask = OverlapMask::empty();
    for v in &tri.v {
        mask |= classify_aaplane_point(plane, *v);
    }
    eval_overlap_mask(mask)
}

/// Classify a box against a general plane.
///
/// Projects the box onto the plane normal; the projected interval is
/// classified as one merged mask, so a box whose interval hugs the plane
/// within epsilon comes out On.
pub fn overlap_plane_aabox(plane: &Plane, aabox: &AABox) -> OverlapClass {
    let d = plane.signed_distance(aabox.center);
    let r = aabox.extent.x * plane.normal.x.abs()
        + aabox.extent.y * plane.normal.y.abs()
        + aabox.extent.z * plane.normal.z.abs();
    let mask = classify_distance(d - r) | classify_distance(d + r);
    eval_overlap_mask(mask)
}

/// Classify a box against an axis-aligned plane
pub fn overlap_aaplane_aabox(plane: &AAPlane, aabox: &AABox) -> OverlapClass {
    let i = plane.axis.index();
    let d = aabox.center[i] - plane.dist;
    let r = aabox.extent[i];
    let mask = classify_distance(d - r) | classify_distance(d + r);
    eval_overlap_mask(mask)
}

/// Classify a sphere against a general plane
pub fn overlap_plane_sphere(plane: &Plane, center: Vec3, radius: f32) -> OverlapClass {
    debug_assert!(radius >= 0.0);
    let d = plane.signed_distance(center);
    let mask = classify_distance(d - radius) | classify_distance(d + radius);
    eval_overlap_mask(mask)
}

/// Classify a point against a box: Positive = outside, Negative = inside,
/// On = on a face within epsilon
pub fn overlap_aabox_point(aabox: &AABox, point: Vec3) -> OverlapClass {
    let d = point - aabox.center;
    let mut mask = OverlapMask::empty();
    for i in 0..3 {
        // Distance past face i's pair of planes; positive = outside.
        mask |= classify_distance(d[i].abs() - aabox.extent[i]);
    }
    // Outside any face means outside the box. A face touch with the
    // remaining axes inside is On, not Negative: the interval-endpoint
    // merge does not apply to a single point.
    if mask.contains(OverlapMask::POS) {
        OverlapClass::Positive
    } else if mask.contains(OverlapMask::ON) {
        OverlapClass::On
    } else {
        OverlapClass::Negative
    }
}

/// Classify a triangle against a box: Positive = entirely outside,
/// Negative = entirely inside, Both = straddling.
///
/// Per-vertex merge, then a SAT consistency check: a triangle whose
/// vertices are all outside can still cut through the box.
pub fn overlap_aabox_triangle(aabox: &AABox, tri: &Triangle) -> OverlapClass {
    let mut mask = OverlapMask::empty();
    for v in &tri.v {
        mask |= match overlap_aabox_point(aabox, *v) {
            OverlapClass::Positive => OverlapMask::POS,
            OverlapClass::Negative => OverlapMask::NEG,
            OverlapClass::On | OverlapClass::Both => OverlapMask::ON,
        };
    }
    let class = eval_overlap_mask(mask);
    if class == OverlapClass::Positive && intersect::aabox_triangle(aabox, tri) {
        return OverlapClass::Both;
    }
    class
}

/// Classify a box against a frustum: Negative = fully inside,
/// Positive = fully outside, Both = straddling the boundary
pub fn overlap_frustum_aabox(frustum: &Frustum, aabox: &AABox) -> OverlapClass {
    let mut all_inside = true;
    for plane in &frustum.planes {
        match overlap_plane_aabox(plane, aabox) {
            // Entirely on a plane's negative side: outside the frustum.
            OverlapClass::Negative => return OverlapClass::Positive,
            OverlapClass::Positive => {}
            OverlapClass::On | OverlapClass::Both => all_inside = false,
        }
    }
    if all_inside {
        OverlapClass::Negative
    } else {
        OverlapClass::Both
    }
}
