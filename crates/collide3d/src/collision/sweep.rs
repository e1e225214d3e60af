//! Continuous (swept) collision tests
//!
//! The algorithmic heart of the kernel: a relative-motion separating-axis
//! test shared by box/box, box/triangle, OBB/OBB, and OBB/triangle pairs.
//! For each candidate axis the relative displacement and relative motion
//! are projected along with the combined extents; per axis the shapes are
//! either separated for the whole motion (no collision at all), entering
//! at some fraction (the true time of impact is the *latest* entry across
//! axes, exactly like a slab ray/box test generalized to SAT), or already
//! overlapping. If no axis is separated at fraction 0 the result is
//! `start_bad`.
//!
//! The contact normal is the axis that produced the largest entry
//! fraction, oriented toward the moving shape. The axis test order is
//! fixed (triangle normal, box axes, then cross products in row-major
//! order; ties go to the last axis tested) because tie-breaking between
//! simultaneous separating axes is order-dependent at geometrically
//! degenerate configurations.

use crate::foundation::math::{Vec3, AXIS_EPSILON2};
use crate::geometry::{AABox, OBBox, Triangle};

use super::cast::CastResult;

/// Identity of a candidate separating axis in a swept test.
///
/// Recorded alongside the running maximum entry fraction so the contact
/// point can be reconstructed afterwards from the axis that actually
/// produced the impact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepAxis {
    /// The triangle's face normal
    TriNormal,
    /// Basis axis `i` of the moving box
    BoxAxis(usize),
    /// Basis axis `j` of the target box (box/box tests only)
    TargetBoxAxis(usize),
    /// Cross product of moving-box axis `i` and triangle edge / target-box
    /// axis `j`
    Cross(usize, usize),
}

/// Per-call scratch state for one swept SAT evaluation
#[derive(Debug)]
struct SweepTracker {
    /// Largest entry fraction seen so far; negative until any axis enters
    max_entry: f32,
    /// Smallest exit fraction across all axes
    min_exit: f32,
    /// Unnormalized axis that produced `max_entry`
    axis: Vec3,
    /// Identity of that axis
    axis_id: SweepAxis,
    /// +1 if the moving shape starts on the positive side of that axis
    side: f32,
    /// Supporting target feature (triangle vertex index) at the bound hit
    support: usize,
    /// Whether any axis was separated at fraction 0
    any_separated: bool,
}

impl SweepTracker {
    fn new() -> Self {
        Self {
            max_entry: -1.0,
            min_exit: f32::MAX,
            axis: Vec3::zeros(),
            axis_id: SweepAxis::BoxAxis(0),
            side: 0.0,
            support: 0,
            any_separated: false,
        }
    }

    /// Fold one axis into the running state.
    ///
    /// `u0` is the moving shape's center projection at fraction 0, `m` the
    /// relative motion along the axis, `[lo, hi]` the target interval
    /// expanded by the moving shape's projected radius, and
    /// `support_lo`/`support_hi` the target features supporting each
    /// bound. Returns true when the axis proves the shapes never collide,
    /// which short-circuits the whole test.
    fn track_axis(
        &mut self,
        axis: &Vec3,
        axis_id: SweepAxis,
        u0: f32,
        m: f32,
        lo: f32,
        hi: f32,
        support_lo: usize,
        support_hi: usize,
    ) -> bool {
        if u0 > hi {
            // Separated on the positive side.
            if m >= 0.0 {
                return true; // moving apart (or not at all): never collides
            }
            let entry = (hi - u0) / m;
            if entry > 1.0 {
                return true; // does not reach within this motion
            }
            self.any_separated = true;
            if entry >= self.max_entry {
                self.max_entry = entry;
                self.axis = *axis;
                self.axis_id = axis_id;
                self.side = 1.0;
                self.support = support_hi;
            }
            self.min_exit = self.min_exit.min((lo - u0) / m);
        } else if u0 < lo {
            // Separated on the negative side.
            if m <= 0.0 {
                return true;
            }
            let entry = (lo - u0) / m;
            if entry > 1.0 {
                return true;
            }
            self.any_separated = true;
            if entry >= self.max_entry {
                self.max_entry = entry;
                self.axis = *axis;
                self.axis_id = axis_id;
                self.side = -1.0;
                self.support = support_lo;
            }
            self.min_exit = self.min_exit.min((hi - u0) / m);
        } else {
            // Overlapping at fraction 0: no entry, only an exit bound.
            let exit = if m > 0.0 {
                (hi - u0) / m
            } else if m < 0.0 {
                (lo - u0) / m
            } else {
                f32::MAX
            };
            self.min_exit = self.min_exit.min(exit);
        }
        false
    }

    /// Resolve the accumulated axes into a result update.
    ///
    /// `contact` reconstructs the contact point from the winning axis and
    /// is only invoked when the result asks for one.
    fn finish<F>(&self, motion: &Vec3, result: &mut CastResult, contact: F) -> bool
    where
        F: FnOnce(f32, &Vec3, &SweepAxis, f32, usize) -> Vec3,
    {
        if !self.any_separated {
            // Initial penetration dominates any later-fraction hit.
            result.start_bad = true;
            result.fraction = 0.0;
            return true;
        }
        let fraction = self.max_entry.max(0.0);
        if fraction > self.min_exit {
            return false; // entered one axis only after exiting another
        }
        let normal = self.axis.normalize() * self.side;
        if !result.accepts(fraction, &normal, motion) {
            return false;
        }
        result.fraction = fraction;
        result.normal = normal;
        if result.compute_contact_point {
            result.contact_point =
                Some(contact(fraction, &normal, &self.axis_id, self.side, self.support));
        }
        true
    }
}

/// Closest-approach parameters of two lines `p + s*u` and `q + t*w`.
///
/// Falls back to `s = 0` for near-parallel lines.
fn closest_points_on_lines(p: &Vec3, u: &Vec3, q: &Vec3, w: &Vec3) -> (f32, f32) {
    let r = p - q;
    let a = u.dot(u);
    let e = w.dot(w);
    let b = u.dot(w);
    let c = u.dot(&r);
    let f = w.dot(&r);
    let denom = a * e - b * b;
    if denom.abs() <= 1e-9 {
        return (0.0, if e > 0.0 { f / e } else { 0.0 });
    }
    ((b * f - c * e) / denom, (a * f - b * c) / denom)
}

/// Closest point to `p` inside (or on) an oriented box
fn closest_point_in_obbox(obb: &OBBox, p: &Vec3) -> Vec3 {
    let local = obb.world_to_local(*p);
    let clamped = Vec3::new(
        local.x.clamp(-obb.extent.x, obb.extent.x),
        local.y.clamp(-obb.extent.y, obb.extent.y),
        local.z.clamp(-obb.extent.z, obb.extent.z),
    );
    obb.local_to_world(clamped)
}

/// Sweep an axis-aligned box against another axis-aligned box.
///
/// Both boxes may move; the test runs in the relative frame. Returns
/// whether the result was updated (or `start_bad` was flagged); the
/// result is only ever lowered, so the same accumulator can fold many
/// candidate targets.
pub fn collide_aabox_aabox(
    box0: &AABox,
    move0: &Vec3,
    box1: &AABox,
    move1: &Vec3,
    result: &mut CastResult,
) -> bool {
    let m_rel = move0 - move1;
    let mut tracker = SweepTracker::new();
    for i in 0..3 {
        let axis = Vec3::ith(i, 1.0);
        let r = box0.extent[i] + box1.extent[i];
        let (lo, hi) = (box1.center[i] - r, box1.center[i] + r);
        if tracker.track_axis(
            &axis,
            SweepAxis::BoxAxis(i),
            box0.center[i],
            m_rel[i],
            lo,
            hi,
            0,
            0,
        ) {
            return false;
        }
    }
    tracker.finish(&m_rel, result, |fraction, _, _, _, _| {
        // Face contact: the target center clamped into the moved box lies
        // on the contact face.
        let moved = box0.translate(move0 * fraction).to_obbox();
        let target_center = box1.center + move1 * fraction;
        closest_point_in_obbox(&moved, &target_center)
    })
}

/// Sweep an oriented box against another oriented box (15-axis SAT).
///
/// Axis order: moving box's basis axes, target box's basis axes, then the
/// nine cross products in row-major order. Degenerate cross products are
/// skipped.
pub fn collide_obbox_obbox(
    box0: &OBBox,
    move0: &Vec3,
    box1: &OBBox,
    move1: &Vec3,
    result: &mut CastResult,
) -> bool {
    let m_rel = move0 - move1;
    let mut tracker = SweepTracker::new();

    let mut test = |tracker: &mut SweepTracker, axis: Vec3, axis_id: SweepAxis| -> Option<bool> {
        if axis.magnitude_squared() <= AXIS_EPSILON2 {
            return None; // parallel edges: no separating information
        }
        let (_, ra) = box0.project_onto_axis(&axis);
        let (cb, rb) = box1.project_onto_axis(&axis);
        let r = ra + rb;
        let u0 = box0.center.dot(&axis);
        let m = m_rel.dot(&axis);
        Some(tracker.track_axis(&axis, axis_id, u0, m, cb - r, cb + r, 0, 0))
    };

    for i in 0..3 {
        if test(&mut tracker, box0.axis(i), SweepAxis::BoxAxis(i)) == Some(true) {
            return false;
        }
    }
    for j in 0..3 {
        if test(&mut tracker, box1.axis(j), SweepAxis::TargetBoxAxis(j)) == Some(true) {
            return false;
        }
    }
    for i in 0..3 {
        for j in 0..3 {
            let axis = box0.axis(i).cross(&box1.axis(j));
            if test(&mut tracker, axis, SweepAxis::Cross(i, j)) == Some(true) {
                return false;
            }
        }
    }

    tracker.finish(&m_rel, result, |fraction, _, _, _, _| {
        let moved = OBBox::new(box0.center + move0 * fraction, box0.extent, box0.basis);
        let target_center = box1.center + move1 * fraction;
        closest_point_in_obbox(&moved, &target_center)
    })
}

/// Sweep an axis-aligned box against an oriented box
pub fn collide_aabox_obbox(
    box0: &AABox,
    move0: &Vec3,
    box1: &OBBox,
    move1: &Vec3,
    result: &mut CastResult,
) -> bool {
    collide_obbox_obbox(&box0.to_obbox(), move0, box1, move1, result)
}

/// Sweep an oriented box against a triangle (13-axis SAT).
///
/// Axis order: triangle normal, the box's three basis axes, then the nine
/// cross products of box axis and triangle edge. Each axis remembers the
/// supporting triangle vertex so a contact point can be reconstructed on
/// request.
pub fn collide_obbox_triangle(
    obb: &OBBox,
    move_box: &Vec3,
    tri: &Triangle,
    move_tri: &Vec3,
    result: &mut CastResult,
) -> bool {
    let m_rel = move_box - move_tri;
    let mut tracker = SweepTracker::new();

    let mut test = |tracker: &mut SweepTracker, axis: Vec3, axis_id: SweepAxis| -> Option<bool> {
        if axis.magnitude_squared() <= AXIS_EPSILON2 {
            return None;
        }
        let (_, ra) = obb.project_onto_axis(&axis);
        let (tmin, tmax, argmin, argmax) = tri.project_onto_axis(&axis);
        let u0 = obb.center.dot(&axis);
        let m = m_rel.dot(&axis);
        Some(tracker.track_axis(
            &axis,
            axis_id,
            u0,
            m,
            tmin - ra,
            tmax + ra,
            argmin,
            argmax,
        ))
    };

    if test(&mut tracker, tri.normal, SweepAxis::TriNormal) == Some(true) {
        return false;
    }
    for i in 0..3 {
        if test(&mut tracker, obb.axis(i), SweepAxis::BoxAxis(i)) == Some(true) {
            return false;
        }
    }
    let edges = [tri.edge0(), tri.edge1(), tri.edge1() - tri.edge0()];
    for i in 0..3 {
        for (j, edge) in edges.iter().enumerate() {
            let axis = obb.axis(i).cross(edge);
            if test(&mut tracker, axis, SweepAxis::Cross(i, j)) == Some(true) {
                return false;
            }
        }
    }

    tracker.finish(&m_rel, result, |fraction, normal, axis_id, _, support| {
        contact_point_box_triangle(obb, move_box, tri, move_tri, fraction, normal, axis_id, support)
    })
}

/// Sweep an axis-aligned box against a triangle.
///
/// Identity-basis oriented box; the axis order (and therefore tie-break
/// behavior) matches the oriented test with world axes as the box basis.
pub fn collide_aabox_triangle(
    aabox: &AABox,
    move_box: &Vec3,
    tri: &Triangle,
    move_tri: &Vec3,
    result: &mut CastResult,
) -> bool {
    collide_obbox_triangle(&aabox.to_obbox(), move_box, tri, move_tri, result)
}

/// Reconstruct a box/triangle contact point from the winning axis.
///
/// Deferred and re-derived from the recorded axis identity because it is
/// far more expensive than the fraction/normal computation:
/// - triangle-normal axis: the box's support point against the normal
/// - box face axis: the recorded supporting triangle vertex
/// - cross axis: closest approach of the box edge and the triangle edge
fn contact_point_box_triangle(
    obb: &OBBox,
    move_box: &Vec3,
    tri: &Triangle,
    move_tri: &Vec3,
    fraction: f32,
    normal: &Vec3,
    axis_id: &SweepAxis,
    support: usize,
) -> Vec3 {
    let moved = OBBox::new(obb.center + move_box * fraction, obb.extent, obb.basis);
    let tri_offset = move_tri * fraction;
    match *axis_id {
        SweepAxis::TriNormal => moved.support_point(&-normal),
        SweepAxis::BoxAxis(_) | SweepAxis::TargetBoxAxis(_) => tri.v[support] + tri_offset,
        SweepAxis::Cross(i, j) => {
            // Box edge along axis i on the corner facing the triangle.
            let toward_contact = -normal;
            let mut edge_point = moved.center;
            for k in 0..3 {
                if k == i {
                    continue;
                }
                let a = moved.axis(k);
                let sign = if a.dot(&toward_contact) >= 0.0 { 1.0 } else { -1.0 };
                edge_point += a * (sign * moved.extent[k]);
            }
            let (base, dir) = match j {
                0 => (tri.v[0], tri.edge0()),
                1 => (tri.v[0], tri.edge1()),
                _ => (tri.v[1], tri.edge1() - tri.edge0()),
            };
            let base = base + tri_offset;
            let (_, t) = closest_points_on_lines(&edge_point, &moved.axis(i), &base, &dir);
            base + dir * t.clamp(0.0, 1.0)
        }
    }
}
