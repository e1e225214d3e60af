//! Cast results and swept-query objects
//!
//! [`CastResult`] is the mutable accumulator threaded through every
//! continuous collision test. The query objects ([`RayCast`],
//! [`AABoxCast`], [`OBBoxCast`]) pair a shape and motion with a result and
//! a precomputed conservative sweep envelope used for tree culling.

use crate::foundation::math::Vec3;
use crate::geometry::{AABox, LineSegment, MinMaxAABox, OBBox};

use super::ray::RaycastFlags;

/// Fractions closer together than this count as simultaneous hits and are
/// tie-broken toward the normal more opposing the motion.
pub(crate) const FRACTION_EPSILON: f32 = 1e-5;

/// Accumulator for continuous collision tests.
///
/// `fraction` starts at 1.0 ("no hit yet") and may only decrease; a test
/// that finds nothing closer than what is already recorded leaves the
/// result untouched. This is what lets callers test many candidate
/// polygons or nodes in sequence and converge on the single closest hit.
#[derive(Debug, Clone, PartialEq)]
pub struct CastResult {
    /// Time of impact in [0, 1] along the motion; 1.0 means no hit
    pub fraction: f32,
    /// The query shape already overlaps the target at fraction 0.
    ///
    /// A distinct, higher-priority state than any later-fraction hit;
    /// callers typically reject the whole attempted motion.
    pub start_bad: bool,
    /// Contact normal at the recorded hit, pointing toward the moving shape
    pub normal: Vec3,
    /// Surface type of the polygon that produced the hit
    pub surface_type: u8,
    /// Request contact-point computation (the most expensive part of a
    /// swept test; skipped unless asked for)
    pub compute_contact_point: bool,
    /// Contact point, filled only when `compute_contact_point` is set
    pub contact_point: Option<Vec3>,
}

impl CastResult {
    /// Fresh result: no hit recorded, contact points not requested
    pub fn new() -> Self {
        Self {
            fraction: 1.0,
            start_bad: false,
            normal: Vec3::zeros(),
            surface_type: 0,
            compute_contact_point: false,
            contact_point: None,
        }
    }

    /// Fresh result that also asks for contact points
    pub fn with_contact_point() -> Self {
        Self {
            compute_contact_point: true,
            ..Self::new()
        }
    }

    /// Clear all recorded state, keeping the contact-point request
    pub fn reset(&mut self) {
        let compute = self.compute_contact_point;
        *self = Self::new();
        self.compute_contact_point = compute;
    }

    /// Whether any collision has been recorded
    pub fn hit(&self) -> bool {
        self.start_bad || self.fraction < 1.0
    }

    /// Decide whether a candidate hit beats the recorded one.
    ///
    /// Strictly earlier fractions win; fractions equal within epsilon win
    /// only when the candidate normal opposes `motion` more strongly.
    pub(crate) fn accepts(&self, fraction: f32, normal: &Vec3, motion: &Vec3) -> bool {
        if fraction < self.fraction - FRACTION_EPSILON {
            return true;
        }
        if (fraction - self.fraction).abs() <= FRACTION_EPSILON && self.fraction < 1.0 {
            return normal.dot(motion) < self.normal.dot(motion);
        }
        fraction < self.fraction
    }
}

impl Default for CastResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Ray-cast query: a bounded segment plus its result accumulator
#[derive(Debug, Clone)]
pub struct RayCast {
    /// The ray, as start point plus direction-times-length
    pub segment: LineSegment,
    /// Conservative envelope around the segment, used for tree culling
    pub bounds: MinMaxAABox,
    /// Accumulated closest hit
    pub result: CastResult,
    /// Flag bits accumulated across triangle tests (edge hits etc.)
    pub flags: RaycastFlags,
}

impl RayCast {
    /// Create a ray-cast query for a segment
    pub fn new(segment: LineSegment) -> Self {
        Self {
            segment,
            bounds: segment.bounds(),
            result: CastResult::new(),
            flags: RaycastFlags::empty(),
        }
    }

    /// True when a node box is provably outside the query region
    pub fn cull(&self, min: &Vec3, max: &Vec3) -> bool {
        !self.bounds.intersects(&MinMaxAABox::new(*min, *max))
    }
}

/// Swept axis-aligned box query
#[derive(Debug, Clone)]
pub struct AABoxCast {
    /// The box at the start of its motion
    pub aabox: AABox,
    /// Motion vector; fraction 1.0 corresponds to the full motion
    pub motion: Vec3,
    /// Conservative envelope around the whole sweep, for tree culling
    pub bounds: MinMaxAABox,
    /// Accumulated closest hit
    pub result: CastResult,
}

impl AABoxCast {
    /// Create a swept-box query and precompute its sweep envelope
    pub fn new(aabox: AABox, motion: Vec3) -> Self {
        let mut bounds = aabox.to_min_max();
        bounds.add_box(&aabox.translate(motion).to_min_max());
        Self {
            aabox,
            motion,
            bounds,
            result: CastResult::new(),
        }
    }

    /// True when a node box is provably outside the sweep envelope
    pub fn cull(&self, min: &Vec3, max: &Vec3) -> bool {
        !self.bounds.intersects(&MinMaxAABox::new(*min, *max))
    }
}

/// Swept oriented box query
#[derive(Debug, Clone)]
pub struct OBBoxCast {
    /// The box at the start of its motion
    pub obbox: OBBox,
    /// Motion vector; fraction 1.0 corresponds to the full motion
    pub motion: Vec3,
    /// Conservative envelope: the box's world-axis extents swept along the
    /// motion
    pub bounds: MinMaxAABox,
    /// Accumulated closest hit
    pub result: CastResult,
}

impl OBBoxCast {
    /// Create a swept oriented-box query and precompute its sweep envelope
    pub fn new(obbox: OBBox, motion: Vec3) -> Self {
        let start = obbox.world_bounds();
        let mut bounds = start.to_min_max();
        bounds.add_box(&start.translate(motion).to_min_max());
        Self {
            obbox,
            motion,
            bounds,
            result: CastResult::new(),
        }
    }

    /// True when a node box is provably outside the sweep envelope
    pub fn cull(&self, min: &Vec3, max: &Vec3) -> bool {
        !self.bounds.intersects(&MinMaxAABox::new(*min, *max))
    }
}
