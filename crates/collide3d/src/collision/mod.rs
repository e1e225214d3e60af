//! Stateless collision-math function library
//!
//! Three tiers of tests between the geometric primitives:
//!
//! 1. **Overlap classification** ([`overlap`]): which side of a shape
//!    another shape lies on (positive/negative/on/both), built from one
//!    classify-then-merge combinator.
//! 2. **Boolean intersection** ([`intersect`]): fast yes/no separating
//!    axis tests used for spatial culling.
//! 3. **Continuous casts** ([`sweep`], [`ray`]): time-of-impact fraction,
//!    contact normal, and optional contact point for shapes swept along a
//!    motion vector.
//!
//! All functions are pure; per-call scratch state lives on the stack. The
//! [`CastResult`] accumulator threads through continuous tests so callers
//! can fold many candidate shapes into the single closest hit.

pub mod cast;
pub mod intersect;
pub mod overlap;
pub mod ray;
pub mod sweep;

pub use cast::{AABoxCast, CastResult, OBBoxCast, RayCast};
pub use overlap::{eval_overlap_mask, OverlapClass, OverlapMask};
pub use ray::{AxisDir, BoxSide, RaycastFlags};
pub use sweep::SweepAxis;
