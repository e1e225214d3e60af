//! Math utilities and types
//!
//! Provides fundamental math types for the collision kernel.

pub use nalgebra::{Matrix3, Matrix4, Vector2, Vector3};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Tolerance for box/plane classification.
///
/// Configurations closer to a boundary than this are treated as touching
/// rather than flipping unpredictably between sides under float noise.
pub const COINCIDENCE_EPSILON: f32 = 1e-3;

/// Squared-length threshold below which a candidate separating axis is
/// considered degenerate (parallel edges) and carries no information.
pub const AXIS_EPSILON2: f32 = 1e-6;

/// Denominator threshold for ray/plane crossings; smaller means parallel.
pub const PARALLEL_EPSILON: f32 = 1e-9;

/// Index of the component of `v` with the largest absolute value.
///
/// Used to pick a triangle's dominant plane: the 2D coordinate plane most
/// orthogonal to its normal, which minimizes precision loss in 2D
/// point-in-triangle tests.
pub fn find_dominant_axis(v: &Vec3) -> usize {
    let ax = v.x.abs();
    let ay = v.y.abs();
    let az = v.z.abs();
    if ax >= ay && ax >= az {
        0
    } else if ay >= az {
        1
    } else {
        2
    }
}

/// The two component indices orthogonal to `axis`, in ascending order.
pub fn other_axes(axis: usize) -> (usize, usize) {
    debug_assert!(axis < 3);
    match axis {
        0 => (1, 2),
        1 => (0, 2),
        _ => (0, 1),
    }
}
