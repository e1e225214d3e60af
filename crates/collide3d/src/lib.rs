//! # collide3d
//!
//! Collision detection and spatial partitioning kernel for real-time 3D
//! engines.
//!
//! ## Features
//!
//! - **Geometric Primitives**: axis-aligned and oriented boxes, planes,
//!   triangles, line segments, view frustums
//! - **Collision Math**: discrete overlap classification, boolean
//!   separating-axis intersection tests, and continuous (swept)
//!   time-of-impact tests with contact normals
//! - **AABTree**: a static bounding-volume hierarchy over mesh polygons
//!   supporting ray casts, swept-box casts, semi-infinite axis rays,
//!   intersection queries, and active-polygon-table extraction
//! - **Cull System**: a lightweight registry for scene objects that
//!   publish an axis-aligned bound to an abstract collector
//!
//! ## Quick Start
//!
//! ```rust
//! use collide3d::prelude::*;
//!
//! // Two unit boxes four units apart on the x axis.
//! let a = AABox::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
//! let b = AABox::new(Vec3::new(4.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
//!
//! // Sweep `a` toward `b` and recover the time of impact.
//! let mut result = CastResult::new();
//! collide3d::collision::sweep::collide_aabox_aabox(
//!     &a,
//!     &Vec3::new(4.0, 0.0, 0.0),
//!     &b,
//!     &Vec3::zeros(),
//!     &mut result,
//! );
//! assert!((result.fraction - 0.5).abs() < 1e-5);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod geometry;
pub mod collision;
pub mod tree;
pub mod cull;

/// Common imports for kernel users
pub mod prelude {
    pub use crate::{
        foundation::math::{Vec3, Mat3},
        geometry::{
            AABox, MinMaxAABox, OBBox, AAPlane, Plane, Axis, Triangle, LineSegment, Frustum,
        },
        collision::{
            CastResult, OverlapClass, RaycastFlags,
            cast::{RayCast, AABoxCast, OBBoxCast},
        },
        tree::{AabTree, AabTreeBuilder, BuildConfig, CollisionMesh, SimpleMesh},
        cull::{CullKey, CullListener, CullSystem},
    };
}
