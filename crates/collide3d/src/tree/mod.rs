//! Axis-aligned bounding-box tree over mesh polygons
//!
//! A static BVH for collision queries against large triangle meshes:
//! build once with [`AabTreeBuilder`], then run ray casts, swept-box
//! casts, and intersection queries through [`AabTree`]. Trees persist via
//! [`io`] in a compact flat-record format.

pub mod aabtree;
pub mod builder;
pub mod io;
pub mod mesh;
pub mod node;

pub use aabtree::AabTree;
pub use builder::{AabTreeBuilder, BuildConfig};
pub use mesh::{CollisionMesh, SimpleMesh};
pub use node::{Node, NodeKind};

#[cfg(test)]
mod tests;
