//! Tree node representation
//!
//! Nodes live in a flat preorder arena and reference each other (and the
//! shared polygon-index array) by `u32` index. Leaf versus internal is an
//! explicit tagged enum in memory; the packed reserved-bit encoding exists
//! only in the serialized form (see [`super::io`]).

use crate::foundation::math::Vec3;
use crate::geometry::{AABox, MinMaxAABox};

/// What a node points at: two children or a run of polygon indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Interior node with two children in the node arena
    Internal {
        /// Arena index of the front child
        front: u32,
        /// Arena index of the back child
        back: u32,
    },
    /// Leaf node owning a contiguous run of the polygon-index array
    Leaf {
        /// Start of the run in the shared polygon-index array
        first_poly: u32,
        /// Number of polygon indices in the run
        poly_count: u32,
    },
}

/// One node of the tree: world-space bounds plus its kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    /// Minimum corner of the node's bounding box
    pub min: Vec3,
    /// Maximum corner of the node's bounding box
    pub max: Vec3,
    /// Children or polygon run
    pub kind: NodeKind,
}

impl Node {
    /// Node bounds in min/max form
    pub fn bounds(&self) -> MinMaxAABox {
        MinMaxAABox::new(self.min, self.max)
    }

    /// Node bounds in center/extent form
    pub fn aabox(&self) -> AABox {
        AABox::from_min_max(self.min, self.max)
    }

    /// Whether this node is a leaf
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }
}
