//! Tree persistence
//!
//! Byte-exact layout, in order:
//!
//! 1. header `{ node_count: u32, poly_count: u32 }`
//! 2. `poly_count` flat `u32` polygon indices
//! 3. `node_count` 32-byte node records
//!    `{ min: [f32; 3], max: [f32; 3], front_or_poly0: u32, back_or_poly_count: u32 }`
//!
//! Leaf nodes set [`LEAF_FLAG`] in `front_or_poly0`; the remaining bits
//! hold the first polygon index and the second field holds the run count.
//! Records are `bytemuck` POD structs; the format is little-endian (the
//! records are written in host order, as on every supported target).
//!
//! Decoding validates every child index and polygon run, so a corrupt or
//! truncated stream surfaces as a [`TreeIoError`] instead of a panicking
//! tree.

use std::io::{Read, Write};
use std::mem::size_of;

use bytemuck::{Pod, Zeroable};
use log::debug;
use thiserror::Error;

use crate::foundation::math::Vec3;

use super::aabtree::AabTree;
use super::node::{Node, NodeKind};

/// High bit of a node record's first index field marks a leaf
pub const LEAF_FLAG: u32 = 0x8000_0000;

/// Failures while reading or writing a persisted tree
#[derive(Debug, Error)]
pub enum TreeIoError {
    /// Underlying stream failure (includes truncation)
    #[error("tree i/o failed: {0}")]
    Io(#[from] std::io::Error),
    /// An internal node referenced a child outside the node array or
    /// at/before its own position, which would make the tree cyclic
    #[error("node {1} references invalid child {0}")]
    BadChildIndex(u32, u32),
    /// A leaf's polygon run overflowed the polygon-index array
    #[error("leaf polygon run {first}+{count} out of range for {total} indices")]
    BadPolyRun {
        /// Start of the bad run
        first: u32,
        /// Length of the bad run
        count: u32,
        /// Size of the polygon-index array
        total: u32,
    },
    /// A node count or index too large to address
    #[error("node index {0} does not fit the leaf flag encoding")]
    IndexOverflow(u32),
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct NodeRecord {
    min: [f32; 3],
    max: [f32; 3],
    front_or_poly0: u32,
    back_or_poly_count: u32,
}

impl NodeRecord {
    fn encode(node: &Node) -> Result<Self, TreeIoError> {
        let (front_or_poly0, back_or_poly_count) = match node.kind {
            NodeKind::Internal { front, back } => {
                if front & LEAF_FLAG != 0 || back & LEAF_FLAG != 0 {
                    return Err(TreeIoError::IndexOverflow(front.max(back)));
                }
                (front, back)
            }
            NodeKind::Leaf {
                first_poly,
                poly_count,
            } => {
                if first_poly & LEAF_FLAG != 0 {
                    return Err(TreeIoError::IndexOverflow(first_poly));
                }
                (first_poly | LEAF_FLAG, poly_count)
            }
        };
        Ok(Self {
            min: node.min.into(),
            max: node.max.into(),
            front_or_poly0,
            back_or_poly_count,
        })
    }

    fn decode(&self, index: u32, node_count: u32, poly_total: u32) -> Result<Node, TreeIoError> {
        let kind = if self.front_or_poly0 & LEAF_FLAG != 0 {
            let first_poly = self.front_or_poly0 & !LEAF_FLAG;
            let poly_count = self.back_or_poly_count;
            if first_poly.checked_add(poly_count).map_or(true, |end| end > poly_total) {
                return Err(TreeIoError::BadPolyRun {
                    first: first_poly,
                    count: poly_count,
                    total: poly_total,
                });
            }
            NodeKind::Leaf {
                first_poly,
                poly_count,
            }
        } else {
            let (front, back) = (self.front_or_poly0, self.back_or_poly_count);
            // Preorder arena: children strictly follow their parent.
            // Anything at or before the current record would be a cycle
            // and make every recursive query diverge.
            for child in [front, back] {
                if child <= index || child >= node_count {
                    return Err(TreeIoError::BadChildIndex(child, index));
                }
            }
            NodeKind::Internal { front, back }
        };
        Ok(Node {
            min: Vec3::from(self.min),
            max: Vec3::from(self.max),
            kind,
        })
    }
}

/// Write a tree to a stream in the persisted layout
pub fn write_tree<W: Write>(writer: &mut W, tree: &AabTree) -> Result<(), TreeIoError> {
    let header = [tree.nodes.len() as u32, tree.poly_indices.len() as u32];
    writer.write_all(bytemuck::bytes_of(&header))?;
    writer.write_all(bytemuck::cast_slice(&tree.poly_indices))?;
    for node in &tree.nodes {
        let record = NodeRecord::encode(node)?;
        writer.write_all(bytemuck::bytes_of(&record))?;
    }
    Ok(())
}

/// Read a tree from a stream, validating all indices
pub fn read_tree<R: Read>(reader: &mut R) -> Result<AabTree, TreeIoError> {
    let mut header_bytes = [0u8; 8];
    reader.read_exact(&mut header_bytes)?;
    let header: [u32; 2] = bytemuck::pod_read_unaligned(&header_bytes);
    let (node_count, poly_total) = (header[0], header[1]);

    let mut poly_bytes = vec![0u8; poly_total as usize * size_of::<u32>()];
    reader.read_exact(&mut poly_bytes)?;
    let poly_indices: Vec<u32> = poly_bytes
        .chunks_exact(size_of::<u32>())
        .map(bytemuck::pod_read_unaligned)
        .collect();

    let mut node_bytes = vec![0u8; node_count as usize * size_of::<NodeRecord>()];
    reader.read_exact(&mut node_bytes)?;
    let mut nodes = Vec::with_capacity(node_count as usize);
    for (index, chunk) in node_bytes.chunks_exact(size_of::<NodeRecord>()).enumerate() {
        let record: NodeRecord = bytemuck::pod_read_unaligned(chunk);
        nodes.push(record.decode(index as u32, node_count, poly_total)?);
    }

    debug!("aabtree loaded: {node_count} nodes, {poly_total} poly indices");
    Ok(AabTree::from_parts(nodes, poly_indices))
}
