//! Cull-system registry
//!
//! Scene objects register an axis-aligned bound and get back a stable
//! [`CullKey`]; every bound update is pushed to a [`CullListener`] so a
//! spatial index (grid, tree, broad-phase) can stay current without the
//! registry knowing what it is. Keys are slotmap generational handles, so
//! a key held past `remove` goes stale instead of aliasing a new object.

use slotmap::{new_key_type, SlotMap};

use crate::collision::overlap::{overlap_frustum_aabox, OverlapClass};
use crate::geometry::{Frustum, MinMaxAABox};

new_key_type! {
    /// Stable handle to a registered cullable
    pub struct CullKey;
}

/// Receiver for cull-box updates
pub trait CullListener {
    /// Called whenever a cullable's box is set, including on registration
    fn cull_box_changed(&mut self, key: CullKey, bounds: &MinMaxAABox);
}

/// Listener that ignores all updates
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCullListener;

impl CullListener for NullCullListener {
    fn cull_box_changed(&mut self, _key: CullKey, _bounds: &MinMaxAABox) {}
}

/// Registry of cullable objects and their world-space bounds
pub struct CullSystem<L: CullListener> {
    boxes: SlotMap<CullKey, MinMaxAABox>,
    listener: L,
}

impl<L: CullListener> CullSystem<L> {
    /// Empty registry publishing updates to `listener`
    pub fn new(listener: L) -> Self {
        Self {
            boxes: SlotMap::with_key(),
            listener,
        }
    }

    /// Register a cullable; the listener sees the initial box immediately
    pub fn add(&mut self, bounds: MinMaxAABox) -> CullKey {
        let key = self.boxes.insert(bounds);
        self.listener.cull_box_changed(key, &bounds);
        key
    }

    /// Unregister a cullable, returning its last bounds
    pub fn remove(&mut self, key: CullKey) -> Option<MinMaxAABox> {
        self.boxes.remove(key)
    }

    /// Update a cullable's bounds, notifying the listener.
    ///
    /// Returns false for a stale key.
    pub fn set_cull_box(&mut self, key: CullKey, bounds: MinMaxAABox) -> bool {
        let Some(slot) = self.boxes.get_mut(key) else {
            return false;
        };
        *slot = bounds;
        self.listener.cull_box_changed(key, &bounds);
        true
    }

    /// Current bounds of a cullable
    pub fn cull_box(&self, key: CullKey) -> Option<&MinMaxAABox> {
        self.boxes.get(key)
    }

    /// Number of registered cullables
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Iterate all registered cullables and their bounds
    pub fn iter(&self) -> impl Iterator<Item = (CullKey, &MinMaxAABox)> {
        self.boxes.iter()
    }

    /// The listener the registry publishes to
    pub fn listener(&self) -> &L {
        &self.listener
    }

    /// Mutable access to the listener
    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    /// Collect every cullable overlapping `bounds` (broad-phase sweep)
    pub fn collect_overlapping(&self, bounds: &MinMaxAABox, out: &mut Vec<CullKey>) {
        for (key, cull_box) in &self.boxes {
            if cull_box.intersects(bounds) {
                out.push(key);
            }
        }
    }

    /// Collect every cullable not entirely outside the frustum
    pub fn collect_visible(&self, frustum: &Frustum, out: &mut Vec<CullKey>) {
        for (key, cull_box) in &self.boxes {
            let aabox = cull_box.to_aabox();
            if overlap_frustum_aabox(frustum, &aabox) != OverlapClass::Positive {
                out.push(key);
            }
        }
    }
}
