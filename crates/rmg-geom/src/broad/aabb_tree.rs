use std::cell::Cell;
use std::collections::{BTreeMap, BTreeSet};

use rmg_bvh::object::BoundedObject;
use rmg_bvh::tree::{TreeConfig, WideBvh};

use crate::types::aabb::Aabb;

/// Fixed fan-out used by `AabbTree`'s backing `WideBvh`. Four is a
/// reasonable default for the entity counts a broad-phase typically tracks;
/// callers needing a different fan-out build directly on `rmg_bvh`.
const FAN_OUT: usize = 4;

/// A deterministic broad-phase collision acceleration structure.
///
/// Implementations report overlapping id pairs canonicalized as
/// `(min_id, max_id)`, sorted ascending, with inclusive face-touch overlap.
/// See the module-level determinism contract in `broad`.
pub trait BroadPhase {
    /// Inserts `id` at `aabb` if it is new, or updates its tracked bound if
    /// it already exists (including a previously `remove`d id, which is
    /// reactivated in place).
    fn upsert(&mut self, id: u64, aabb: Aabb);

    /// Marks `id` as no longer present. `pairs()` will not report it again
    /// until a subsequent `upsert`.
    fn remove(&mut self, id: u64);

    /// All overlapping id pairs, canonicalized and sorted ascending.
    fn pairs(&self) -> Vec<(u64, u64)>;
}

struct Proxy {
    id: u64,
    bounds: Cell<rmg_bvh::Aabb>,
}

impl BoundedObject for Proxy {
    fn bounding_box(&self) -> rmg_bvh::Aabb {
        self.bounds.get()
    }
}

/// `BroadPhase` backed by a `rmg_bvh::WideBvh`.
///
/// `rmg_bvh::WideBvh` has no deletion path (see its crate docs): a removed
/// id's leaf slot persists until the tree is destroyed. `remove` therefore
/// tombstones the id rather than physically evicting it; `upsert` on a
/// tombstoned id reactivates its existing slot instead of inserting a new
/// one.
pub struct AabbTree {
    tree: WideBvh<Proxy, FAN_OUT>,
    by_id: BTreeMap<u64, usize>,
    removed: BTreeSet<u64>,
}

impl Default for AabbTree {
    fn default() -> Self {
        Self::new()
    }
}

impl AabbTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: WideBvh::new(TreeConfig::default()),
            by_id: BTreeMap::new(),
            removed: BTreeSet::new(),
        }
    }

    fn canonical_pair(a: u64, b: u64) -> (u64, u64) {
        if a < b {
            (a, b)
        } else {
            (b, a)
        }
    }
}

impl BroadPhase for AabbTree {
    fn upsert(&mut self, id: u64, aabb: Aabb) {
        let bvh_box: rmg_bvh::Aabb = aabb.into();
        if let Some(&leaf_index) = self.by_id.get(&id) {
            self.removed.remove(&id);
            self.tree.leaf(leaf_index).bounds.set(bvh_box);
            self.tree.refit();
        } else {
            let leaf_index = self.tree.insert(Proxy {
                id,
                bounds: Cell::new(bvh_box),
            });
            self.by_id.insert(id, leaf_index);
        }
    }

    fn remove(&mut self, id: u64) {
        if self.by_id.contains_key(&id) {
            self.removed.insert(id);
        }
    }

    fn pairs(&self) -> Vec<(u64, u64)> {
        let mut out = BTreeSet::new();
        for (&id, &leaf_index) in &self.by_id {
            if self.removed.contains(&id) {
                continue;
            }
            let query_box = self.tree.leaf(leaf_index).bounding_box();
            let mut hits = Vec::new();
            self.tree.query(query_box, &mut hits);
            for hit in hits {
                let other = self.tree.leaf(hit);
                if other.id == id || self.removed.contains(&other.id) {
                    continue;
                }
                out.insert(Self::canonical_pair(id, other.id));
            }
        }
        out.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmg_core::math::Vec3;

    fn box_at(x: f32) -> Aabb {
        Aabb::from_center_half_extents(Vec3::new(x, 0.0, 0.0), Vec3::splat(0.5))
    }

    #[test]
    fn overlapping_pair_is_reported_once_canonicalized() {
        let mut tree = AabbTree::new();
        tree.upsert(5, box_at(0.0));
        tree.upsert(2, box_at(0.4));
        assert_eq!(tree.pairs(), vec![(2, 5)]);
    }

    #[test]
    fn disjoint_objects_produce_no_pairs() {
        let mut tree = AabbTree::new();
        tree.upsert(1, box_at(0.0));
        tree.upsert(2, box_at(100.0));
        assert!(tree.pairs().is_empty());
    }

    #[test]
    fn removed_ids_are_excluded_from_pairs() {
        let mut tree = AabbTree::new();
        tree.upsert(1, box_at(0.0));
        tree.upsert(2, box_at(0.4));
        tree.remove(2);
        assert!(tree.pairs().is_empty());
    }

    #[test]
    fn upsert_after_remove_reactivates_the_same_id() {
        let mut tree = AabbTree::new();
        tree.upsert(1, box_at(0.0));
        tree.upsert(2, box_at(0.4));
        tree.remove(2);
        tree.upsert(2, box_at(0.4));
        assert_eq!(tree.pairs(), vec![(1, 2)]);
    }

    #[test]
    fn upsert_moves_an_existing_id_and_pairs_update_accordingly() {
        let mut tree = AabbTree::new();
        tree.upsert(1, box_at(0.0));
        tree.upsert(2, box_at(0.4));
        assert_eq!(tree.pairs(), vec![(1, 2)]);
        tree.upsert(2, box_at(100.0));
        assert!(tree.pairs().is_empty());
    }

    #[test]
    fn pair_order_is_deterministic_regardless_of_insertion_order() {
        let mut forward = AabbTree::new();
        forward.upsert(10, box_at(0.0));
        forward.upsert(20, box_at(0.4));
        forward.upsert(30, box_at(0.8));

        let mut backward = AabbTree::new();
        backward.upsert(30, box_at(0.8));
        backward.upsert(20, box_at(0.4));
        backward.upsert(10, box_at(0.0));

        assert_eq!(forward.pairs(), backward.pairs());
    }
}
