//! The wide fixed-fan-out BVH itself: online greedy insertion, bottom-up
//! refit, and both query forms.

use crate::aabb::Aabb;
use crate::error::{BvhError, InvariantKind};
use crate::level::{initial_level_capacity, Level};
use crate::node::{decode_leaf, encode_leaf, is_internal_child, is_leaf_child, ChildCode, Node, EMPTY_CHILD};
use crate::object::{BoundedObject, LeafCollector};

/// Tuning knobs fixed at construction time.
///
/// `K` (the fan-out) is a separate compile-time parameter on [`WideBvh`]
/// itself; this struct only covers the runtime-tunable sizing hints.
#[derive(Debug, Clone, Copy)]
pub struct TreeConfig {
    /// Expected number of leaves; sizes the level-0 leaf capacity hint and
    /// the root's level-1 capacity hint.
    pub initial_leaf_capacity: usize,
    /// Number of levels to preallocate (capacity only, not nodes) at
    /// construction time.
    pub initial_tree_depth: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            initial_leaf_capacity: 4096,
            initial_tree_depth: 8,
        }
    }
}

impl TreeConfig {
    fn validate(self) {
        assert!(self.initial_leaf_capacity > 0, "initial_leaf_capacity must be positive");
        assert!(self.initial_tree_depth > 0, "initial_tree_depth must be positive");
    }
}

/// Per-leaf back-reference into the node arena, kept in sync by `refit`.
struct LeafRecord<T> {
    object: T,
    level: usize,
    node: usize,
    child: usize,
}

/// A wide, fixed-fan-out bounding volume hierarchy with online greedy
/// insertion and bottom-up refit.
///
/// `K` must be one of `2`, `4`, `8`, `16`, `32` (checked with
/// `debug_assert!` at construction; release builds trust the caller).
pub struct WideBvh<T: BoundedObject, const K: usize> {
    levels: Vec<Level<K>>,
    leaves: Vec<LeafRecord<T>>,
    max_depth: usize,
}

impl<T: BoundedObject, const K: usize> WideBvh<T, K> {
    /// Creates an empty tree with a single-node root level.
    ///
    /// # Panics
    /// Panics if `config.initial_leaf_capacity` or `config.initial_tree_depth`
    /// is zero.
    #[must_use]
    pub fn new(config: TreeConfig) -> Self {
        config.validate();
        debug_assert!(matches!(K, 2 | 4 | 8 | 16 | 32), "fan-out {K} is not one of 2/4/8/16/32");
        let mut root_level = Level::with_capacity(1);
        root_level.push(Node::empty());
        let mut levels = Vec::with_capacity(config.initial_tree_depth);
        levels.push(root_level);
        for depth in 1..config.initial_tree_depth {
            let capacity = initial_level_capacity(K, config.initial_leaf_capacity, depth);
            levels.push(Level::with_capacity(capacity));
        }
        Self {
            levels,
            leaves: Vec::with_capacity(config.initial_leaf_capacity),
            max_depth: 0,
        }
    }

    /// Number of leaves inserted so far.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    /// The deepest level index currently holding any node.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// The inserted object behind `leaf_index`.
    #[must_use]
    pub fn leaf(&self, leaf_index: usize) -> &T {
        &self.leaves[leaf_index].object
    }

    /// The `(level, node, child)` back-reference for `leaf_index`.
    #[must_use]
    pub fn leaf_back_reference(&self, leaf_index: usize) -> (usize, usize, usize) {
        let record = &self.leaves[leaf_index];
        (record.level, record.node, record.child)
    }

    /// Number of live children at `(level, node)`.
    #[must_use]
    pub fn child_count(&self, level: usize, node: usize) -> usize {
        self.levels[level].get(node).child_count
    }

    /// The tri-state child code of slot `i` at `(level, node)`.
    #[must_use]
    pub fn child_code(&self, level: usize, node: usize, i: usize) -> ChildCode {
        self.levels[level].get(node).children[i]
    }

    /// The bound of slot `i` at `(level, node)`.
    #[must_use]
    pub fn bounds(&self, level: usize, node: usize, i: usize) -> Aabb {
        self.levels[level].get(node).bounds[i]
    }

    /// Number of nodes allocated at `level`.
    #[must_use]
    pub fn node_count(&self, level: usize) -> usize {
        self.levels.get(level).map_or(0, Level::len)
    }

    pub(crate) fn node(&self, level: usize, index: usize) -> &Node<K> {
        self.levels[level].get(index)
    }

    /// Inserts `object`, descending greedily by minimal volume growth and
    /// splitting a leaf slot if the walk bottoms out on one. Returns the
    /// assigned leaf index.
    pub fn insert(&mut self, object: T) -> usize {
        let bbox = object.bounding_box();
        let leaf_index = self.leaves.len();
        self.leaves.push(LeafRecord {
            object,
            level: 0,
            node: 0,
            child: 0,
        });
        let (level, node, child) = self.insert_box(bbox, leaf_index);
        let record = &mut self.leaves[leaf_index];
        record.level = level;
        record.node = node;
        record.child = child;
        leaf_index
    }

    fn insert_box(&mut self, target: Aabb, leaf_index: usize) -> (usize, usize, usize) {
        let mut level_index = 0usize;
        let mut node_index = 0usize;
        loop {
            let (best_slot, best_merged, child_code) = {
                let node = self.levels[level_index].get(node_index);
                let m = (node.child_count + 1).min(K);
                let mut best_slot = 0usize;
                let mut best_delta = f32::INFINITY;
                let mut best_merged = Aabb::EMPTY;
                for i in 0..m {
                    let old_volume = node.bounds[i].volume().max(0.0);
                    let merged = node.bounds[i].merge(&target);
                    let delta = merged.volume() - old_volume;
                    if delta < best_delta {
                        best_delta = delta;
                        best_slot = i;
                        best_merged = merged;
                    }
                }
                (best_slot, best_merged, node.children[best_slot])
            };

            if is_leaf_child(child_code) {
                let old_leaf_index = decode_leaf(child_code);
                let old_bounds = self.levels[level_index].get(node_index).bounds[best_slot];

                self.ensure_level(level_index + 1);
                let mut split = Node::<K>::empty();
                split.child_count = 2;
                split.bounds[0] = old_bounds;
                split.children[0] = encode_leaf(old_leaf_index);
                split.bounds[1] = target;
                split.children[1] = encode_leaf(leaf_index);
                let new_node_index = self.levels[level_index + 1].push(split);

                let old_record = &mut self.leaves[old_leaf_index];
                old_record.level = level_index + 1;
                old_record.node = new_node_index;
                old_record.child = 0;

                let node = self.levels[level_index].get_mut(node_index);
                node.children[best_slot] = new_node_index as ChildCode;
                node.bounds[best_slot] = best_merged;

                self.max_depth = self.max_depth.max(level_index + 1);
                return (level_index + 1, new_node_index, 1);
            } else if child_code == EMPTY_CHILD {
                let node = self.levels[level_index].get_mut(node_index);
                node.child_count += 1;
                node.children[best_slot] = encode_leaf(leaf_index);
                node.bounds[best_slot] = best_merged;
                return (level_index, node_index, best_slot);
            }

            let node = self.levels[level_index].get_mut(node_index);
            node.bounds[best_slot] = best_merged;
            let next_node_index = child_code as usize;
            level_index += 1;
            node_index = next_node_index;
        }
    }

    fn ensure_level(&mut self, depth: usize) {
        while self.levels.len() <= depth {
            let new_depth = self.levels.len();
            let capacity = initial_level_capacity(K, self.leaves.capacity().max(1), new_depth);
            self.levels.push(Level::with_capacity(capacity));
        }
    }

    /// Recomputes every node's bound from its children, bottom-up. Leaf
    /// slots are refreshed first from each object's current
    /// `bounding_box()`, then internal bounds are rebuilt level by level
    /// from `max_depth - 1` down to `0`.
    pub fn refit(&mut self) {
        for leaf in &mut self.leaves {
            let bbox = leaf.object.bounding_box();
            self.levels[leaf.level].get_mut(leaf.node).bounds[leaf.child] = bbox;
        }
        if self.max_depth == 0 {
            return;
        }
        for depth in (0..self.max_depth).rev() {
            let (lower, upper) = self.levels.split_at_mut(depth + 1);
            let current = &mut lower[depth];
            let next = &upper[0];
            for node in current.as_mut_slice() {
                for i in 0..node.child_count {
                    let code = node.children[i];
                    if is_internal_child(code) {
                        let child = next.get(code as usize);
                        let mut merged = child.bounds[0];
                        for bound in &child.bounds[1..child.child_count] {
                            merged = merged.merge(bound);
                        }
                        node.bounds[i] = merged;
                    }
                }
            }
        }
    }

    /// Appends every leaf whose bound intersects `query_box` to `collector`,
    /// using an explicit work stack of `(level, node)` pairs.
    pub fn query(&self, query_box: Aabb, collector: &mut impl LeafCollector) {
        let mut stack: Vec<(usize, usize)> = Vec::with_capacity((K - 1) * self.max_depth.max(1) + 1);
        stack.push((0, 0));
        while let Some((level, node_index)) = stack.pop() {
            let node = self.levels[level].get(node_index);
            for i in 0..node.child_count {
                if query_box.intersects(&node.bounds[i]) {
                    let code = node.children[i];
                    if is_internal_child(code) {
                        stack.push((level + 1, code as usize));
                    } else {
                        collector.add(decode_leaf(code));
                    }
                }
            }
        }
    }

    /// Equivalent to [`Self::query`] but descends by direct recursion over
    /// the compile-time fan-out `K` instead of an explicit stack, testing
    /// all `K` slots up front so the optimizer can schedule the
    /// intersection tests before any branch on the result.
    pub fn query_recursive(&self, query_box: Aabb, collector: &mut impl LeafCollector) {
        self.query_recursive_at(0, 0, query_box, collector);
    }

    fn query_recursive_at(&self, level: usize, node_index: usize, query_box: Aabb, collector: &mut impl LeafCollector) {
        let node = self.levels[level].get(node_index);
        let mut hits = [false; K];
        for i in 0..K {
            hits[i] = i < node.child_count && query_box.intersects(&node.bounds[i]);
        }
        for (i, hit) in hits.into_iter().enumerate() {
            if !hit {
                continue;
            }
            let code = node.children[i];
            if is_internal_child(code) {
                self.query_recursive_at(level + 1, code as usize, query_box, collector);
            } else {
                collector.add(decode_leaf(code));
            }
        }
    }

    /// Walks the whole tree checking the invariants a correct `WideBvh` must
    /// maintain: fan-out bounds, slot occupancy matching `child_count`,
    /// leaf back-reference consistency, and (for internal nodes) that
    /// stored bounds equal the union of their children's bounds.
    ///
    /// This is `O(n)` in total node and leaf count; callers gate it behind
    /// debug builds or the `debug_checks` feature rather than running it on
    /// every mutation.
    ///
    /// # Errors
    /// Returns the first violated invariant found, in level-major,
    /// node-minor order.
    pub fn check_invariants(&self) -> Result<(), BvhError> {
        for (level, arena) in self.levels.iter().enumerate() {
            for node_index in 0..arena.len() {
                let node = arena.get(node_index);
                if node.child_count > K {
                    return Err(BvhError {
                        level,
                        node: node_index,
                        kind: InvariantKind::ChildCountOutOfRange,
                    });
                }
                for i in 0..K {
                    let occupied = node.children[i] != EMPTY_CHILD;
                    if i < node.child_count && !occupied {
                        return Err(BvhError {
                            level,
                            node: node_index,
                            kind: InvariantKind::UnexpectedEmptySlot,
                        });
                    }
                    if i >= node.child_count && occupied {
                        return Err(BvhError {
                            level,
                            node: node_index,
                            kind: InvariantKind::UnexpectedOccupiedSlot,
                        });
                    }
                }
                for i in 0..node.child_count {
                    let code = node.children[i];
                    if is_internal_child(code) {
                        let child_index = code as usize;
                        if child_index >= self.node_count(level + 1) {
                            return Err(BvhError {
                                level,
                                node: node_index,
                                kind: InvariantKind::BackReferenceMismatch,
                            });
                        }
                        let child = self.levels[level + 1].get(child_index);
                        let mut expected = child.bounds[0];
                        for bound in &child.bounds[1..child.child_count] {
                            expected = expected.merge(bound);
                        }
                        if expected != node.bounds[i] {
                            #[cfg(feature = "debug_checks")]
                            tracing::warn!(level, node = node_index, slot = i, "stale internal bound");
                            return Err(BvhError {
                                level,
                                node: node_index,
                                kind: InvariantKind::StaleBounds,
                            });
                        }
                    }
                }
            }
        }
        for (leaf_index, leaf) in self.leaves.iter().enumerate() {
            let owner = self.levels[leaf.level].get(leaf.node);
            let code = owner.children[leaf.child];
            if !is_leaf_child(code) || decode_leaf(code) != leaf_index {
                return Err(BvhError {
                    level: leaf.level,
                    node: leaf.node,
                    kind: InvariantKind::BackReferenceMismatch,
                });
            }
        }
        Ok(())
    }
}
