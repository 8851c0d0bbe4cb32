//! Treelet subtree collection: given a root node and a node budget, greedily
//! expand the highest-surface-area-cost subtree until the budget would be
//! exceeded, producing a small treelet (`internal_nodes`) and the leaves
//! plus unexpanded subtrees forming its boundary (`subtrees`).
//!
//! Used by rebalancing passes that want to pull a bounded chunk of the tree
//! out, re-optimize it, and splice it back in; this module only collects
//! the chunk; it does not rebuild or re-insert anything.

use crate::node::{decode_leaf, is_internal_child, Node};
use crate::object::BoundedObject;
use crate::pool::BufferPool;
use crate::quick_list::QuickList;
use crate::tree::WideBvh;

/// One entry in the collector's scratch max-heap: a candidate subtree plus
/// its surface-area cost.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeapEntry {
    /// The candidate subtree's root level.
    pub level: usize,
    /// The candidate subtree's root node index within that level.
    pub node_index: usize,
    /// Surface-area metric of the bound the parent stored for this subtree;
    /// the heap's ordering key.
    pub cost: f32,
}

/// A node reached while walking the treelet boundary: either a leaf or an
/// internal node that did not fit the budget and was left unexpanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtreeRef {
    /// A leaf index, as produced by a query.
    Leaf(usize),
    /// An internal node's `(level, node_index)`.
    Node(usize, usize),
}

impl Default for SubtreeRef {
    /// Fresh `QuickList`/`BufferPool` storage is default-initialized before
    /// any real entry is written into it; the value itself is never read
    /// until `add` overwrites the slot.
    fn default() -> Self {
        Self::Leaf(0)
    }
}

/// A binary max-heap built in place over a caller-provided scratch slice.
///
/// Kept separate from [`crate::pool`] because its scratch buffer is
/// typically reused across many `collect_subtrees` calls with a fixed
/// worst-case size (`budget`), rather than grown incrementally.
struct SubtreeHeap<'a> {
    buf: &'a mut [HeapEntry],
    len: usize,
}

impl<'a> SubtreeHeap<'a> {
    fn new(buf: &'a mut [HeapEntry]) -> Self {
        Self { buf, len: 0 }
    }

    fn push(&mut self, entry: HeapEntry) {
        debug_assert!(self.len < self.buf.len(), "heap scratch buffer exhausted");
        self.buf[self.len] = entry;
        let mut i = self.len;
        self.len += 1;
        while i > 0 {
            let parent = (i - 1) / 2;
            if self.buf[parent].cost < self.buf[i].cost {
                self.buf.swap(parent, i);
                i = parent;
            } else {
                break;
            }
        }
    }

    fn pop(&mut self) -> Option<HeapEntry> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        self.buf.swap(0, self.len);
        let popped = self.buf[self.len];
        let mut i = 0usize;
        loop {
            let left = 2 * i + 1;
            let right = 2 * i + 2;
            let mut largest = i;
            if left < self.len && self.buf[left].cost > self.buf[largest].cost {
                largest = left;
            }
            if right < self.len && self.buf[right].cost > self.buf[largest].cost {
                largest = right;
            }
            if largest == i {
                break;
            }
            self.buf.swap(i, largest);
            i = largest;
        }
        Some(popped)
    }
}

/// Greedily expands the highest-cost subtree under `root` until expanding
/// the next one would exceed `budget` node-slots, returning the total cost
/// of the expanded interior.
///
/// `internal_nodes` and `subtrees` are pool-backed quick-lists, each grown
/// through its own `BufferPool` exactly as `QuickList::add` requires; the
/// pools are reusable across repeated `collect_subtrees` calls the way the
/// heap scratch slice is.
///
/// `root` becomes `internal_nodes`'s last entry (swapped there from its
/// original push position) so callers that rebuild from `internal_nodes`
/// can identify the treelet's own root without a separate lookup.
///
/// # Panics
/// Panics (via `assert!`) if `budget` is smaller than the root's own
/// `child_count` — the precondition `M >= root.child_count` from the
/// algorithm this implements.
#[allow(clippy::too_many_arguments)]
pub fn collect_subtrees<T: BoundedObject, const K: usize>(
    tree: &WideBvh<T, K>,
    root: (usize, usize),
    budget: usize,
    heap_scratch: &mut [HeapEntry],
    node_pool: &mut BufferPool<(usize, usize)>,
    internal_nodes: &mut QuickList<(usize, usize)>,
    subtree_pool: &mut BufferPool<SubtreeRef>,
    subtrees: &mut QuickList<SubtreeRef>,
) -> f32 {
    let (root_level, root_index) = root;
    let root_node = tree.node(root_level, root_index);
    assert!(
        budget >= root_node.child_count,
        "treelet budget {budget} below root fan-out {}",
        root_node.child_count
    );

    let mut heap = SubtreeHeap::new(heap_scratch);
    for i in 0..root_node.child_count {
        push_child(tree, root_node, root_level, i, &mut heap, subtree_pool, subtrees);
    }

    let root_slot = internal_nodes.len();
    internal_nodes.add(node_pool, root);

    let mut treelet_cost = 0.0_f32;
    let mut remaining = budget - root_node.child_count;

    while let Some(entry) = heap.pop() {
        let node = tree.node(entry.level, entry.node_index);
        let delta = node.child_count - 1;
        if remaining >= delta {
            treelet_cost += entry.cost;
            internal_nodes.add(node_pool, (entry.level, entry.node_index));
            remaining -= delta;
            for i in 0..node.child_count {
                push_child(tree, node, entry.level, i, &mut heap, subtree_pool, subtrees);
            }
        } else {
            subtrees.add(subtree_pool, SubtreeRef::Node(entry.level, entry.node_index));
        }
    }

    let last = internal_nodes.len() - 1;
    internal_nodes.swap(root_slot, last);
    treelet_cost
}

fn push_child<T: BoundedObject, const K: usize>(
    tree: &WideBvh<T, K>,
    node: &Node<K>,
    level: usize,
    i: usize,
    heap: &mut SubtreeHeap<'_>,
    subtree_pool: &mut BufferPool<SubtreeRef>,
    subtrees: &mut QuickList<SubtreeRef>,
) {
    let code = node.children[i];
    if is_internal_child(code) {
        let child_level = level + 1;
        let child_index = code as usize;
        heap.push(HeapEntry {
            level: child_level,
            node_index: child_index,
            cost: node.bounds[i].surface_area_metric(),
        });
    } else {
        subtrees.add(subtree_pool, SubtreeRef::Leaf(decode_leaf(code)));
    }
}
