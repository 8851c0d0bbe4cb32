use crate::aabb::Aabb;

/// Tri-state child-slot code.
///
/// `-1` encodes an empty slot, `>= 0` encodes an index into the node arena
/// at the next deeper level, and `<= -2` encodes a leaf index (see
/// [`encode_leaf`]/[`decode_leaf`]).
pub type ChildCode = i64;

/// Sentinel for an empty child slot.
pub const EMPTY_CHILD: ChildCode = -1;

/// Encodes a leaf index into its tri-state child-slot representation.
#[must_use]
pub const fn encode_leaf(leaf_index: usize) -> ChildCode {
    -((leaf_index as i64) + 2)
}

/// Decodes a leaf child-slot code back into a leaf index.
#[must_use]
pub fn decode_leaf(code: ChildCode) -> usize {
    debug_assert!(is_leaf_child(code), "not a leaf code: {code}");
    (-code - 2) as usize
}

/// Returns `true` if `code` refers to a leaf.
#[must_use]
pub const fn is_leaf_child(code: ChildCode) -> bool {
    code <= -2
}

/// Returns `true` if `code` refers to an internal child node.
#[must_use]
pub const fn is_internal_child(code: ChildCode) -> bool {
    code >= 0
}

/// A fixed-fan-out node: `K` AABB/child-code slot pairs plus an occupancy
/// count. Slots `[0, child_count)` are live; slots `[child_count, K)` are
/// always `EMPTY_CHILD` with an `Aabb::EMPTY` bound.
#[derive(Clone)]
pub(crate) struct Node<const K: usize> {
    pub(crate) child_count: usize,
    pub(crate) bounds: [Aabb; K],
    pub(crate) children: [ChildCode; K],
}

impl<const K: usize> Node<K> {
    pub(crate) fn empty() -> Self {
        Self {
            child_count: 0,
            bounds: [Aabb::EMPTY; K],
            children: [EMPTY_CHILD; K],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_codes_round_trip() {
        for i in [0usize, 1, 2, 1000] {
            let code = encode_leaf(i);
            assert!(is_leaf_child(code));
            assert!(!is_internal_child(code));
            assert_eq!(decode_leaf(code), i);
        }
    }

    #[test]
    fn empty_child_is_neither_leaf_nor_internal() {
        assert!(!is_leaf_child(EMPTY_CHILD));
        assert!(!is_internal_child(EMPTY_CHILD));
    }

    #[test]
    fn fresh_node_has_no_live_children() {
        let node = Node::<4>::empty();
        assert_eq!(node.child_count, 0);
        assert!(node.children.iter().all(|&c| c == EMPTY_CHILD));
        assert!(node.bounds.iter().all(|b| *b == Aabb::EMPTY));
    }
}
