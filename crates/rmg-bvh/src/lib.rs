#![deny(
    warnings,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    rust_2018_idioms,
    missing_docs,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]
#![doc = r"Echo's wide-fan-out BVH broad-phase acceleration structure.

A `WideBvh<T, K>` is a fixed-fan-out bounding volume hierarchy (`K` in
`{2, 4, 8, 16, 32}`) built by online greedy insertion rather than top-down
batch construction:

- [`tree::WideBvh::insert`] walks down from the root, at each node picking
  the child slot whose volume would grow least, splitting a leaf slot into
  a fresh internal node when the walk bottoms out on one.
- [`tree::WideBvh::refit`] recomputes every bound bottom-up from each
  leaf's current `bounding_box()`, without restructuring the tree.
- [`tree::WideBvh::query`] and [`tree::WideBvh::query_recursive`] are two
  equivalent overlap-query forms (explicit stack vs. direct recursion
  specialized on the compile-time fan-out).
- [`treelet::collect_subtrees`] pulls a bounded chunk of the tree
  (a \"treelet\") out for external rebalancing, via a surface-area-weighted
  max-heap over a caller-provided scratch slice.

This crate does not implement SIMD matrix/quaternion math, scene physics,
persisted tree formats, or deletion; callers needing those build on top.
"]

/// The BVH-internal AABB type, distinct from `rmg_geom::Aabb` because it
/// allows the degenerate empty sentinel used to seed merges.
pub mod aabb;
/// Errors surfaced by the optional integrity checker.
pub mod error;
/// Per-depth node arenas.
mod level;
/// Tri-state child-slot encoding and the fixed fan-out node layout.
mod node;
/// The `BoundedObject`/`LeafCollector` traits bridging caller types to the tree.
pub mod object;
/// Power-of-two-sized array cache backing the quick list and treelet scratch buffers.
pub mod pool;
/// Pool-backed growable sequence.
pub mod quick_list;
/// The wide BVH itself: insertion, refit, and queries.
pub mod tree;
/// Bounded subtree collection for external rebalancing passes.
pub mod treelet;

pub use aabb::Aabb;
pub use object::{BoundedObject, LeafCollector};
pub use tree::{TreeConfig, WideBvh};
