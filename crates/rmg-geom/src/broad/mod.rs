//! Broad-phase collision acceleration.
//!
//! # Determinism contract
//! `pairs()` always reports canonical `(min_id, max_id)` tuples (the
//! smaller id first), sorted ascending, with no duplicates. Overlap is
//! inclusive of touching faces. Callers may rely on byte-identical output
//! for byte-identical input regardless of insertion order.

/// `AabbTree`: a `BroadPhase` implementation backed by `rmg_bvh::WideBvh`.
pub mod aabb_tree;
