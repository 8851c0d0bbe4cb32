//! Errors surfaced by the optional integrity checker.
//!
//! Everything else in this crate treats a violated precondition (bad
//! fan-out, an out-of-range budget, a malformed query) as a programmer
//! error and asserts; there is no recoverable I/O or parsing path here.

use thiserror::Error;

/// The specific invariant an integrity-check pass found violated.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InvariantKind {
    /// A node reported more live children than its fixed fan-out allows.
    #[error("child_count exceeds fan-out")]
    ChildCountOutOfRange,
    /// A slot below `child_count` was `EMPTY_CHILD`.
    #[error("occupied slot below child_count is empty")]
    UnexpectedEmptySlot,
    /// A slot at or past `child_count` was not `EMPTY_CHILD`.
    #[error("slot at or past child_count is not empty")]
    UnexpectedOccupiedSlot,
    /// A leaf's stored back-reference does not point at the slot that
    /// actually encodes it.
    #[error("leaf back-reference does not agree with its owning slot")]
    BackReferenceMismatch,
    /// An internal node's bound does not equal the union of its children's
    /// bounds (a refit is due).
    #[error("internal node bounds do not equal the union of its children")]
    StaleBounds,
}

/// A located invariant violation, as produced by `WideBvh::check_invariants`.
#[derive(Debug, Error)]
#[error("bvh invariant violated at level {level}, node {node}: {kind}")]
pub struct BvhError {
    /// The level of the offending node.
    pub level: usize,
    /// The node's index within that level.
    pub node: usize,
    /// Which invariant failed.
    pub kind: InvariantKind,
}
