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
#![doc = r"Echo geometry types and broad-phase collision acceleration.

`broad::aabb_tree::AabbTree` is the deterministic broad-phase: pairs are
always reported as canonical `(min_id, max_id)` tuples, sorted ascending,
with inclusive face-touch overlap. It is backed by `rmg_bvh::WideBvh`.
"]

/// Geometric primitive types (`Aabb`).
pub mod types;
/// Broad-phase collision acceleration.
pub mod broad;

pub use types::aabb::Aabb;
