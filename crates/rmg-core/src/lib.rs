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
#![doc = r"Deterministic math primitives for Echo.

This crate provides:
- A 3D vector type (`Vec3`) with the componentwise operations the
  geometry and acceleration-structure crates build on.

Design notes:
- Float32 throughout; operations favor clarity and reproducibility.
- No ambient RNG, no platform-dependent transcendentals.
"]

/// Deterministic math helpers (currently: `Vec3`).
pub mod math;
