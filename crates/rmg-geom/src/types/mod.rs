/// Axis-aligned bounding box.
pub mod aabb;
