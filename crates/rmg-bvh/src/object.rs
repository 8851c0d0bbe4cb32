use crate::aabb::Aabb;

/// A bounded object that can be inserted into a [`crate::tree::WideBvh`].
///
/// `bounding_box` must be pure and side-effect free from the tree's point of
/// view: it is called once on [`crate::tree::WideBvh::insert`] and once per
/// leaf on every [`crate::tree::WideBvh::refit`]. Motion is expressed by
/// mutating the object in place (outside the tree) and then calling `refit`,
/// not by re-inserting.
pub trait BoundedObject {
    /// Returns this object's current axis-aligned bounding box.
    fn bounding_box(&self) -> Aabb;
}

/// Accepts the leaf indices produced by a query.
///
/// Blanket-implemented for `Vec<usize>` so callers can pass a plain vector
/// as the result collector without defining their own type.
pub trait LeafCollector {
    /// Appends one leaf index to the collection.
    fn add(&mut self, leaf_index: usize);
}

impl LeafCollector for Vec<usize> {
    fn add(&mut self, leaf_index: usize) {
        self.push(leaf_index);
    }
}
