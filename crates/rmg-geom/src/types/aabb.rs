use rmg_core::math::Vec3;

/// Axis-aligned bounding box with a validated `min <= max` invariant.
///
/// This is the public-facing geometry type; it is deliberately stricter
/// than `rmg_bvh::Aabb`, which additionally allows a degenerate "empty"
/// sentinel the BVH uses internally to seed merges. Converting between the
/// two happens at the broad-phase boundary (see `broad::aabb_tree`).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    min: Vec3,
    max: Vec3,
}

impl Aabb {
    /// Builds an AABB from explicit corners.
    ///
    /// # Panics
    /// Panics if any component of `min` exceeds the matching component of
    /// `max`.
    #[must_use]
    pub fn new(min: Vec3, max: Vec3) -> Self {
        assert!(min.le_all(&max), "Aabb::new requires min <= max componentwise");
        Self { min, max }
    }

    /// The lower corner.
    #[must_use]
    pub fn min(&self) -> Vec3 {
        self.min
    }

    /// The upper corner.
    #[must_use]
    pub fn max(&self) -> Vec3 {
        self.max
    }

    /// Builds an AABB from a center point and per-axis half-extents.
    #[must_use]
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self::new(center.sub(&half_extents), center.add(&half_extents))
    }

    /// True iff `self` and `other` overlap, inclusive of touching faces.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.min.le_all(&other.max) && other.min.le_all(&self.max)
    }

    /// The smallest AABB containing both `self` and `other`.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self::new(self.min.min(&other.min), self.max.max(&other.max))
    }
}

impl From<Aabb> for rmg_bvh::Aabb {
    fn from(value: Aabb) -> Self {
        Self::new(value.min, value.max)
    }
}

impl From<rmg_bvh::Aabb> for Aabb {
    fn from(value: rmg_bvh::Aabb) -> Self {
        Self::new(value.min(), value.max())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "min <= max")]
    fn new_rejects_inverted_corners() {
        let _ = Aabb::new(Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO);
    }

    #[test]
    fn overlaps_is_inclusive_on_touching_faces() {
        let a = Aabb::new(Vec3::ZERO, Vec3::splat(1.0));
        let b = Aabb::new(Vec3::splat(1.0), Vec3::splat(2.0));
        assert!(a.overlaps(&b));
    }

    #[test]
    fn union_covers_both_operands() {
        let a = Aabb::new(Vec3::ZERO, Vec3::splat(1.0));
        let b = Aabb::new(Vec3::splat(2.0), Vec3::splat(3.0));
        let u = a.union(&b);
        assert_eq!(u.min(), Vec3::ZERO);
        assert_eq!(u.max(), Vec3::splat(3.0));
    }

    #[test]
    fn round_trips_through_the_bvh_internal_type() {
        let a = Aabb::new(Vec3::new(-1.0, -2.0, -3.0), Vec3::new(4.0, 5.0, 6.0));
        let bvh_box: rmg_bvh::Aabb = a.into();
        let back: Aabb = bvh_box.into();
        assert_eq!(a, back);
    }
}
