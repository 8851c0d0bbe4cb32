use rmg_core::math::Vec3;
use rmg_geom::broad::aabb_tree::{AabbTree, BroadPhase};
use rmg_geom::types::aabb::Aabb;

fn box_at(x: f32, y: f32, z: f32) -> Aabb {
    Aabb::from_center_half_extents(Vec3::new(x, y, z), Vec3::splat(0.5))
}

#[test]
fn broad_phase_pair_order_is_deterministic() {
    let mut a = AabbTree::new();
    a.upsert(100, box_at(0.0, 0.0, 0.0));
    a.upsert(7, box_at(0.6, 0.0, 0.0));
    a.upsert(42, box_at(1.2, 0.0, 0.0));

    let mut b = AabbTree::new();
    b.upsert(42, box_at(1.2, 0.0, 0.0));
    b.upsert(100, box_at(0.0, 0.0, 0.0));
    b.upsert(7, box_at(0.6, 0.0, 0.0));

    let pairs_a = a.pairs();
    let pairs_b = b.pairs();
    assert_eq!(pairs_a, pairs_b);
    assert!(pairs_a.windows(2).all(|w| w[0] < w[1]), "pairs must be sorted ascending");
    for &(lo, hi) in &pairs_a {
        assert!(lo < hi, "pairs must be canonicalized (min_id, max_id)");
    }
}

#[test]
fn disjoint_entities_never_appear_in_any_pair() {
    let mut tree = AabbTree::new();
    tree.upsert(1, box_at(0.0, 0.0, 0.0));
    tree.upsert(2, box_at(0.6, 0.0, 0.0));
    tree.upsert(3, box_at(500.0, 500.0, 500.0));

    let pairs = tree.pairs();
    assert_eq!(pairs, vec![(1, 2)]);
    assert!(!pairs.iter().any(|&(lo, hi)| lo == 3 || hi == 3));
}

#[test]
fn remove_then_upsert_is_equivalent_to_never_having_removed() {
    let mut tree = AabbTree::new();
    tree.upsert(1, box_at(0.0, 0.0, 0.0));
    tree.upsert(2, box_at(0.6, 0.0, 0.0));
    tree.remove(1);
    assert!(tree.pairs().is_empty());
    tree.upsert(1, box_at(0.0, 0.0, 0.0));
    assert_eq!(tree.pairs(), vec![(1, 2)]);
}
