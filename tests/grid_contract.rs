//! Randomised checks of the grid against a brute‑force overlap scan.

use std::collections::HashSet;

use glam::{Vec2, vec2};
use hashgrid::grid::{Bounds, CellLocation, GridConfig, HierarchicalHashGrid};
use rand::{Rng, SeedableRng, rngs::StdRng};

type Grid = HierarchicalHashGrid<u32>;

/// Live objects: handle, last bounds, stored location.
struct Model {
    grid: Grid,
    objects: Vec<(u32, Bounds, CellLocation)>,
}

// ─────────── helpers ───────────

fn random_bounds(rng: &mut StdRng) -> Bounds {
    let min = vec2(rng.gen_range(-1000.0..1000.0), rng.gen_range(-1000.0..1000.0));
    // mostly small, some spanning several coarse cells
    let side = if rng.gen_bool(0.8) {
        rng.gen_range(0.0..60.0)
    } else {
        rng.gen_range(60.0..2500.0)
    };
    let aspect = rng.gen_range(0.2..1.0);
    Bounds::new(min, min + vec2(side, side * aspect))
}

fn populate(seed: u64, n: u32) -> (Model, StdRng) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut grid = Grid::new(GridConfig::new(50.0, 3, 4)).unwrap();
    let objects = (0..n)
        .map(|h| {
            let b = random_bounds(&mut rng);
            (h, b, grid.add(h, b))
        })
        .collect();
    (Model { grid, objects }, rng)
}

fn brute_force(objects: &[(u32, Bounds, CellLocation)], q: &Bounds) -> HashSet<u32> {
    objects
        .iter()
        .filter(|(_, b, _)| b.overlaps(q))
        .map(|&(h, _, _)| h)
        .collect()
}

fn assert_no_duplicates(found: &[u32]) {
    let unique: HashSet<u32> = found.iter().copied().collect();
    assert_eq!(unique.len(), found.len(), "duplicate handles in {found:?}");
}

/// Every stored location is fully present in its level and nothing else
/// is left in any bucket.
fn assert_consistent(m: &Model) {
    let mut expected = 0usize;
    for &(h, _, loc) in &m.objects {
        let level = m.grid.level(loc.level as usize).unwrap();
        for c in loc.range.iter() {
            assert!(level.contains(h, c), "{h} missing from {c:?}");
        }
        expected += loc.range.cell_count() as usize;
    }
    let stored: usize = (0..m.grid.level_count())
        .map(|i| m.grid.level(i).unwrap().entry_count())
        .sum();
    assert_eq!(stored, expected, "orphaned bucket entries");
}

// ─────────── tests ───────────

#[test]
fn query_finds_every_overlapping_object() {
    let (m, mut rng) = populate(11, 400);
    for _ in 0..200 {
        let q = random_bounds(&mut rng);
        let found = m.grid.query_vec(q);
        assert_no_duplicates(&found);
        let found: HashSet<u32> = found.into_iter().collect();
        for h in brute_force(&m.objects, &q) {
            assert!(found.contains(&h), "query {q:?} missed {h}");
        }
    }
}

#[test]
fn query_small_finds_overlapping_objects_on_same_or_finer_levels() {
    let (m, mut rng) = populate(12, 400);
    let mut out = Vec::new();
    for _ in 0..200 {
        let q = random_bounds(&mut rng);
        let top = m.grid.level_for(&q);
        out.clear();
        m.grid.query_small(q, &mut out);
        assert_no_duplicates(&out);

        let found: HashSet<u32> = out.iter().copied().collect();
        for &(h, b, loc) in &m.objects {
            if loc.level > top {
                assert!(!found.contains(&h), "{h} is on a coarser level than {top}");
            } else if b.overlaps(&q) {
                assert!(found.contains(&h), "query_small {q:?} missed {h}");
            }
        }
    }
}

#[test]
fn query_small_is_a_subset_of_query() {
    let (m, mut rng) = populate(13, 300);
    for _ in 0..100 {
        let q = random_bounds(&mut rng);
        let mut small = Vec::new();
        m.grid.query_small(q, &mut small);
        let all: HashSet<u32> = m.grid.query_vec(q).into_iter().collect();
        assert!(small.iter().all(|h| all.contains(h)));
    }
}

#[test]
fn random_moves_keep_buckets_consistent() {
    let (mut m, mut rng) = populate(14, 300);
    for round in 0..20 {
        for obj in m.objects.iter_mut() {
            // most objects drift a little, a few jump or change size
            let next = if rng.gen_bool(0.9) {
                let d = vec2(rng.gen_range(-30.0..30.0), rng.gen_range(-30.0..30.0));
                Bounds::new(obj.1.min + d, obj.1.max + d)
            } else {
                random_bounds(&mut rng)
            };
            obj.2 = m.grid.move_to(obj.0, obj.2, next);
            obj.1 = next;
        }
        assert_consistent(&m);

        let q = random_bounds(&mut rng);
        let found: HashSet<u32> = m.grid.query_vec(q).into_iter().collect();
        for h in brute_force(&m.objects, &q) {
            assert!(found.contains(&h), "round {round}: {h} missing after move");
        }
    }
}

#[test]
fn stored_location_matches_fresh_locate() {
    let (m, _) = populate(15, 200);
    for &(_, b, loc) in &m.objects {
        assert_eq!(m.grid.locate(&b), loc);
    }
}

#[test]
fn removing_everything_leaves_no_residue() {
    let (mut m, mut rng) = populate(16, 250);
    // remove in a shuffled order, checking removed handles never come back
    let mut removed = HashSet::new();
    while !m.objects.is_empty() {
        let i = rng.gen_range(0..m.objects.len());
        let (h, _, loc) = m.objects.swap_remove(i);
        m.grid.remove(h, loc);
        removed.insert(h);

        if removed.len() % 50 == 0 {
            assert_consistent(&m);
            let everything = Bounds::new(Vec2::splat(-5000.0), Vec2::splat(5000.0));
            assert!(m.grid.query_vec(everything).iter().all(|h| !removed.contains(h)));
        }
    }
    assert_eq!(m.grid.bucket_count(), 0);
}

#[test]
fn unchanged_moves_are_counted_and_free() {
    let (mut m, _) = populate(17, 100);
    let before = m.grid.stats();
    for obj in m.objects.iter_mut() {
        obj.2 = m.grid.move_to(obj.0, obj.2, obj.1);
    }
    let after = m.grid.stats();
    assert_eq!(after.inserts, before.inserts);
    assert_eq!(after.erases, before.erases);
    assert_eq!(after.moves_skipped, before.moves_skipped + 100);
}
