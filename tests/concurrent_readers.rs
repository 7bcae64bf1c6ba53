//! Many readers sharing one `&grid` see the same answers as a single
//! thread does.

use std::thread;

use glam::vec2;
use hashgrid::grid::{Bounds, GridConfig, HierarchicalHashGrid};
use rand::{Rng, SeedableRng, rngs::StdRng};
use rayon::prelude::*;

fn build(seed: u64) -> (HierarchicalHashGrid<u64>, Vec<Bounds>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut grid = HierarchicalHashGrid::new(GridConfig::default()).unwrap();
    for h in 0..2000u64 {
        let p = vec2(rng.gen_range(-3000.0..3000.0), rng.gen_range(-3000.0..3000.0));
        let half = if h % 50 == 0 { 400.0 } else { 20.0 };
        grid.add(h, Bounds::from_center_half_extent(p, half));
    }
    let queries = (0..256)
        .map(|_| {
            let p = vec2(rng.gen_range(-3000.0..3000.0), rng.gen_range(-3000.0..3000.0));
            Bounds::from_center_half_extent(p, rng.gen_range(10.0..300.0))
        })
        .collect();
    (grid, queries)
}

fn sorted(mut v: Vec<u64>) -> Vec<u64> {
    v.sort_unstable();
    v
}

fn sequential(grid: &HierarchicalHashGrid<u64>, queries: &[Bounds]) -> Vec<(Vec<u64>, Vec<u64>)> {
    queries
        .iter()
        .map(|&q| {
            let mut small = Vec::new();
            grid.query_small(q, &mut small);
            (sorted(grid.query_vec(q)), sorted(small))
        })
        .collect()
}

#[test]
fn rayon_readers_match_sequential_results() {
    let (grid, queries) = build(21);
    let expected = sequential(&grid, &queries);

    let parallel: Vec<(Vec<u64>, Vec<u64>)> = queries
        .par_iter()
        .map(|&q| {
            let mut small = Vec::new();
            grid.query_small(q, &mut small);
            (sorted(grid.query_vec(q)), sorted(small))
        })
        .collect();

    assert_eq!(parallel, expected);
}

#[test]
fn scoped_threads_share_the_grid() {
    let (grid, queries) = build(22);
    let expected = sequential(&grid, &queries);

    let results: Vec<Vec<(Vec<u64>, Vec<u64>)>> = thread::scope(|s| {
        let handles: Vec<_> = queries
            .chunks(64)
            .map(|chunk| {
                let grid = &grid;
                s.spawn(move || sequential(grid, chunk))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results.concat(), expected);
}

#[test]
fn writes_between_read_phases_are_visible() {
    let (mut grid, _) = build(23);
    let spot = Bounds::from_center_half_extent(vec2(5000.0, 5000.0), 10.0);

    let before: Vec<usize> = (0..8)
        .into_par_iter()
        .map(|_| grid.query_vec(spot).len())
        .collect();
    assert!(before.iter().all(|&n| n == 0));

    // mutate phase
    let loc = grid.add(9999, spot);

    let after: Vec<Vec<u64>> = (0..8).into_par_iter().map(|_| grid.query_vec(spot)).collect();
    assert!(after.iter().all(|v| v == &[9999]));

    grid.remove(9999, loc);
    assert!(grid.query_vec(spot).is_empty());
}
