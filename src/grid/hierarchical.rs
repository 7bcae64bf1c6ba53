//! The hierarchy: N `HashLevel`s at `base × ratio^i` cell sizes.
//!
//! Every object lives at exactly **one** level – the finest one whose
//! cells are at least as wide as the object's largest side – so an
//! object straddles at most 2×2 buckets unless it is larger than the
//! coarsest cell.
//!
//! The grid keeps no per‑object state.  `add`/`move_to` hand back a
//! [`CellLocation`] and the caller must pass it back in later; a stale
//! location leaves orphaned entries behind and is *not* detected.
//!
//! Mutation needs `&mut self`, queries only `&self`: a tic updates all
//! positions first, then fans queries out across threads.

use std::collections::HashSet;
use std::hash::Hash;

use super::cell::{Bounds, CellLocation};
use super::config::{GridConfig, GridError};
use super::level::HashLevel;

/// Bucket‑mutation counters, cumulative since construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GridStats {
    /// (bucket, handle) entries added.
    pub inserts: u64,
    /// (bucket, handle) entries removed.
    pub erases: u64,
    /// `move_to` calls that touched nothing because level and range
    /// were unchanged.
    pub moves_skipped: u64,
}

/*───────────────────────────── grid ─────────────────────────────*/

#[derive(Debug, Clone)]
pub struct HierarchicalHashGrid<H> {
    config: GridConfig,
    levels: Vec<HashLevel<H>>,
    stats: GridStats,
}

impl<H: Copy + Eq + Hash> HierarchicalHashGrid<H> {
    pub fn new(config: GridConfig) -> Result<Self, GridError> {
        config.validate()?;
        let levels = (0..config.levels)
            .map(|i| HashLevel::new(config.cell_size(i)))
            .collect();
        Ok(Self {
            config,
            levels,
            stats: GridStats::default(),
        })
    }

    #[inline]
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    #[inline]
    pub fn stats(&self) -> GridStats {
        self.stats
    }

    #[inline]
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    #[inline]
    pub fn level(&self, i: usize) -> Option<&HashLevel<H>> {
        self.levels.get(i)
    }

    /// Non‑empty buckets across all levels.
    pub fn bucket_count(&self) -> usize {
        self.levels.iter().map(HashLevel::bucket_count).sum()
    }

    /// Drop every bucket; counters are kept.
    pub fn clear(&mut self) {
        self.levels.iter_mut().for_each(HashLevel::clear);
    }

    /*──────────────────────── level selection ───────────────────────*/

    /// Finest level whose cell size is ≥ the largest side of `bounds`,
    /// clamped to the coarsest level.
    pub fn level_for(&self, bounds: &Bounds) -> u8 {
        let extent = bounds.extent();
        let idx = self
            .levels
            .iter()
            .position(|l| l.cell_size() >= extent)
            .unwrap_or(self.levels.len() - 1);
        idx as u8
    }

    /// Where `bounds` would land, without touching any bucket.
    pub fn locate(&self, bounds: &Bounds) -> CellLocation {
        let level = self.level_for(bounds);
        CellLocation {
            level,
            range: self.levels[level as usize].cell_range(bounds),
        }
    }

    /*─────────────────────────── mutation ───────────────────────────*/

    /// Start tracking `handle`.  Never fails: oversized objects are kept
    /// on the coarsest level.
    pub fn add(&mut self, handle: H, bounds: Bounds) -> CellLocation {
        let loc = self.locate(&bounds);
        self.stats.inserts += self.levels[loc.level as usize].insert(handle, loc.range);
        loc
    }

    /// Re‑bucket `handle` for `bounds`.  `prev` must be the location last
    /// returned for this handle.
    ///
    /// Returns `prev` untouched when level and cell range are unchanged.
    pub fn move_to(&mut self, handle: H, prev: CellLocation, bounds: Bounds) -> CellLocation {
        let next = self.locate(&bounds);
        if next == prev {
            self.stats.moves_skipped += 1;
            return prev;
        }

        if next.level == prev.level {
            // same level – only touch the cells that differ
            let level = &mut self.levels[next.level as usize];
            let (old, new) = (prev.range, next.range);
            self.stats.erases +=
                level.erase_cells(handle, old.iter().filter(|c| !new.contains(*c)));
            self.stats.inserts +=
                level.insert_cells(handle, new.iter().filter(|c| !old.contains(*c)));
        } else {
            self.stats.erases += self.levels[prev.level as usize].erase(handle, prev.range);
            self.stats.inserts += self.levels[next.level as usize].insert(handle, next.range);
        }
        next
    }

    /// Stop tracking `handle`.  Removing twice is harmless.
    pub fn remove(&mut self, handle: H, location: CellLocation) {
        if let Some(level) = self.levels.get_mut(location.level as usize) {
            self.stats.erases += level.erase(handle, location.range);
        }
    }

    /*──────────────────────────── queries ───────────────────────────*/

    /// Candidates on the finest levels only: level 0 up to and including
    /// the level `bounds` itself would be filed under.
    ///
    /// Objects parked on coarser levels are skipped even if they overlap
    /// `bounds`; use [`query`](Self::query) when those matter.
    pub fn query_small(&self, bounds: Bounds, out: &mut Vec<H>) {
        let top = self.level_for(&bounds) as usize;
        self.collect(&bounds, &self.levels[..=top], out);
    }

    /// Candidates from every level.  Never misses an object whose last
    /// bounds overlap `bounds`.
    pub fn query(&self, bounds: Bounds, out: &mut Vec<H>) {
        self.collect(&bounds, &self.levels, out);
    }

    /// Sugar over [`query`](Self::query) for one‑off callers.
    pub fn query_vec(&self, bounds: Bounds) -> Vec<H> {
        let mut out = Vec::new();
        self.query(bounds, &mut out);
        out
    }

    fn collect(&self, bounds: &Bounds, levels: &[HashLevel<H>], out: &mut Vec<H>) {
        let start = out.len();
        for level in levels {
            level.query_range(level.cell_range(bounds), out);
        }
        dedup_tail(out, start);
    }
}

/// Drop repeated handles from `out[start..]`, keeping first occurrences.
fn dedup_tail<H: Copy + Eq + Hash>(out: &mut Vec<H>, start: usize) {
    if out.len() - start < 2 {
        return;
    }
    let mut seen = HashSet::with_capacity(out.len() - start);
    let mut w = start;
    for r in start..out.len() {
        let h = out[r];
        if seen.insert(h) {
            out[w] = h;
            w += 1;
        }
    }
    out.truncate(w);
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
