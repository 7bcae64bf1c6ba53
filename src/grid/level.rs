//! One uniform layer of the hierarchy – a very small, sparse spatial hash.
//!
//! * Buckets live in a `HashMap` and are only allocated where something
//!   lives; an emptied bucket is dropped straight away.
//! * Each bucket is a `SmallVec` – a handful of handles per cell is the
//!   common case, so lookups stay allocation‑free.
//! * Handles are stored once per overlapped cell.  `query_range` does
//!   **not** de‑duplicate; that is the grid's job.

use smallvec::SmallVec;
use std::collections::HashMap;
use std::hash::Hash;

use super::cell::{Bounds, CellCoord, CellKey, CellRange};

/// Small fixed‑capacity cell
pub(crate) type Bucket<H> = SmallVec<[H; 8]>;

/// Sparse bucket map at one fixed cell size.
#[derive(Debug, Clone)]
pub struct HashLevel<H> {
    cell_size: f32,
    buckets: HashMap<CellKey, Bucket<H>>,
}

impl<H: Copy + Eq + Hash> HashLevel<H> {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            buckets: HashMap::new(),
        }
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Inclusive cell rectangle covered by `bounds` at this level.
    #[inline]
    pub fn cell_range(&self, bounds: &Bounds) -> CellRange {
        CellRange::covering(bounds, self.cell_size)
    }

    /// Add `handle` to every bucket in `range`.  Returns how many buckets
    /// actually changed (already‑present entries are left alone).
    #[inline]
    pub fn insert(&mut self, handle: H, range: CellRange) -> u64 {
        self.insert_cells(handle, range.iter())
    }

    /// Remove `handle` from every bucket in `range`.  Missing entries are
    /// ignored; returns how many buckets actually changed.
    #[inline]
    pub fn erase(&mut self, handle: H, range: CellRange) -> u64 {
        self.erase_cells(handle, range.iter())
    }

    pub(crate) fn insert_cells<I>(&mut self, handle: H, cells: I) -> u64
    where
        I: IntoIterator<Item = CellCoord>,
    {
        let mut changed = 0;
        for c in cells {
            let bucket = self.buckets.entry(c.key()).or_default();
            if !bucket.contains(&handle) {
                bucket.push(handle);
                changed += 1;
            }
        }
        changed
    }

    pub(crate) fn erase_cells<I>(&mut self, handle: H, cells: I) -> u64
    where
        I: IntoIterator<Item = CellCoord>,
    {
        let mut changed = 0;
        for c in cells {
            let key = c.key();
            let Some(bucket) = self.buckets.get_mut(&key) else {
                continue;
            };
            if let Some(i) = bucket.iter().position(|h| *h == handle) {
                bucket.swap_remove(i);
                changed += 1;
            }
            if bucket.is_empty() {
                self.buckets.remove(&key);
            }
        }
        changed
    }

    /// Append every handle registered in `range`.  An object that spans
    /// several cells shows up once per cell.
    pub fn query_range(&self, range: CellRange, out: &mut Vec<H>) {
        // Walk whichever side is smaller: the requested rectangle or the
        // occupied buckets.
        if range.cell_count() <= self.buckets.len() as u64 {
            for c in range.iter() {
                if let Some(bucket) = self.buckets.get(&c.key()) {
                    out.extend_from_slice(bucket);
                }
            }
        } else {
            for (key, bucket) in &self.buckets {
                if range.contains(CellCoord::from(*key)) {
                    out.extend_from_slice(bucket);
                }
            }
        }
    }

    /// Handles registered at exactly one cell.
    pub fn bucket(&self, c: CellCoord) -> &[H] {
        self.buckets
            .get(&c.key())
            .map(|b| b.as_slice())
            .unwrap_or(&[])
    }

    #[inline]
    pub fn contains(&self, handle: H, c: CellCoord) -> bool {
        self.bucket(c).contains(&handle)
    }

    /// Number of non‑empty buckets.
    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Total number of (bucket, handle) entries.
    pub fn entry_count(&self) -> usize {
        self.buckets.values().map(|b| b.len()).sum()
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
