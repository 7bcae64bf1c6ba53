//! Cell maths shared by every level: world bounds → integer cell ranges.
//!
//! * A cell coordinate is `floor(world / cell_size)` on each axis.
//! * Ranges are **inclusive** on both ends, so a zero‑size box still
//!   covers exactly one cell.
//! * Only X/Y matter; height never reaches the grid.

use glam::Vec2;

/*──────────────────────────── bounds ────────────────────────────*/

/// Axis‑aligned box in world units (2‑D projection only).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    /// Build from two corners.  Inverted input is normalised so that
    /// `min <= max` on both axes.
    #[inline]
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Square box around `center`, the shape every tracked agent uses.
    #[inline]
    pub fn from_center_half_extent(center: Vec2, half: f32) -> Self {
        Self::new(center - Vec2::splat(half), center + Vec2::splat(half))
    }

    /// Degenerate box (a single point).
    #[inline]
    pub fn from_point(p: Vec2) -> Self {
        Self { min: p, max: p }
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Largest side – the value level selection compares against.
    #[inline]
    pub fn extent(&self) -> f32 {
        let s = self.size();
        s.x.max(s.y)
    }

    /// Closed‑interval overlap test (touching edges count).
    #[inline]
    pub fn overlaps(&self, other: &Bounds) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }
}

/*──────────────────────── cell coordinates ──────────────────────*/

/// Integer cell index at one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    pub x: i32,
    pub y: i32,
}

impl CellCoord {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// `floor(p / cell_size)` per axis.  Out‑of‑range values saturate.
    #[inline]
    pub fn from_world(p: Vec2, cell_size: f32) -> Self {
        let c = (p / cell_size).floor();
        Self {
            x: c.x as i32,
            y: c.y as i32,
        }
    }

    #[inline]
    pub fn key(self) -> CellKey {
        CellKey::from(self)
    }
}

/// Bucket lookup key: both axes packed into one word.
///
/// The packing is a bijection over `(i32, i32)`, so two different
/// coordinates can never alias onto the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellKey(pub u64);

impl From<CellCoord> for CellKey {
    #[inline]
    fn from(c: CellCoord) -> Self {
        CellKey(((c.x as u32 as u64) << 32) | c.y as u32 as u64)
    }
}

impl From<CellKey> for CellCoord {
    #[inline]
    fn from(k: CellKey) -> Self {
        CellCoord {
            x: (k.0 >> 32) as u32 as i32,
            y: k.0 as u32 as i32,
        }
    }
}

/*─────────────────────────── ranges ─────────────────────────────*/

/// Inclusive rectangle of cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    pub min: CellCoord,
    pub max: CellCoord,
}

impl CellRange {
    /// Cells touched by `bounds` at the given cell size.
    #[inline]
    pub fn covering(bounds: &Bounds, cell_size: f32) -> Self {
        let a = CellCoord::from_world(bounds.min, cell_size);
        let b = CellCoord::from_world(bounds.max, cell_size);
        Self {
            min: CellCoord::new(a.x.min(b.x), a.y.min(b.y)),
            max: CellCoord::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Number of cells in the rectangle (always ≥ 1, saturating).
    #[inline]
    pub fn cell_count(&self) -> u64 {
        let w = (self.max.x as i64 - self.min.x as i64 + 1) as u64;
        let h = (self.max.y as i64 - self.min.y as i64 + 1) as u64;
        w.saturating_mul(h)
    }

    #[inline]
    pub fn contains(&self, c: CellCoord) -> bool {
        (self.min.x..=self.max.x).contains(&c.x) && (self.min.y..=self.max.y).contains(&c.y)
    }

    /// Row‑major walk over every cell.
    pub fn iter(self) -> impl Iterator<Item = CellCoord> {
        let CellRange { min, max } = self;
        (min.y..=max.y).flat_map(move |y| (min.x..=max.x).map(move |x| CellCoord::new(x, y)))
    }
}

/// Book‑keeping the caller stores next to the object between calls.
///
/// It is the **only** way back into the buckets: `move_to` and
/// `remove` trust it blindly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellLocation {
    pub level: u8,
    pub range: CellRange,
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use glam::vec2;

    #[test]
    fn floor_handles_negative_coordinates() {
        assert_eq!(CellCoord::from_world(vec2(-0.5, 0.5), 100.0), CellCoord::new(-1, 0));
        assert_eq!(CellCoord::from_world(vec2(-100.0, 99.9), 100.0), CellCoord::new(-1, 0));
        assert_eq!(CellCoord::from_world(vec2(-100.1, 100.0), 100.0), CellCoord::new(-2, 1));
    }

    #[test]
    fn degenerate_bounds_cover_one_cell() {
        let r = CellRange::covering(&Bounds::from_point(vec2(42.0, 7.0)), 10.0);
        assert_eq!(r.min, r.max);
        assert_eq!(r.cell_count(), 1);
        assert_eq!(r.iter().count(), 1);
    }

    #[test]
    fn inverted_bounds_are_normalised() {
        let b = Bounds::new(vec2(140.0, 140.0), vec2(90.0, 90.0));
        assert_eq!(b.min, vec2(90.0, 90.0));
        let r = CellRange::covering(&b, 100.0);
        assert_eq!(r.min, CellCoord::new(0, 0));
        assert_eq!(r.max, CellCoord::new(1, 1));
        assert_eq!(r.cell_count(), 4);
    }

    #[test]
    fn key_roundtrips_extreme_coordinates() {
        for c in [
            CellCoord::new(0, 0),
            CellCoord::new(-1, 1),
            CellCoord::new(i32::MIN, i32::MAX),
            CellCoord::new(i32::MAX, -7),
        ] {
            assert_eq!(CellCoord::from(c.key()), c);
        }
        // mirrored coordinates must not alias
        assert_ne!(CellCoord::new(1, -1).key(), CellCoord::new(-1, 1).key());
    }

    #[test]
    fn range_iter_visits_each_cell_once() {
        let r = CellRange {
            min: CellCoord::new(-1, 2),
            max: CellCoord::new(1, 3),
        };
        let cells: Vec<_> = r.iter().collect();
        assert_eq!(cells.len() as u64, r.cell_count());
        assert!(cells.iter().all(|c| r.contains(*c)));
        assert!(!r.contains(CellCoord::new(2, 2)));
    }

    #[test]
    fn touching_boxes_overlap() {
        let a = Bounds::new(vec2(0.0, 0.0), vec2(10.0, 10.0));
        let b = Bounds::new(vec2(10.0, 0.0), vec2(20.0, 5.0));
        let c = Bounds::new(vec2(10.1, 0.0), vec2(20.0, 5.0));
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }
}
