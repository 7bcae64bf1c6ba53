use glam::Vec2;

use crate::grid::CellLocation;

/// World‑space position (X/Y only – the grid never sees height).
#[derive(Debug, Clone, Copy)]
pub struct Position(pub Vec2);

#[derive(Debug, Clone, Copy, Default)]
pub struct Velocity(pub Vec2);

impl Velocity {
    #[inline]
    pub fn zero(&mut self) {
        self.0 = Vec2::ZERO;
    }
}

/// Collision radius used by the exact circle test.
#[derive(Debug, Clone, Copy)]
pub struct Radius(pub f32);

/// Marks an entity that belongs in the spatial grid.  Its grid bounds
/// are the square `position ± half_extent`.
#[derive(Debug, Clone, Copy)]
pub struct Tracked {
    pub half_extent: f32,
}

/// Where the entity currently sits in the grid.  Added by the tracking
/// pass, rewritten every tic by the grid update pass; never edit by hand.
#[derive(Debug, Clone, Copy)]
pub struct GridCell(pub CellLocation);

/// Short‑lived shot; tested against the grid, never stored in it.
#[derive(Debug, Clone, Copy)]
pub struct Projectile;

/// Random roaming inside the arena.
#[derive(Debug, Clone, Copy)]
pub struct Wander {
    pub target: Option<Vec2>,
    pub speed: f32,
}

/// Walks toward the domain's player position, stops when close.
#[derive(Debug, Clone, Copy)]
pub struct Seek {
    pub speed: f32,
}
