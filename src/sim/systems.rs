use glam::Vec2;
use hecs::{Entity, World};
use rand::Rng;

use super::{EntityGrid, GridCell, Position, Seek, SimError, Tracked, Velocity, Wander};
use crate::grid::Bounds;

/// Grid bounds for a tracked entity.
#[inline]
pub fn bounds_of(pos: &Position, tracked: &Tracked) -> Bounds {
    Bounds::from_center_half_extent(pos.0, tracked.half_extent)
}

/* ── Tracking: new entities enter the grid ─────────────────────────── */

/// Add every `Tracked` entity that has no `GridCell` yet.  Returns how
/// many entered the grid.
pub fn track_new(world: &mut World, grid: &mut EntityGrid) -> Result<usize, SimError> {
    let fresh: Vec<(Entity, Bounds)> = world
        .query::<(&Position, &Tracked)>()
        .without::<&GridCell>()
        .iter()
        .map(|(e, (p, t))| (e, bounds_of(p, t)))
        .collect();

    for &(e, bounds) in &fresh {
        let loc = grid.add(e, bounds);
        world.insert_one(e, GridCell(loc))?;
    }
    Ok(fresh.len())
}

/* ── Steering ──────────────────────────────────────────────────────── */

/// Point every seeker at `player`; park it once within `stop_distance`.
pub fn seek(world: &mut World, player: Vec2, stop_distance: f32) {
    for (_, (pos, vel, seek)) in world.query_mut::<(&Position, &mut Velocity, &Seek)>() {
        let to_goal = player - pos.0;
        if to_goal.length() <= stop_distance {
            vel.zero();
        } else {
            vel.0 = to_goal.normalize_or_zero() * seek.speed;
        }
    }
}

/// Pick a fresh random target whenever the old one is reached.
pub fn wander<R: Rng>(world: &mut World, rng: &mut R, arena: &Bounds, dt: f32) {
    for (_, (pos, vel, w)) in world.query_mut::<(&Position, &mut Velocity, &mut Wander)>() {
        let reached = w
            .target
            .is_none_or(|t| t.distance(pos.0) <= w.speed * dt);
        if reached {
            w.target = Some(Vec2::new(
                rng.gen_range(arena.min.x..=arena.max.x),
                rng.gen_range(arena.min.y..=arena.max.y),
            ));
        }
        if let Some(t) = w.target {
            vel.0 = (t - pos.0).normalize_or_zero() * w.speed;
        }
    }
}

/* ── Integration ───────────────────────────────────────────────────── */

/// `pos += vel·dt`.  Tracked entities are kept inside the arena;
/// untracked ones (shots) may leave it.
pub fn integrate(world: &mut World, dt: f32, arena: &Bounds) {
    for (_, (pos, vel, tracked)) in
        world.query_mut::<(&mut Position, &mut Velocity, Option<&Tracked>)>()
    {
        pos.0 += vel.0 * dt;
        if tracked.is_some() {
            let clamped = pos.0.clamp(arena.min, arena.max);
            if clamped.x != pos.0.x {
                vel.0.x = 0.0;
            }
            if clamped.y != pos.0.y {
                vel.0.y = 0.0;
            }
            pos.0 = clamped;
        }
    }
}

/* ── Grid update (the single writer pass) ──────────────────────────── */

/// Re‑bucket every tracked entity for its current position.
/// Returns `(rebucketed, unchanged)`.
pub fn update_grid(world: &mut World, grid: &mut EntityGrid) -> (usize, usize) {
    let mut moved = 0;
    let mut unchanged = 0;
    for (e, (pos, tracked, cell)) in world.query_mut::<(&Position, &Tracked, &mut GridCell)>() {
        let next = grid.move_to(e, cell.0, bounds_of(pos, tracked));
        if next == cell.0 {
            unchanged += 1;
        } else {
            cell.0 = next;
            moved += 1;
        }
    }
    (moved, unchanged)
}

/// Re‑bucket just `entities`, after something other than the update pass
/// moved them.  Entities without a `GridCell` are skipped.
pub fn refresh_cells<I>(world: &mut World, grid: &mut EntityGrid, entities: I)
where
    I: IntoIterator<Item = Entity>,
{
    for e in entities {
        if let Ok((pos, tracked, cell)) =
            world.query_one_mut::<(&Position, &Tracked, &mut GridCell)>(e)
        {
            cell.0 = grid.move_to(e, cell.0, bounds_of(pos, tracked));
        }
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
