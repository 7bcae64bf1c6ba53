//! Read‑phase passes: everything here only borrows the world and the grid
//! immutably and fans out over rayon's pool.  Results come back as plain
//! data and are applied afterwards by the caller.
//!
//! ✔ broad‑phase through the grid, exact circle test here
//! ✔ no structural change to `World` while the pool is busy

use std::collections::{HashMap, HashSet};

use glam::Vec2;
use hecs::{Entity, World};
use rayon::prelude::*;

use super::{Command, EntityGrid, GridCell, Position, Projectile, Radius, Velocity};
use crate::grid::Bounds;

/// Push‑out result for one body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub entity: Entity,
    pub pos: Vec2,
    pub vel: Vec2,
    pub normal: Vec2,
}

/// Position + radius of every body currently in the grid.
type Bodies = HashMap<Entity, (Vec2, f32)>;

fn snapshot_bodies(world: &World) -> Bodies {
    world
        .query::<(&Position, &Radius, &GridCell)>()
        .iter()
        .map(|(e, (p, r, _))| (e, (p.0, r.0)))
        .collect()
}

/* ───────────────────────── body vs body ────────────────────────── */

/// Separate overlapping bodies.  Each body looks around itself with
/// `query_small`, then pushes itself out by half the penetration depth
/// and drops the velocity component along the last hit normal.
pub fn resolve_collisions(world: &World, grid: &EntityGrid) -> Vec<Contact> {
    let bodies = snapshot_bodies(world);
    let movers: Vec<(Entity, Vec2, f32, Vec2)> = world
        .query::<(&Position, &Radius, &Velocity, &GridCell)>()
        .iter()
        .map(|(e, (p, r, v, _))| (e, p.0, r.0, v.0))
        .collect();

    movers
        .par_iter()
        .filter_map(|&(e, pos, radius, vel)| push_out(grid, &bodies, e, pos, radius, vel))
        .collect()
}

fn push_out(
    grid: &EntityGrid,
    bodies: &Bodies,
    e: Entity,
    mut pos: Vec2,
    radius: f32,
    vel: Vec2,
) -> Option<Contact> {
    let mut near = Vec::new();
    grid.query_small(Bounds::from_center_half_extent(pos, radius * 2.0), &mut near);

    let mut normal = None;
    for other in near {
        if other == e {
            continue;
        }
        let Some(&(other_pos, other_r)) = bodies.get(&other) else {
            continue;
        };
        let reach = radius + other_r;
        let d = pos - other_pos;
        let dist_sq = d.length_squared();
        if dist_sq >= reach * reach {
            continue;
        }
        // coincident centres: split along X, lower id goes left
        let dir = d
            .try_normalize()
            .unwrap_or(if e.id() < other.id() { Vec2::NEG_X } else { Vec2::X });
        let depth = reach - dist_sq.sqrt() + 0.01;
        pos += dir * (depth * 0.5);
        normal = Some(dir);
    }

    normal.map(|n| Contact {
        entity: e,
        pos,
        vel: vel - n * vel.dot(n),
        normal: n,
    })
}

/// Write contact results back.  Positions only; the caller re‑buckets
/// the touched entities.
pub fn apply_contacts(world: &mut World, contacts: &[Contact]) {
    for c in contacts {
        if let Ok((pos, vel)) = world.query_one_mut::<(&mut Position, &mut Velocity)>(c.entity) {
            pos.0 = c.pos;
            vel.0 = c.vel;
        }
    }
}

/* ──────────────────────── shot vs bodies ───────────────────────── */

/// Every projectile within `hit_radius` of a body despawns itself and
/// everything it touched.  Uses the full query so large bodies on
/// coarse levels are never missed.
///
/// Each entity appears at most once, even when several shots touch it.
pub fn projectile_hits(world: &World, grid: &EntityGrid, hit_radius: f32) -> Vec<Command> {
    let bodies = snapshot_bodies(world);
    let shots: Vec<(Entity, Vec2)> = world
        .query::<(&Position, &Projectile)>()
        .iter()
        .map(|(e, (p, _))| (e, p.0))
        .collect();

    let mut cmds: Vec<Command> = shots
        .par_iter()
        .flat_map_iter(|&(shot, pos)| {
            let mut near = Vec::new();
            grid.query(Bounds::from_center_half_extent(pos, hit_radius), &mut near);
            let mut victims: Vec<Command> = near
                .into_iter()
                .filter(|&other| other != shot)
                .filter(|other| {
                    bodies
                        .get(other)
                        .is_some_and(|&(p, _)| p.distance(pos) <= hit_radius)
                })
                .map(Command::Despawn)
                .collect();
            if !victims.is_empty() {
                victims.push(Command::Despawn(shot));
            }
            victims
        })
        .collect();
    let mut seen = HashSet::with_capacity(cmds.len());
    cmds.retain(|c| seen.insert(*c));
    cmds
}

/// Bodies whose centre lies within `radius` of `center`, via the full
/// query.  Order is unspecified.
pub fn bodies_in_radius(world: &World, grid: &EntityGrid, center: Vec2, radius: f32) -> Vec<Entity> {
    let mut near = Vec::new();
    grid.query(Bounds::from_center_half_extent(center, radius), &mut near);
    near.retain(|&e| {
        world
            .get::<&Position>(e)
            .is_ok_and(|p| p.0.distance(center) <= radius)
    });
    near
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
