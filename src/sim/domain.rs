//! One grid, one world, one clock.
//!
//! A `SpatialDomain` is what a collision or targeting "subsystem" really
//! is: an explicitly owned grid whose lifetime matches a simulation.
//! Nothing is global; pass it by reference to whoever needs it.
//!
//! Each tic runs in two phases:
//!
//! 1. **mutate** – replay deferred commands, enrol new entities, steer,
//!    integrate, re‑bucket (single writer, sequential);
//! 2. **read** – collision and hit queries fan out over rayon against the
//!    now‑stable grid; their output is applied after the pool is done.

use glam::Vec2;
use hecs::{Entity, World};
use rand::Rng;
use thiserror::Error;

use super::collision::{self, Contact};
use super::commands::{self, Command, CommandQueue};
use super::components::*;
use super::systems;
use super::EntityGrid;
use crate::grid::{Bounds, GridConfig, GridError};

/// Errors raised while building or driving a domain.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("grid: {0}")]
    Grid(#[from] GridError),

    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// Entity vanished between two steps of the same phase.
    #[error("entity no longer exists")]
    NoSuchEntity(#[from] hecs::NoSuchEntity),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DomainConfig {
    pub grid: GridConfig,
    /// Half side of the square grid bounds given to agents.  Queries see
    /// a body through these bounds, so it should be at least the body's
    /// collision radius.
    pub half_range: f32,
    /// Projectile hit distance.
    pub hit_radius: f32,
    /// Seekers stop this close to the player.
    pub stop_distance: f32,
    /// Playable area; tracked entities are clamped to it.
    pub arena: Bounds,
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            half_range: 25.0,
            hit_radius: 50.0,
            stop_distance: 50.0,
            arena: Bounds::new(Vec2::splat(-2000.0), Vec2::splat(2000.0)),
        }
    }
}

impl DomainConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        self.grid.validate()?;
        if !(self.half_range > 0.0) {
            return Err(SimError::InvalidArgument("half_range must be > 0"));
        }
        if !(self.hit_radius > 0.0) {
            return Err(SimError::InvalidArgument("hit_radius must be > 0"));
        }
        if !(self.stop_distance >= 0.0) {
            return Err(SimError::InvalidArgument("stop_distance must be >= 0"));
        }
        let size = self.arena.size();
        if !(size.x > 0.0 && size.y > 0.0) {
            return Err(SimError::InvalidArgument("arena must have a positive area"));
        }
        Ok(())
    }
}

/// What one tic did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub commands: usize,
    pub tracked: usize,
    pub moved: usize,
    pub unchanged: usize,
    pub contacts: usize,
    /// Distinct entities queued for despawn by projectile hits.
    pub despawns: usize,
}

pub struct SpatialDomain {
    world: World,
    grid: EntityGrid,
    commands: CommandQueue,
    config: DomainConfig,
    player: Vec2,
    clock: f64,
}

impl SpatialDomain {
    pub fn new(config: DomainConfig) -> Result<Self, SimError> {
        config.validate()?;
        log::info!(
            "domain: {} levels, base cell {}, ratio {}",
            config.grid.levels,
            config.grid.base_cell_size,
            config.grid.ratio
        );
        Ok(Self {
            world: World::new(),
            grid: EntityGrid::new(config.grid)?,
            commands: CommandQueue::new(),
            config,
            player: Vec2::ZERO,
            clock: 0.0,
        })
    }

    /*──────────────────────────── access ────────────────────────────*/

    #[inline]
    pub fn world(&self) -> &World {
        &self.world
    }

    #[inline]
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    #[inline]
    pub fn grid(&self) -> &EntityGrid {
        &self.grid
    }

    #[inline]
    pub fn config(&self) -> &DomainConfig {
        &self.config
    }

    #[inline]
    pub fn commands(&self) -> &CommandQueue {
        &self.commands
    }

    /// Seconds of simulated time.
    #[inline]
    pub fn clock(&self) -> f64 {
        self.clock
    }

    #[inline]
    pub fn player(&self) -> Vec2 {
        self.player
    }

    pub fn set_player(&mut self, p: Vec2) {
        self.player = p;
    }

    /*──────────────────────────── spawning ──────────────────────────*/
    // Spawned entities join the grid at the start of the next tic.

    /// Plain body with a constant velocity.
    pub fn spawn_agent(&mut self, pos: Vec2, radius: f32, vel: Vec2) -> Entity {
        self.world.spawn((
            Position(pos),
            Velocity(vel),
            Radius(radius),
            Tracked {
                half_extent: self.config.half_range,
            },
        ))
    }

    /// Body that roams to random points inside the arena.
    pub fn spawn_wanderer(&mut self, pos: Vec2, radius: f32, speed: f32) -> Entity {
        let e = self.spawn_agent(pos, radius, Vec2::ZERO);
        // just spawned above
        let _ = self.world.insert_one(e, Wander { target: None, speed });
        e
    }

    /// Body that chases the player position.
    pub fn spawn_seeker(&mut self, pos: Vec2, radius: f32, speed: f32) -> Entity {
        let e = self.spawn_agent(pos, radius, Vec2::ZERO);
        let _ = self.world.insert_one(e, Seek { speed });
        e
    }

    /// Body with its own grid extent – large ones end up on coarse levels.
    pub fn spawn_sized(&mut self, pos: Vec2, radius: f32, half_extent: f32) -> Entity {
        self.world.spawn((
            Position(pos),
            Velocity::default(),
            Radius(radius),
            Tracked { half_extent },
        ))
    }

    /// Shot flying along `dir`; despawns itself after `lifetime` seconds.
    pub fn spawn_projectile(&mut self, pos: Vec2, dir: Vec2, speed: f32, lifetime: f32) -> Entity {
        let e = self.world.spawn((
            Position(pos),
            Velocity(dir.normalize_or_zero() * speed),
            Projectile,
        ));
        self.commands
            .push_at(self.clock + lifetime as f64, Command::Despawn(e));
        e
    }

    /*───────────────────────── deferred edits ───────────────────────*/

    pub fn despawn_later(&mut self, e: Entity) {
        self.commands.despawn(e);
    }

    pub fn despawn_after(&mut self, e: Entity, seconds: f32) {
        self.commands
            .push_at(self.clock + seconds as f64, Command::Despawn(e));
    }

    /// Drop from the grid and the world right away (mutate phase only –
    /// `&mut self` guarantees no reader is running).
    pub fn despawn_now(&mut self, e: Entity) -> bool {
        commands::untrack(&mut self.world, &mut self.grid, e);
        self.world.despawn(e).is_ok()
    }

    /// Stop indexing `e` without despawning it.
    pub fn untrack(&mut self, e: Entity) -> bool {
        let was = commands::untrack(&mut self.world, &mut self.grid, e);
        if was {
            let _ = self.world.remove_one::<Tracked>(e);
        }
        was
    }

    /*──────────────────────────── queries ───────────────────────────*/

    /// Everything within `radius` of `center`; each hit is queued for
    /// despawn at the next tic.
    pub fn select_in_area(&mut self, center: Vec2, radius: f32) -> Vec<Entity> {
        let hits = collision::bodies_in_radius(&self.world, &self.grid, center, radius);
        log::debug!("area select at {center} r={radius}: {} hit", hits.len());
        for &e in &hits {
            self.commands.despawn(e);
        }
        hits
    }

    /// Closest body to `point` within `radius`, if any.
    pub fn nearest_to(&self, point: Vec2, radius: f32) -> Option<Entity> {
        collision::bodies_in_radius(&self.world, &self.grid, point, radius)
            .into_iter()
            .filter_map(|e| {
                let d = self.world.get::<&Position>(e).ok()?.0.distance_squared(point);
                Some((e, d))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(e, _)| e)
    }

    /*───────────────────────────── tic ──────────────────────────────*/

    pub fn tick<R: Rng>(&mut self, dt: f32, rng: &mut R) -> Result<TickReport, SimError> {
        self.clock += dt as f64;
        let mut report = TickReport::default();

        /* --- mutate phase -------------------------------------------- */
        report.commands = self
            .commands
            .apply_due(&mut self.world, &mut self.grid, self.clock);
        report.tracked = systems::track_new(&mut self.world, &mut self.grid)?;
        systems::seek(&mut self.world, self.player, self.config.stop_distance);
        systems::wander(&mut self.world, rng, &self.config.arena, dt);
        systems::integrate(&mut self.world, dt, &self.config.arena);
        (report.moved, report.unchanged) = systems::update_grid(&mut self.world, &mut self.grid);

        /* --- read phase ---------------------------------------------- */
        let (contacts, hits): (Vec<Contact>, Vec<Command>) = rayon::join(
            || collision::resolve_collisions(&self.world, &self.grid),
            || collision::projectile_hits(&self.world, &self.grid, self.config.hit_radius),
        );

        /* --- hand results back to the writer ------------------------- */
        collision::apply_contacts(&mut self.world, &contacts);
        systems::refresh_cells(
            &mut self.world,
            &mut self.grid,
            contacts.iter().map(|c| c.entity),
        );
        report.contacts = contacts.len();
        report.despawns = hits.len();
        for cmd in hits {
            self.commands.push(cmd);
        }

        log::debug!(
            "t={:.3} moved={} unchanged={} contacts={} despawns={}",
            self.clock,
            report.moved,
            report.unchanged,
            report.contacts,
            report.despawns
        );
        Ok(report)
    }

    /// Drop everything: entities, buckets, pending commands.
    pub fn clear(&mut self) {
        self.world.clear();
        self.grid.clear();
        self.commands = CommandQueue::new();
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
