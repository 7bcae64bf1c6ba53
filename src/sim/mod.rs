mod collision;
mod commands;
mod components;
mod domain;
mod systems;
mod tic;

use hecs::Entity;

use crate::grid::HierarchicalHashGrid;

/// The grid every simulation pass shares, keyed by ECS entity.
pub type EntityGrid = HierarchicalHashGrid<Entity>;

pub use collision::{Contact, apply_contacts, bodies_in_radius, projectile_hits, resolve_collisions};
pub use commands::{Command, CommandQueue, untrack};
pub use components::{GridCell, Position, Projectile, Radius, Seek, Tracked, Velocity, Wander};
pub use domain::{DomainConfig, SimError, SpatialDomain, TickReport};
pub use systems::{bounds_of, integrate, refresh_cells, seek, track_new, update_grid, wander};
pub use tic::{DT, RunSummary, SIM_FPS, TicRunner};
