//! Deferred structural changes.
//!
//! The read phase only holds `&World`/`&EntityGrid`, so anything that
//! would add or remove entities is written down here and replayed at the
//! start of the next mutate phase.  Timed entries wait until the domain
//! clock reaches their due time.

use hecs::{Entity, World};

use super::{EntityGrid, GridCell, Tracked};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Drop the entity from the grid, then from the world.
    Despawn(Entity),
    /// Drop the entity from the grid but keep it alive.
    Untrack(Entity),
}

#[derive(Debug, Clone, Copy)]
struct Timed {
    due: f64,
    cmd: Command,
}

#[derive(Debug, Default)]
pub struct CommandQueue {
    ready: Vec<Command>,
    timed: Vec<Timed>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, cmd: Command) {
        self.ready.push(cmd);
    }

    #[inline]
    pub fn despawn(&mut self, e: Entity) {
        self.push(Command::Despawn(e));
    }

    /// Run `cmd` once the domain clock reaches `due` (seconds).
    pub fn push_at(&mut self, due: f64, cmd: Command) {
        self.timed.push(Timed { due, cmd });
    }

    pub fn len(&self) -> usize {
        self.ready.len() + self.timed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ready.is_empty() && self.timed.is_empty()
    }

    /// Take every command that is due at `now`, immediate ones first,
    /// timed ones in due order.
    pub fn take_due(&mut self, now: f64) -> Vec<Command> {
        let mut out = std::mem::take(&mut self.ready);

        let mut due: Vec<Timed> = Vec::new();
        self.timed.retain(|t| {
            if t.due <= now {
                due.push(*t);
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| a.due.total_cmp(&b.due));
        out.extend(due.into_iter().map(|t| t.cmd));
        out
    }

    /// Apply everything due at `now`.  Returns how many commands ran.
    ///
    /// Entities already gone are skipped, so duplicate despawns coming
    /// from several readers in the same tic are fine.
    pub fn apply_due(&mut self, world: &mut World, grid: &mut EntityGrid, now: f64) -> usize {
        let cmds = self.take_due(now);
        for cmd in &cmds {
            log::trace!("apply {cmd:?}");
            match *cmd {
                Command::Despawn(e) => {
                    untrack(world, grid, e);
                    // NoSuchEntity: already despawned earlier this batch
                    let _ = world.despawn(e);
                }
                Command::Untrack(e) => {
                    untrack(world, grid, e);
                    // otherwise the tracking pass enrols it again
                    let _ = world.remove_one::<Tracked>(e);
                }
            }
        }
        cmds.len()
    }
}

/// Remove `e` from the grid using its stored location.  Returns `false`
/// if it was not tracked.
pub fn untrack(world: &mut World, grid: &mut EntityGrid, e: Entity) -> bool {
    match world.remove_one::<GridCell>(e) {
        Ok(GridCell(loc)) => {
            grid.remove(e, loc);
            true
        }
        Err(_) => false,
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
