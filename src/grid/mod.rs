mod cell;
mod config;
mod hierarchical;
mod level;

pub use cell::{Bounds, CellCoord, CellKey, CellLocation, CellRange};
pub use config::{GridConfig, GridError, MAX_LEVELS};
pub use hierarchical::{GridStats, HierarchicalHashGrid};
pub use level::HashLevel;
