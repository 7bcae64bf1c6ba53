use thiserror::Error;

/// Hard cap on the hierarchy depth (level index is stored as `u8`).
pub const MAX_LEVELS: usize = 16;

/// Construction parameters, fixed for the grid's lifetime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridConfig {
    /// Cell size of level 0, in world units.
    pub base_cell_size: f32,
    /// Number of levels in the hierarchy.
    pub levels: usize,
    /// Each level's cells are `ratio` times wider than the level below.
    pub ratio: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            base_cell_size: 100.0,
            levels: 3,
            ratio: 4,
        }
    }
}

/// Errors that can be encountered while building a grid.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    #[error("base cell size must be finite and > 0 (got {0})")]
    NonPositiveCellSize(f32),

    #[error("a grid needs at least one level")]
    NoLevels,

    #[error("too many levels: {0} (max {MAX_LEVELS})")]
    TooManyLevels(usize),

    #[error("growth ratio must be at least 2 (got {0})")]
    RatioTooSmall(u32),
}

impl GridConfig {
    pub fn new(base_cell_size: f32, levels: usize, ratio: u32) -> Self {
        Self {
            base_cell_size,
            levels,
            ratio,
        }
    }

    pub fn validate(&self) -> Result<(), GridError> {
        if !(self.base_cell_size.is_finite() && self.base_cell_size > 0.0) {
            return Err(GridError::NonPositiveCellSize(self.base_cell_size));
        }
        if self.levels == 0 {
            return Err(GridError::NoLevels);
        }
        if self.levels > MAX_LEVELS {
            return Err(GridError::TooManyLevels(self.levels));
        }
        if self.ratio < 2 {
            return Err(GridError::RatioTooSmall(self.ratio));
        }
        Ok(())
    }

    /// `base × ratio^level`
    #[inline]
    pub fn cell_size(&self, level: usize) -> f32 {
        self.base_cell_size * (self.ratio as f32).powi(level as i32)
    }
}
