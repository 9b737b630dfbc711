use serde::{Deserialize, Serialize};
use terrace_core::constants::{
    DEFAULT_CHUNK_SIZE, DEFAULT_UNIT_SIZE, MIN_HEIGHT, REBUILD_DELAY_MS,
};
use terrace_core::TerraceError;

/// Grid geometry and scheduling parameters of one terrain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerrainConfig {
    /// World units per cell.
    #[serde(default = "default_unit_size")]
    pub unit_size: f32,
    /// World units per chunk side. Must be a whole multiple of `unit_size`.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: f32,
    /// Lowest local height a cell may take; lower edits are clamped.
    #[serde(default = "default_min_height")]
    pub min_height: i32,
    /// Coalescing window for rebuilds.
    #[serde(default = "default_rebuild_delay")]
    pub rebuild_delay_ms: u64,
}

fn default_unit_size() -> f32 {
    DEFAULT_UNIT_SIZE
}

fn default_chunk_size() -> f32 {
    DEFAULT_CHUNK_SIZE
}

fn default_min_height() -> i32 {
    MIN_HEIGHT
}

fn default_rebuild_delay() -> u64 {
    REBUILD_DELAY_MS
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            unit_size: DEFAULT_UNIT_SIZE,
            chunk_size: DEFAULT_CHUNK_SIZE,
            min_height: MIN_HEIGHT,
            rebuild_delay_ms: REBUILD_DELAY_MS,
        }
    }
}

impl TerrainConfig {
    pub fn new(unit_size: f32, chunk_size: f32) -> Self {
        Self {
            unit_size,
            chunk_size,
            ..Self::default()
        }
    }

    /// Cells per chunk side.
    pub fn chunk_units(&self) -> i32 {
        (self.chunk_size / self.unit_size).round() as i32
    }

    pub fn cells_per_chunk(&self) -> usize {
        let n = self.chunk_units() as usize;
        n * n
    }

    pub fn validate(&self) -> Result<(), TerraceError> {
        if !(self.unit_size.is_finite() && self.unit_size > 0.0) {
            return Err(TerraceError::InvalidConfig(format!(
                "unit_size must be positive, got {}",
                self.unit_size
            )));
        }
        if !(self.chunk_size.is_finite() && self.chunk_size >= self.unit_size) {
            return Err(TerraceError::InvalidConfig(format!(
                "chunk_size {} must be at least unit_size {}",
                self.chunk_size, self.unit_size
            )));
        }
        let units = self.chunk_size / self.unit_size;
        if (units - units.round()).abs() > 1e-4 {
            return Err(TerraceError::InvalidConfig(format!(
                "chunk_size {} is not a multiple of unit_size {}",
                self.chunk_size, self.unit_size
            )));
        }
        Ok(())
    }
}
