//! Single source of truth for shared terrain constants.
//! Terrain configs, the merger and the rebuild scheduler all read from here.

/// Default world units per cell.
pub const DEFAULT_UNIT_SIZE: f32 = 1.0;

/// Default world units per chunk side.
pub const DEFAULT_CHUNK_SIZE: f32 = 16.0;

/// Lowest height a cell may hold, in local (terrain-relative) units.
pub const MIN_HEIGHT: i32 = 0;

/// Delay in milliseconds between the first edit of a burst and its rebuild.
pub const REBUILD_DELAY_MS: u64 = 50;

/// Edge length in pixels of one tile in source images and chunk atlases.
pub const TILE_PX: u32 = 32;

/// Autotile composite images lay out the 256 masks as a 16x16 grid of slots.
pub const MASK_GRID_WIDTH: u32 = 16;

/// Number of distinct 8-neighbour masks.
pub const MASK_COUNT: usize = 256;

/// RGBA fill used for tile 0 and tiles missing from the table.
pub const NEUTRAL_FILL: [u8; 4] = [128, 128, 128, 255];

/// Tile id meaning "no tile".
pub const EMPTY_TILE: u16 = 0;

/// Quiet period after the last committed edit before an autosave snapshot is taken.
pub const AUTOSAVE_DELAY_MS: u64 = 1000;

/// Committed groups kept in the undo stack; older groups are dropped.
pub const DEFAULT_HISTORY_LIMIT: usize = 200;
