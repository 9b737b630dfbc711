use terrace_core::math::local_index;
use terrace_core::types::{Cell, ChunkCoord, TileId};
use glam::IVec2;

use crate::merge::Block;
use crate::sink::{ColliderId, SurfaceId};

/// Cell data of one chunk: `chunk_units²` cells, row-major by local (u, v).
#[derive(Debug, Clone)]
pub struct Chunk {
    /// Chunk coordinate in chunk-space.
    pub coord: ChunkCoord,
    /// Cells per side.
    pub units: i32,
    pub cells: Vec<Cell>,
}

impl Chunk {
    /// Create a chunk filled with `fill`.
    pub fn new(coord: ChunkCoord, units: i32, fill: Cell) -> Self {
        Self {
            coord,
            units,
            cells: vec![fill; (units * units) as usize],
        }
    }

    /// Rebuild a chunk from decoded layers. Both slices must hold `units²` entries.
    pub fn from_layers(coord: ChunkCoord, units: i32, tiles: &[TileId], heights: &[i32]) -> Self {
        let cells = tiles
            .iter()
            .zip(heights)
            .map(|(&tile, &height)| Cell { tile, height })
            .collect();
        Self {
            coord,
            units,
            cells,
        }
    }

    pub fn cell(&self, local: IVec2) -> Cell {
        self.cells[local_index(local, self.units)]
    }

    pub fn set_cell(&mut self, local: IVec2, cell: Cell) {
        let idx = local_index(local, self.units);
        self.cells[idx] = cell;
    }

    pub fn heights(&self) -> Vec<i32> {
        self.cells.iter().map(|c| c.height).collect()
    }

    pub fn tiles(&self) -> Vec<TileId> {
        self.cells.iter().map(|c| c.tile).collect()
    }
}

/// What was last drawn into one atlas slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawnTile {
    pub tile: TileId,
    pub mask: u8,
}

/// Backend handles and derived geometry of one chunk, kept apart from the
/// cell data so the chunk map stays plain data.
#[derive(Debug, Clone, Default)]
pub struct ChunkHandles {
    pub surface: Option<SurfaceId>,
    pub colliders: Vec<ColliderId>,
    /// Blocks from the last merge pass.
    pub blocks: Vec<Block>,
    /// Per-cell atlas contents; `None` forces a redraw.
    pub drawn: Vec<Option<DrawnTile>>,
}

impl ChunkHandles {
    pub fn new(cells: usize) -> Self {
        Self {
            drawn: vec![None; cells],
            ..Self::default()
        }
    }
}
