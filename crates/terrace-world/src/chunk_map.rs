use std::collections::HashMap;

use terrace_core::math::{cell_to_chunk, cell_to_local};
use terrace_core::types::{Cell, CellCoord, ChunkCoord};

use crate::chunk::Chunk;

/// Spatial container for all chunks of one terrain. Chunks are created on
/// first access and only removed explicitly.
pub struct ChunkMap {
    chunks: HashMap<ChunkCoord, Chunk>,
    units: i32,
    fill: Cell,
}

impl ChunkMap {
    pub fn new(units: i32, fill: Cell) -> Self {
        Self {
            chunks: HashMap::new(),
            units,
            fill,
        }
    }

    /// Get the chunk at `coord`, creating it if absent.
    /// The flag is true when the chunk was created by this call.
    pub fn get_or_create(&mut self, coord: ChunkCoord) -> (&mut Chunk, bool) {
        let units = self.units;
        let fill = self.fill;
        let mut created = false;
        let chunk = self.chunks.entry(coord).or_insert_with(|| {
            created = true;
            Chunk::new(coord, units, fill)
        });
        (chunk, created)
    }

    pub fn insert(&mut self, chunk: Chunk) {
        self.chunks.insert(chunk.coord, chunk);
    }

    pub fn remove(&mut self, coord: &ChunkCoord) -> Option<Chunk> {
        self.chunks.remove(coord)
    }

    pub fn get(&self, coord: &ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(coord)
    }

    pub fn contains(&self, coord: &ChunkCoord) -> bool {
        self.chunks.contains_key(coord)
    }

    /// Chunk coordinate owning a global cell.
    pub fn chunk_of(&self, cell: CellCoord) -> ChunkCoord {
        cell_to_chunk(cell, self.units)
    }

    /// Read a cell, creating its chunk if needed. Returns the created flag too.
    pub fn cell(&mut self, cell: CellCoord) -> (Cell, bool) {
        let (chunk, created) = self.get_or_create(cell_to_chunk(cell, self.units));
        (chunk.cell(cell_to_local(cell, chunk.units)), created)
    }

    /// Write a cell, creating its chunk if needed. Returns the created flag.
    pub fn set_cell(&mut self, cell: CellCoord, value: Cell) -> bool {
        let (chunk, created) = self.get_or_create(cell_to_chunk(cell, self.units));
        let local = cell_to_local(cell, chunk.units);
        chunk.set_cell(local, value);
        created
    }

    /// Read a cell without creating anything; absent chunks read as the fill cell.
    pub fn peek_cell(&self, cell: CellCoord) -> Cell {
        self.chunks
            .get(&cell_to_chunk(cell, self.units))
            .map(|c| c.cell(cell_to_local(cell, self.units)))
            .unwrap_or(self.fill)
    }

    /// Chunk coordinates sorted for deterministic iteration.
    pub fn sorted_coords(&self) -> Vec<ChunkCoord> {
        let mut coords: Vec<ChunkCoord> = self.chunks.keys().copied().collect();
        coords.sort_by_key(|c| (c.x, c.y));
        coords
    }

    pub fn loaded_count(&self) -> u32 {
        self.chunks.len() as u32
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec2;
    use terrace_core::TileId;

    #[test]
    fn test_chunk_map_insert_remove() {
        let mut map = ChunkMap::new(4, Cell::default());
        let coord = IVec2::new(1, 1);
        let (_, created) = map.get_or_create(coord);
        assert!(created);
        assert!(map.get(&coord).is_some());
        assert!(map.contains(&coord));

        map.remove(&coord);
        assert!(map.get(&coord).is_none());
    }

    #[test]
    fn test_get_or_create_idempotent() {
        let mut map = ChunkMap::new(4, Cell::default());
        let coord = IVec2::new(2, -3);
        assert!(map.get_or_create(coord).1);
        assert!(!map.get_or_create(coord).1);
        assert_eq!(map.loaded_count(), 1);
    }

    #[test]
    fn test_any_coordinate_resolves() {
        let mut map = ChunkMap::new(4, Cell::default());
        let far = IVec2::new(-1_000_003, 77_777);
        let (cell, created) = map.cell(far);
        assert!(created);
        assert_eq!(cell, Cell::default());
        map.set_cell(far, Cell::new(TileId(9), 4));
        assert_eq!(map.cell(far).0, Cell::new(TileId(9), 4));
        assert_eq!(map.chunk_of(far), IVec2::new(-250_001, 19_444));
    }

    #[test]
    fn test_peek_does_not_create() {
        let map = ChunkMap::new(4, Cell::new(TileId(0), 0));
        assert_eq!(map.peek_cell(IVec2::new(10, 10)), Cell::default());
        assert_eq!(map.loaded_count(), 0);
    }

    #[test]
    fn test_sorted_coords_deterministic() {
        let mut map = ChunkMap::new(2, Cell::default());
        for c in [IVec2::new(1, 0), IVec2::new(-1, 5), IVec2::new(0, 0), IVec2::new(-1, -2)] {
            map.get_or_create(c);
        }
        assert_eq!(
            map.sorted_coords(),
            vec![
                IVec2::new(-1, -2),
                IVec2::new(-1, 5),
                IVec2::new(0, 0),
                IVec2::new(1, 0)
            ]
        );
    }
}
