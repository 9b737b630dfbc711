use glam::IVec2;

use crate::types::{CellCoord, ChunkCoord};

/// Convert a global cell coordinate to its containing chunk coordinate.
pub fn cell_to_chunk(cell: CellCoord, chunk_units: i32) -> ChunkCoord {
    IVec2::new(cell.x.div_euclid(chunk_units), cell.y.div_euclid(chunk_units))
}

/// Convert a global cell coordinate to its local offset within a chunk.
pub fn cell_to_local(cell: CellCoord, chunk_units: i32) -> IVec2 {
    IVec2::new(cell.x.rem_euclid(chunk_units), cell.y.rem_euclid(chunk_units))
}

/// Convert a chunk coordinate and local offset back to a global cell coordinate.
pub fn chunk_local_to_cell(chunk: ChunkCoord, local: IVec2, chunk_units: i32) -> CellCoord {
    chunk * chunk_units + local
}

/// Linear offset of a local cell in a chunk's row-major cell array.
pub fn local_index(local: IVec2, chunk_units: i32) -> usize {
    (local.x * chunk_units + local.y) as usize
}

/// Map a world-space (x, z) position to the cell under it.
pub fn world_to_cell(x: f32, z: f32, origin_x: f32, origin_z: f32, unit_size: f32) -> CellCoord {
    IVec2::new(
        ((x - origin_x) / unit_size).floor() as i32,
        ((z - origin_z) / unit_size).floor() as i32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_cells_floor_divide() {
        assert_eq!(cell_to_chunk(IVec2::new(-1, -16), 16), IVec2::new(-1, -1));
        assert_eq!(cell_to_chunk(IVec2::new(-17, 15), 16), IVec2::new(-2, 0));
        assert_eq!(cell_to_local(IVec2::new(-1, -16), 16), IVec2::new(15, 0));
    }

    #[test]
    fn test_chunk_local_roundtrip() {
        for (x, y) in [(0, 0), (5, -7), (-33, 40), (15, 16)] {
            let cell = IVec2::new(x, y);
            let chunk = cell_to_chunk(cell, 16);
            let local = cell_to_local(cell, 16);
            assert_eq!(chunk_local_to_cell(chunk, local, 16), cell);
        }
    }

    #[test]
    fn test_local_index_row_major() {
        assert_eq!(local_index(IVec2::new(0, 0), 4), 0);
        assert_eq!(local_index(IVec2::new(0, 3), 4), 3);
        assert_eq!(local_index(IVec2::new(1, 0), 4), 4);
        assert_eq!(local_index(IVec2::new(3, 3), 4), 15);
    }

    #[test]
    fn test_world_to_cell_respects_origin_and_unit() {
        assert_eq!(world_to_cell(5.5, 5.0, 0.0, 0.0, 1.0), IVec2::new(5, 5));
        assert_eq!(world_to_cell(-0.5, 0.0, 0.0, 0.0, 1.0), IVec2::new(-1, 0));
        assert_eq!(world_to_cell(10.0, 4.0, 2.0, 0.0, 2.0), IVec2::new(4, 2));
    }
}
