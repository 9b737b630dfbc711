use std::collections::HashSet;

use glam::IVec2;
use terrace_core::direction::ALL_DIRECTIONS;
use terrace_core::math::cell_to_chunk;
use terrace_core::types::{CellCoord, ChunkCoord};

/// Pending rebuild work of one terrain, accumulated between rebuilds.
#[derive(Debug, Default, Clone)]
pub struct DirtySet {
    texture_cells: HashSet<CellCoord>,
    texture_chunks: HashSet<ChunkCoord>,
    height_chunks: HashSet<ChunkCoord>,
    side_chunks: HashSet<ChunkCoord>,
}

/// A drained [`DirtySet`], each list sorted by (x, y).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DirtyBatch {
    pub texture_cells: Vec<CellCoord>,
    /// Chunks whose whole atlas must be redrawn.
    pub texture_chunks: Vec<ChunkCoord>,
    pub height_chunks: Vec<ChunkCoord>,
    pub side_chunks: Vec<ChunkCoord>,
}

impl DirtyBatch {
    pub fn is_empty(&self) -> bool {
        self.texture_cells.is_empty()
            && self.texture_chunks.is_empty()
            && self.height_chunks.is_empty()
            && self.side_chunks.is_empty()
    }
}

fn sorted(set: HashSet<IVec2>) -> Vec<IVec2> {
    let mut v: Vec<IVec2> = set.into_iter().collect();
    v.sort_by_key(|c| (c.x, c.y));
    v
}

impl DirtySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a cell and its 8 neighbours for texture redraw; any of their masks may change.
    pub fn mark_texture(&mut self, cell: CellCoord) {
        self.texture_cells.insert(cell);
        for dir in ALL_DIRECTIONS {
            self.texture_cells.insert(cell + dir.offset());
        }
    }

    /// Queue a height change at `local` of `chunk`. Edge cells also dirty the
    /// side walls of the chunk across that edge.
    pub fn mark_height(&mut self, chunk: ChunkCoord, local: IVec2, units: i32) {
        self.height_chunks.insert(chunk);
        for across in boundary_chunks(chunk, local, units) {
            self.side_chunks.insert(across);
        }
    }

    /// Queue a full redraw and re-merge, as for a freshly created chunk.
    pub fn mark_chunk(&mut self, chunk: ChunkCoord) {
        self.texture_chunks.insert(chunk);
        self.height_chunks.insert(chunk);
    }

    /// Drop everything queued for `chunk`.
    pub fn forget_chunk(&mut self, chunk: ChunkCoord, units: i32) {
        self.texture_chunks.remove(&chunk);
        self.height_chunks.remove(&chunk);
        self.side_chunks.remove(&chunk);
        self.texture_cells
            .retain(|c| cell_to_chunk(*c, units) != chunk);
    }

    pub fn is_empty(&self) -> bool {
        self.texture_cells.is_empty()
            && self.texture_chunks.is_empty()
            && self.height_chunks.is_empty()
            && self.side_chunks.is_empty()
    }

    pub fn texture_cell_count(&self) -> usize {
        self.texture_cells.len()
    }

    pub fn height_chunks(&self) -> Vec<ChunkCoord> {
        sorted(self.height_chunks.clone())
    }

    pub fn side_chunks(&self) -> Vec<ChunkCoord> {
        sorted(self.side_chunks.clone())
    }

    /// Take all pending work, leaving the set empty.
    pub fn take(&mut self) -> DirtyBatch {
        let taken = std::mem::take(self);
        DirtyBatch {
            texture_cells: sorted(taken.texture_cells),
            texture_chunks: sorted(taken.texture_chunks),
            height_chunks: sorted(taken.height_chunks),
            side_chunks: sorted(taken.side_chunks),
        }
    }
}

/// Chunks sharing an edge with `local` when it lies on the border of `chunk`.
/// Corner cells touch two chunks; diagonal chunks are never included.
pub fn boundary_chunks(chunk: ChunkCoord, local: IVec2, units: i32) -> Vec<ChunkCoord> {
    let mut out = Vec::with_capacity(2);
    if local.x == 0 {
        out.push(chunk + IVec2::new(-1, 0));
    }
    if local.x == units - 1 {
        out.push(chunk + IVec2::new(1, 0));
    }
    if local.y == 0 {
        out.push(chunk + IVec2::new(0, -1));
    }
    if local.y == units - 1 {
        out.push(chunk + IVec2::new(0, 1));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interior_cell_marks_no_neighbours() {
        let mut dirty = DirtySet::new();
        dirty.mark_height(IVec2::new(2, 2), IVec2::new(3, 5), 16);
        assert_eq!(dirty.height_chunks(), vec![IVec2::new(2, 2)]);
        assert!(dirty.side_chunks().is_empty());
    }

    #[test]
    fn test_edge_cell_marks_adjacent_chunk() {
        let mut dirty = DirtySet::new();
        dirty.mark_height(IVec2::ZERO, IVec2::new(0, 7), 16);
        assert_eq!(dirty.side_chunks(), vec![IVec2::new(-1, 0)]);

        let mut dirty = DirtySet::new();
        dirty.mark_height(IVec2::ZERO, IVec2::new(7, 15), 16);
        assert_eq!(dirty.side_chunks(), vec![IVec2::new(0, 1)]);
    }

    #[test]
    fn test_corner_cell_marks_two_chunks() {
        let mut dirty = DirtySet::new();
        dirty.mark_height(IVec2::new(1, 1), IVec2::new(15, 0), 16);
        assert_eq!(dirty.side_chunks(), vec![IVec2::new(1, 0), IVec2::new(2, 1)]);
    }

    #[test]
    fn test_edits_on_both_sides_of_a_border() {
        // Two edits facing each other across the x border of chunks (0,0) and (1,0):
        // each chunk is height-dirty and each is side-dirty for the other.
        let mut dirty = DirtySet::new();
        dirty.mark_height(IVec2::new(0, 0), IVec2::new(3, 1), 4);
        dirty.mark_height(IVec2::new(1, 0), IVec2::new(0, 1), 4);
        let batch = dirty.take();
        assert_eq!(batch.height_chunks, vec![IVec2::new(0, 0), IVec2::new(1, 0)]);
        assert_eq!(batch.side_chunks, vec![IVec2::new(0, 0), IVec2::new(1, 0)]);
        assert!(dirty.is_empty());
    }

    #[test]
    fn test_single_cell_chunk_marks_all_four() {
        assert_eq!(boundary_chunks(IVec2::ZERO, IVec2::ZERO, 1).len(), 4);
    }

    #[test]
    fn test_texture_marks_neighbourhood() {
        let mut dirty = DirtySet::new();
        dirty.mark_texture(IVec2::new(0, 0));
        dirty.mark_texture(IVec2::new(1, 0));
        // Two overlapping 3x3 neighbourhoods.
        assert_eq!(dirty.texture_cell_count(), 12);
        let batch = dirty.take();
        assert_eq!(batch.texture_cells[0], IVec2::new(-1, -1));
        assert!(batch.texture_chunks.is_empty());
    }

    #[test]
    fn test_forget_chunk() {
        let mut dirty = DirtySet::new();
        dirty.mark_chunk(IVec2::new(1, 1));
        dirty.mark_texture(IVec2::new(5, 5));
        dirty.forget_chunk(IVec2::new(1, 1), 4);
        // Neighbourhood of (5,5) lies entirely in chunk (1,1).
        assert!(dirty.is_empty());
    }
}
