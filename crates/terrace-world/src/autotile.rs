//! Neighbour-mask autotiling.
//!
//! Each autotile definition gets a composite image holding one tile-sized slot
//! per mask value, laid out 16 slots wide. A slot is composed from four
//! half-tile quadrants the first time its mask is requested.

use std::collections::HashMap;

use terrace_core::constants::{MASK_COUNT, MASK_GRID_WIDTH, NEUTRAL_FILL, TILE_PX};
use terrace_core::direction::{Direction, ALL_DIRECTIONS};
use terrace_core::tile::{AutotileKind, TileDef, TileRect, TileTable};
use terrace_core::types::{Cell, TileId};

use crate::sink::{CompositeId, ImageKey, TerrainSink};

/// Build the 8-bit agreement mask of `center`: bit `k` is set when the
/// neighbour in direction `k` has the same tile and the same height.
pub fn neighbor_mask(center: Cell, neighbor: impl Fn(Direction) -> Cell) -> u8 {
    ALL_DIRECTIONS
        .iter()
        .filter(|&&dir| neighbor(dir).matches(&center))
        .fold(0, |mask, dir| mask | dir.bit())
}

/// Screen quadrant of a tile, with the three neighbours that shape it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quadrant {
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

const QUADRANTS: [Quadrant; 4] = [
    Quadrant::NorthWest,
    Quadrant::NorthEast,
    Quadrant::SouthWest,
    Quadrant::SouthEast,
];

impl Quadrant {
    /// (horizontal side, corner, vertical side).
    fn neighbours(self) -> (Direction, Direction, Direction) {
        match self {
            Quadrant::NorthWest => (Direction::West, Direction::NorthWest, Direction::North),
            Quadrant::NorthEast => (Direction::East, Direction::NorthEast, Direction::North),
            Quadrant::SouthWest => (Direction::West, Direction::SouthWest, Direction::South),
            Quadrant::SouthEast => (Direction::East, Direction::SouthEast, Direction::South),
        }
    }

    /// Offset in half tiles inside the destination slot.
    fn offset(self) -> (u32, u32) {
        match self {
            Quadrant::NorthWest => (0, 0),
            Quadrant::NorthEast => (1, 0),
            Quadrant::SouthWest => (0, 1),
            Quadrant::SouthEast => (1, 1),
        }
    }

    /// `side_a | corner << 1 | side_b << 2`.
    fn sub_mask(self, mask: u8) -> usize {
        let (a, c, b) = self.neighbours();
        let bit = |d: Direction| usize::from(mask & d.bit() != 0);
        bit(a) | bit(c) << 1 | bit(b) << 2
    }
}

/// Half-tile (column, row) source positions indexed by sub-mask.
/// 0/2 outer corner, 1/3 horizontal edge, 4/6 vertical edge, 5 inner corner, 7 fill.
type QuadrantTable = [(u32, u32); 8];

const BLOCK_4X6: [QuadrantTable; 4] = [
    [(0, 2), (2, 2), (0, 2), (2, 2), (0, 4), (2, 0), (0, 4), (2, 4)],
    [(3, 2), (1, 2), (3, 2), (1, 2), (3, 4), (3, 0), (3, 4), (1, 4)],
    [(0, 5), (2, 5), (0, 5), (2, 5), (0, 3), (2, 1), (0, 3), (2, 3)],
    [(3, 5), (1, 5), (3, 5), (1, 5), (3, 3), (3, 1), (3, 3), (1, 3)],
];

const BLOCK_5X3: [QuadrantTable; 4] = [
    [(0, 0), (1, 0), (0, 0), (1, 0), (0, 1), (3, 0), (0, 1), (1, 1)],
    [(2, 0), (1, 0), (2, 0), (1, 0), (2, 1), (4, 0), (2, 1), (1, 1)],
    [(0, 2), (1, 2), (0, 2), (1, 2), (0, 1), (3, 1), (0, 1), (1, 1)],
    [(2, 2), (1, 2), (2, 2), (1, 2), (2, 1), (4, 1), (2, 1), (1, 1)],
];

fn quadrant_tables(kind: AutotileKind) -> Option<&'static [QuadrantTable; 4]> {
    match kind {
        AutotileKind::None => None,
        AutotileKind::Block4x6 => Some(&BLOCK_4X6),
        AutotileKind::Block5x3 => Some(&BLOCK_5X3),
    }
}

/// Source rect of the half tile that `quadrant` uses for `mask`.
fn quadrant_source(def: &TileDef, tables: &[QuadrantTable; 4], q: usize, mask: u8) -> TileRect {
    let half = TILE_PX / 2;
    let (col, row) = tables[q][QUADRANTS[q].sub_mask(mask)];
    TileRect::new(def.rect.x + col * half, def.rect.y + row * half, half, half)
}

/// Slot of `mask` in a composite image.
pub fn mask_slot(mask: u8) -> TileRect {
    let m = u32::from(mask);
    TileRect::tile_at((m % MASK_GRID_WIDTH) * TILE_PX, (m / MASK_GRID_WIDTH) * TILE_PX)
}

/// Where a cell's pixels come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileImage {
    /// Flat colour, used for empty and unknown tiles.
    Fill([u8; 4]),
    Image { source: ImageKey, rect: TileRect },
}

#[derive(Debug, Clone)]
struct CompositeImage {
    id: CompositeId,
    filled: [u64; MASK_COUNT / 64],
}

impl CompositeImage {
    fn is_filled(&self, mask: u8) -> bool {
        self.filled[usize::from(mask) / 64] & (1u64 << (mask % 64)) != 0
    }

    fn mark_filled(&mut self, mask: u8) {
        self.filled[usize::from(mask) / 64] |= 1u64 << (mask % 64);
    }
}

/// Cache of composite autotile images, keyed by (source image, tile).
/// Owned by the session and shared by all of its terrains.
#[derive(Debug, Default)]
pub struct AutotileRegistry {
    composites: HashMap<(String, TileId), CompositeImage>,
}

impl AutotileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the image for `tile` under `mask`, composing the slot if needed.
    pub fn resolve(
        &mut self,
        tiles: &TileTable,
        tile: TileId,
        mask: u8,
        sink: &mut dyn TerrainSink,
    ) -> TileImage {
        let Some(def) = tiles.get(tile) else {
            if !tile.is_empty() {
                log::warn!("unknown tile {}, drawing neutral fill", tile.0);
            }
            return TileImage::Fill(NEUTRAL_FILL);
        };
        let Some(tables) = quadrant_tables(def.autotile) else {
            return TileImage::Image {
                source: ImageKey::Source(def.source.clone()),
                rect: def.rect,
            };
        };

        let composite = self
            .composites
            .entry((def.source.clone(), def.id))
            .or_insert_with(|| {
                let side = MASK_GRID_WIDTH * TILE_PX;
                let id = sink.create_composite_image(side, side);
                log::debug!("composite image {:?} for tile {} ({})", id, def.id.0, def.source);
                CompositeImage {
                    id,
                    filled: [0; MASK_COUNT / 64],
                }
            });

        let slot = mask_slot(mask);
        let target = ImageKey::Composite(composite.id);
        if !composite.is_filled(mask) {
            let source = ImageKey::Source(def.source.clone());
            let half = TILE_PX / 2;
            for (q, quadrant) in QUADRANTS.iter().enumerate() {
                let (qx, qy) = quadrant.offset();
                let src = quadrant_source(def, tables, q, mask);
                let dst = TileRect::new(slot.x + qx * half, slot.y + qy * half, half, half);
                sink.draw_tile_image(&target, &source, src, dst);
            }
            composite.mark_filled(mask);
        }

        TileImage::Image {
            source: target,
            rect: slot,
        }
    }

    /// Number of composite images created so far.
    pub fn composite_count(&self) -> usize {
        self.composites.len()
    }

    /// Number of mask slots composed for a tile.
    pub fn filled_slots(&self, source: &str, tile: TileId) -> u32 {
        self.composites
            .get(&(source.to_string(), tile))
            .map(|c| c.filled.iter().map(|w| w.count_ones()).sum())
            .unwrap_or(0)
    }
}
