use serde::{Deserialize, Serialize};

use crate::constants::TILE_PX;
use crate::types::TileId;

/// Source layout of a tile definition, selecting how cells pick sub-images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AutotileKind {
    /// Plain tile: every cell draws the same source rect.
    #[default]
    None,
    /// 2x3 tile block (4x6 half-tiles): preview, inner corners, 2x2 room.
    Block4x6,
    /// 5x3 half-tile block: nine-slice plus inner corners.
    Block5x3,
}

/// Pixel rectangle inside an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TileRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl TileRect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// A full tile whose top-left corner sits at pixel (x, y).
    pub fn tile_at(x: u32, y: u32) -> Self {
        Self::new(x, y, TILE_PX, TILE_PX)
    }
}

/// A single tile definition loaded from RON data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileDef {
    /// Stable tile ID. 0 = no tile.
    pub id: TileId,
    /// Human-readable name for debug display.
    pub name: String,
    /// Name of the source image the rect refers to.
    pub source: String,
    /// Top-left of the tile (or of its autotile block) in the source image.
    /// Width and height cover one tile for plain tiles.
    pub rect: TileRect,
    #[serde(default)]
    pub autotile: AutotileKind,
    /// Tile drawn on vertical walls below this tile. Defaults to the tile itself.
    #[serde(default)]
    pub edge_tile: Option<TileId>,
}

impl TileDef {
    pub fn plain(id: u16, source: &str, x: u32, y: u32) -> Self {
        Self {
            id: TileId(id),
            name: format!("tile-{id}"),
            source: source.to_string(),
            rect: TileRect::tile_at(x, y),
            autotile: AutotileKind::None,
            edge_tile: None,
        }
    }

    pub fn autotile(id: u16, source: &str, x: u32, y: u32, kind: AutotileKind) -> Self {
        Self {
            autotile: kind,
            ..Self::plain(id, source, x, y)
        }
    }
}

/// Collection of tile definitions indexed by ID.
#[derive(Debug, Clone, Default)]
pub struct TileTable {
    pub tiles: Vec<TileDef>,
}

impl TileTable {
    pub fn new(tiles: Vec<TileDef>) -> Self {
        Self { tiles }
    }

    /// Look up a tile by ID. Returns None for tile 0 and unknown IDs.
    pub fn get(&self, id: TileId) -> Option<&TileDef> {
        if id.is_empty() {
            return None;
        }
        self.tiles.iter().find(|t| t.id == id)
    }

    /// Autotile kind of a tile; unknown tiles count as plain.
    pub fn kind_of(&self, id: TileId) -> AutotileKind {
        self.get(id).map(|t| t.autotile).unwrap_or_default()
    }

    /// Tile used for the side walls under `id`.
    pub fn edge_tile(&self, id: TileId) -> TileId {
        self.get(id).and_then(|t| t.edge_tile).unwrap_or(id)
    }

    /// Get the maximum tile ID in the table.
    pub fn max_id(&self) -> TileId {
        self.tiles.iter().map(|t| t.id).max().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}
