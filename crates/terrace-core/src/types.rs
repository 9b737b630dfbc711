use std::fmt;
use std::str::FromStr;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::constants::EMPTY_TILE;
use crate::error::TerraceError;

/// Newtype for tile identifiers. 0 = no tile.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TileId(pub u16);

impl TileId {
    pub const EMPTY: TileId = TileId(EMPTY_TILE);

    pub fn is_empty(self) -> bool {
        self.0 == EMPTY_TILE
    }
}

/// Chunk coordinate in chunk-space (each unit = `chunk_units` cells).
pub type ChunkCoord = IVec2;

/// Global cell coordinate (u along x, v along z).
pub type CellCoord = IVec2;

/// One grid cell: the painted tile and the column height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cell {
    pub tile: TileId,
    pub height: i32,
}

impl Cell {
    pub fn new(tile: TileId, height: i32) -> Self {
        Self { tile, height }
    }

    /// Whether two cells join seamlessly for autotiling.
    pub fn matches(&self, other: &Cell) -> bool {
        self.tile == other.tile && self.height == other.height
    }
}

/// Height part of an edit: absolute world height or a delta from the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeightPatch {
    Absolute(i32),
    Relative(i32),
}

impl HeightPatch {
    /// Resolve against the current height. Absolute values pass through.
    pub fn resolve(self, current: i32) -> i32 {
        match self {
            HeightPatch::Absolute(h) => h,
            HeightPatch::Relative(d) => current.saturating_add(d),
        }
    }
}

impl FromStr for HeightPatch {
    type Err = TerraceError;

    /// `"+2"` and `"-1"` are relative, a bare `"4"` is absolute.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || TerraceError::InvalidHeightPatch(s.to_string());
        let digits = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);
        if digits.starts_with(['+', '-']) {
            return Err(invalid());
        }
        let value: i32 = trimmed.parse().map_err(|_| invalid())?;
        if digits.len() < trimmed.len() {
            Ok(HeightPatch::Relative(value))
        } else {
            Ok(HeightPatch::Absolute(value))
        }
    }
}

impl From<i32> for HeightPatch {
    fn from(h: i32) -> Self {
        HeightPatch::Absolute(h)
    }
}

impl fmt::Display for HeightPatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeightPatch::Absolute(h) => write!(f, "{h}"),
            HeightPatch::Relative(d) => write!(f, "{d:+}"),
        }
    }
}

/// A partial cell edit. Missing fields keep their current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellPatch {
    pub tile: Option<TileId>,
    pub height: Option<HeightPatch>,
}

impl CellPatch {
    pub fn tile(tile: TileId) -> Self {
        Self {
            tile: Some(tile),
            height: None,
        }
    }

    pub fn height(height: impl Into<HeightPatch>) -> Self {
        Self {
            tile: None,
            height: Some(height.into()),
        }
    }

    pub fn with_tile(mut self, tile: TileId) -> Self {
        self.tile = Some(tile);
        self
    }

    pub fn with_height(mut self, height: impl Into<HeightPatch>) -> Self {
        self.height = Some(height.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tile.is_none() && self.height.is_none()
    }
}

/// String key used for chunks in persisted maps: `"i,j"`.
pub fn chunk_key(coord: ChunkCoord) -> String {
    format!("{},{}", coord.x, coord.y)
}

/// Parse a `"i,j"` chunk key.
pub fn parse_chunk_key(key: &str) -> Result<ChunkCoord, TerraceError> {
    let invalid = || TerraceError::InvalidChunkKey(key.to_string());
    let (i, j) = key.split_once(',').ok_or_else(invalid)?;
    let i = i.trim().parse().map_err(|_| invalid())?;
    let j = j.trim().parse().map_err(|_| invalid())?;
    Ok(IVec2::new(i, j))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_height_patch_parse() {
        assert_eq!("+1".parse::<HeightPatch>().ok(), Some(HeightPatch::Relative(1)));
        assert_eq!("-3".parse::<HeightPatch>().ok(), Some(HeightPatch::Relative(-3)));
        assert_eq!("7".parse::<HeightPatch>().ok(), Some(HeightPatch::Absolute(7)));
        assert!("up".parse::<HeightPatch>().is_err());
        assert!("+".parse::<HeightPatch>().is_err());
        for doubled in ["--3", "++3", "+-3", "-+3"] {
            assert!(doubled.parse::<HeightPatch>().is_err(), "{doubled}");
        }
        assert_eq!(
            "-2147483648".parse::<HeightPatch>().ok(),
            Some(HeightPatch::Relative(i32::MIN))
        );
    }

    #[test]
    fn test_height_patch_resolve() {
        assert_eq!(HeightPatch::Relative(2).resolve(3), 5);
        assert_eq!(HeightPatch::Relative(-5).resolve(3), -2);
        assert_eq!(HeightPatch::Absolute(9).resolve(3), 9);
    }

    #[test]
    fn test_height_patch_display_roundtrip() {
        for patch in [
            HeightPatch::Relative(4),
            HeightPatch::Relative(-2),
            HeightPatch::Absolute(6),
        ] {
            let parsed: HeightPatch = patch.to_string().parse().expect("parse back");
            assert_eq!(parsed, patch);
        }
    }

    #[test]
    fn test_cell_matches_requires_tile_and_height() {
        let a = Cell::new(TileId(3), 1);
        assert!(a.matches(&Cell::new(TileId(3), 1)));
        assert!(!a.matches(&Cell::new(TileId(3), 2)));
        assert!(!a.matches(&Cell::new(TileId(4), 1)));
    }

    #[test]
    fn test_chunk_key_roundtrip() {
        let coord = IVec2::new(-3, 12);
        assert_eq!(chunk_key(coord), "-3,12");
        assert_eq!(parse_chunk_key("-3,12").expect("valid key"), coord);
        assert!(parse_chunk_key("3;4").is_err());
        assert!(parse_chunk_key("a,4").is_err());
    }
}
