use std::collections::HashSet;

use terrace_core::tile::{TileDef, TileTable};
use terrace_core::types::TileId;
use thiserror::Error;

use crate::config::TerrainConfig;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to parse tiles RON: {0}")]
    TileParseError(String),
    #[error("Failed to parse terrain config RON: {0}")]
    ConfigParseError(String),
    #[error("Tile table has {} invalid definitions", .0.len())]
    InvalidTiles(Vec<TileValidationError>),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TileValidationError {
    #[error("Duplicate tile ID {0}")]
    DuplicateTileId(u16),
    #[error("Tile '{0}' uses reserved ID 0")]
    ReservedTileId(String),
    #[error("Tile '{name}' references unknown edge tile {edge}")]
    UnknownEdgeTile { name: String, edge: u16 },
}

/// Parse a single tiles RON string into a TileTable.
pub fn load_tiles_from_str(ron_str: &str) -> Result<TileTable, LoadError> {
    let options = ron::Options::default();
    let tiles: Vec<TileDef> = options
        .from_str(ron_str)
        .map_err(|e| LoadError::TileParseError(e.to_string()))?;
    Ok(TileTable::new(tiles))
}

/// Load and merge multiple tile sources into a single validated TileTable.
pub fn load_all_tiles(sources: &[&str]) -> Result<TileTable, LoadError> {
    let mut all_tiles = Vec::new();
    for source in sources {
        let table = load_tiles_from_str(source)?;
        all_tiles.extend(table.tiles);
    }
    let table = TileTable::new(all_tiles);
    if let Err(errors) = validate_tiles(&table) {
        for error in &errors {
            log::warn!("tile table: {error}");
        }
        return Err(LoadError::InvalidTiles(errors));
    }
    log::info!("loaded {} tile definitions", table.len());
    Ok(table)
}

/// Parse a terrain config from a RON string and validate it.
pub fn load_config_from_str(ron_str: &str) -> Result<TerrainConfig, LoadError> {
    let options = ron::Options::default();
    let config: TerrainConfig = options
        .from_str(ron_str)
        .map_err(|e| LoadError::ConfigParseError(e.to_string()))?;
    config
        .validate()
        .map_err(|e| LoadError::ConfigParseError(e.to_string()))?;
    Ok(config)
}

/// Check a tile table for ID clashes and dangling edge-tile references.
pub fn validate_tiles(table: &TileTable) -> Result<(), Vec<TileValidationError>> {
    let mut errors = Vec::new();

    let mut seen_ids = HashSet::new();
    for tile in &table.tiles {
        if tile.id.is_empty() {
            errors.push(TileValidationError::ReservedTileId(tile.name.clone()));
        } else if !seen_ids.insert(tile.id) {
            errors.push(TileValidationError::DuplicateTileId(tile.id.0));
        }
    }

    for tile in &table.tiles {
        if let Some(edge) = tile.edge_tile {
            if edge != TileId::EMPTY && !seen_ids.contains(&edge) {
                errors.push(TileValidationError::UnknownEdgeTile {
                    name: tile.name.clone(),
                    edge: edge.0,
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terrace_core::tile::AutotileKind;

    const TERRAIN_RON: &str = include_str!("../../../data/tiles/terrain.ron");

    #[test]
    fn test_load_bundled_tiles() {
        let table = load_tiles_from_str(TERRAIN_RON).expect("bundled tiles should parse");
        assert_eq!(table.len(), 5);
        assert_eq!(table.kind_of(TileId(3)), AutotileKind::Block4x6);
        assert_eq!(table.kind_of(TileId(5)), AutotileKind::Block5x3);
        assert_eq!(table.edge_tile(TileId(3)), TileId(1));
        assert_eq!(table.edge_tile(TileId(5)), TileId(5));
        validate_tiles(&table).expect("bundled tiles should validate");
    }

    #[test]
    fn test_load_all_tiles_merges() {
        let extra = r#"[(id: 9, name: "lava", source: "extra.png", rect: (x: 0, y: 0, w: 32, h: 32))]"#;
        let table = load_all_tiles(&[TERRAIN_RON, extra]).expect("sources should parse");
        assert_eq!(table.len(), 6);
        assert_eq!(table.max_id(), TileId(9));
    }

    #[test]
    fn test_load_all_tiles_rejects_clashing_sources() {
        let clash = r#"[(id: 3, name: "moss", source: "extra.png", rect: (x: 0, y: 0, w: 32, h: 32))]"#;
        let err = load_all_tiles(&[TERRAIN_RON, clash]).expect_err("duplicate id");
        match err {
            LoadError::InvalidTiles(errors) => {
                assert_eq!(errors, vec![TileValidationError::DuplicateTileId(3)]);
            }
            other => panic!("unexpected error: {other}"),
        }

        let reserved = r#"[(id: 0, name: "void", source: "extra.png", rect: (x: 0, y: 0, w: 32, h: 32))]"#;
        assert!(matches!(
            load_all_tiles(&[reserved]),
            Err(LoadError::InvalidTiles(_))
        ));
    }

    #[test]
    fn test_parse_error_reported() {
        let err = load_tiles_from_str("[(id: )]").expect_err("malformed RON");
        assert!(matches!(err, LoadError::TileParseError(_)));
    }

    #[test]
    fn test_validate_duplicates_and_edges() {
        let mut a = TileDef::plain(1, "t.png", 0, 0);
        a.edge_tile = Some(TileId(40));
        let b = TileDef::plain(1, "t.png", 32, 0);
        let c = TileDef::plain(0, "t.png", 64, 0);
        let errors = validate_tiles(&TileTable::new(vec![a.clone(), b, c])).expect_err("invalid table");
        assert_eq!(
            errors,
            vec![
                TileValidationError::DuplicateTileId(1),
                TileValidationError::ReservedTileId("tile-0".into()),
                TileValidationError::UnknownEdgeTile {
                    name: a.name,
                    edge: 40
                },
            ]
        );
    }

    #[test]
    fn test_load_config() {
        let config = load_config_from_str("(unit_size: 0.5, chunk_size: 8.0)").expect("valid config");
        assert_eq!(config.chunk_units(), 16);
        assert!(load_config_from_str("(unit_size: -1.0)").is_err());
    }
}
