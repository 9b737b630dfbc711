//! Persisted map schema. JSON-compatible, field names match the editor's
//! map files: `{ terrains: { id: {...} }, objects: { id: {...} } }`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use terrace_core::TileId;

use crate::error::PersistError;
use crate::rle::{self, Rle};

/// A whole saved map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapData {
    #[serde(default)]
    pub terrains: BTreeMap<String, TerrainData>,
    #[serde(default)]
    pub objects: BTreeMap<String, ObjectData>,
}

impl MapData {
    pub fn is_empty(&self) -> bool {
        self.terrains.is_empty() && self.objects.is_empty()
    }
}

/// One terrain: grid geometry, origin and RLE chunk layers keyed by `"i,j"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainData {
    pub unit: f32,
    pub size: f32,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub z: f32,
    #[serde(default)]
    pub chunks: BTreeMap<String, ChunkData>,
}

/// Tile and height layers of one chunk, each run-length encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkData {
    pub tiles: Rle,
    pub heights: Rle,
}

impl ChunkData {
    pub fn encode(tiles: &[TileId], heights: &[i32]) -> Self {
        let tiles: Vec<i32> = tiles.iter().map(|t| t.0 as i32).collect();
        Self {
            tiles: rle::compress(&tiles),
            heights: rle::compress(heights),
        }
    }

    /// Expand both layers, checking each holds `expected` cells.
    pub fn decode(
        &self,
        key: &str,
        expected: usize,
    ) -> Result<(Vec<TileId>, Vec<i32>), PersistError> {
        let raw_tiles = rle::extract(&self.tiles);
        let heights = rle::extract(&self.heights);
        for (layer, actual) in [("tiles", raw_tiles.len()), ("heights", heights.len())] {
            if actual != expected {
                return Err(PersistError::ChunkLength {
                    key: key.to_string(),
                    layer,
                    expected,
                    actual,
                });
            }
        }
        let tiles = raw_tiles
            .into_iter()
            .map(|t| {
                u16::try_from(t)
                    .map(TileId)
                    .map_err(|_| PersistError::TileOutOfRange(t))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok((tiles, heights))
    }
}

/// A placed world object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectData {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub cls_id: String,
    #[serde(default)]
    pub args: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terrain_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_data_encode_decode() {
        let tiles = vec![TileId(1), TileId(1), TileId(2), TileId(0)];
        let heights = vec![0, 0, 3, 3];
        let data = ChunkData::encode(&tiles, &heights);
        let (t, h) = data.decode("0,0", 4).expect("decode");
        assert_eq!(t, tiles);
        assert_eq!(h, heights);
    }

    #[test]
    fn test_chunk_data_length_mismatch() {
        let data = ChunkData::encode(&[TileId(1); 3], &[0; 4]);
        let err = data.decode("1,2", 4).expect_err("tiles too short");
        assert!(matches!(
            err,
            PersistError::ChunkLength {
                layer: "tiles",
                expected: 4,
                actual: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_chunk_data_rejects_negative_tile() {
        let data = ChunkData {
            tiles: rle::compress(&[-1]),
            heights: rle::compress(&[0]),
        };
        assert!(matches!(
            data.decode("0,0", 1),
            Err(PersistError::TileOutOfRange(-1))
        ));
    }

    #[test]
    fn test_object_data_camel_case() {
        let obj = ObjectData {
            x: 1.0,
            y: 2.0,
            z: 3.0,
            cls_id: "tree".into(),
            args: serde_json::json!({ "size": 2 }),
            terrain_id: Some("ground".into()),
        };
        let json = serde_json::to_value(&obj).expect("serialize");
        assert_eq!(json["clsId"], "tree");
        assert_eq!(json["terrainId"], "ground");
        assert_eq!(json["args"]["size"], 2);
    }
}
