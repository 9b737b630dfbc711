use crate::error::PersistError;
use crate::format::MapData;

/// Serialize a map to compact JSON.
pub fn save(map: &MapData) -> Result<String, PersistError> {
    Ok(serde_json::to_string(map)?)
}

/// Serialize a map to indented JSON for hand inspection.
pub fn save_pretty(map: &MapData) -> Result<String, PersistError> {
    Ok(serde_json::to_string_pretty(map)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{ChunkData, ObjectData, TerrainData};
    use crate::load::load;
    use std::collections::BTreeMap;
    use terrace_core::TileId;

    #[test]
    fn test_save_load_roundtrip() {
        let mut chunks = BTreeMap::new();
        chunks.insert(
            "-1,0".to_string(),
            ChunkData::encode(&[TileId(2); 4], &[1, 1, 0, 0]),
        );
        let mut map = MapData::default();
        map.terrains.insert(
            "ground".into(),
            TerrainData {
                unit: 1.0,
                size: 2.0,
                x: 0.0,
                y: 4.0,
                z: -2.0,
                chunks,
            },
        );
        map.objects.insert(
            "spawn".into(),
            ObjectData {
                x: 0.5,
                y: 1.0,
                z: 0.5,
                cls_id: "spawn-point".into(),
                args: serde_json::Value::Null,
                terrain_id: None,
            },
        );

        let json = save(&map).expect("save");
        assert_eq!(load(&json).expect("load"), map);
        let pretty = save_pretty(&map).expect("save pretty");
        assert_eq!(load(&pretty).expect("load pretty"), map);
    }
}
