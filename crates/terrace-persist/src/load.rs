use crate::error::PersistError;
use crate::format::MapData;

/// Parse a saved map from JSON.
pub fn load(json: &str) -> Result<MapData, PersistError> {
    let map: MapData = serde_json::from_str(json)?;
    log::info!(
        "Loaded map: {} terrains, {} objects",
        map.terrains.len(),
        map.objects.len()
    );
    Ok(map)
}

/// Parse a saved map, falling back to an empty map on any error.
pub fn load_or_empty(json: &str) -> MapData {
    match load(json) {
        Ok(map) => map,
        Err(e) => {
            log::warn!("Failed to parse map ({e}), starting from an empty map");
            MapData::default()
        }
    }
}
