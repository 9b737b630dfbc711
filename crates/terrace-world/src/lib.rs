pub mod autotile;
pub mod chunk;
pub mod chunk_map;
pub mod clock;
pub mod config;
pub mod dirty;
pub mod error;
pub mod events;
pub mod loader;
pub mod merge;
pub mod mesh;
pub mod sink;
pub mod terrain;
pub mod throttle;

use std::collections::BTreeMap;
use std::rc::Rc;

use autotile::AutotileRegistry;
use clock::Clock;
use config::TerrainConfig;
use events::TerrainEvent;
use glam::Vec3;
use sink::TerrainSink;
use terrace_core::tile::TileTable;
use terrace_core::types::{Cell, CellPatch};
use terrace_core::TerraceError;
use terrace_persist::{MapData, TerrainData};
use terrain::Terrain;

pub use error::WorldError;

/// Primary public struct for the terrace-world crate.
/// Owns every terrain of an editing session together with the shared tile
/// table, autotile cache, clock and backend sink.
pub struct TerrainWorld {
    terrains: BTreeMap<String, Terrain>,
    tiles: Rc<TileTable>,
    registry: AutotileRegistry,
    sink: Box<dyn TerrainSink>,
    clock: Rc<dyn Clock>,
}

impl TerrainWorld {
    pub fn new(tiles: TileTable, sink: Box<dyn TerrainSink>, clock: Rc<dyn Clock>) -> Self {
        Self {
            terrains: BTreeMap::new(),
            tiles: Rc::new(tiles),
            registry: AutotileRegistry::new(),
            sink,
            clock,
        }
    }

    pub fn tiles(&self) -> &TileTable {
        &self.tiles
    }

    pub fn registry(&self) -> &AutotileRegistry {
        &self.registry
    }

    /// Create an empty terrain.
    pub fn add_terrain(
        &mut self,
        id: &str,
        config: TerrainConfig,
        position: Vec3,
    ) -> Result<&mut Terrain, WorldError> {
        if self.terrains.contains_key(id) {
            return Err(WorldError::DuplicateTerrain(id.to_string()));
        }
        let terrain = Terrain::new(id, config, position, self.tiles.clone(), self.clock.clone())?;
        log::info!("terrain {id} added ({} cells per chunk side)", config.chunk_units());
        Ok(self.terrains.entry(id.to_string()).or_insert(terrain))
    }

    /// Restore a persisted terrain, replacing any terrain with the same id,
    /// and build it immediately.
    pub fn insert_terrain_data(&mut self, id: &str, data: &TerrainData) -> Result<(), WorldError> {
        let terrain = Terrain::from_data(id, data, self.tiles.clone(), self.clock.clone())?;
        self.install(id.to_string(), terrain);
        Ok(())
    }

    fn install(&mut self, id: String, mut terrain: Terrain) {
        if let Some(mut old) = self.terrains.remove(&id) {
            old.dispose(self.sink.as_mut());
        }
        terrain.flush(self.sink.as_mut(), &mut self.registry);
        self.terrains.insert(id, terrain);
    }

    /// Replace all terrains with those of `map`. Objects are not the world's concern.
    ///
    /// Every terrain is decoded before anything is replaced; on error the
    /// current terrains are left untouched.
    pub fn load_map(&mut self, map: &MapData) -> Result<(), WorldError> {
        let mut decoded = Vec::with_capacity(map.terrains.len());
        for (id, data) in &map.terrains {
            let terrain = Terrain::from_data(id, data, self.tiles.clone(), self.clock.clone())?;
            decoded.push((id.clone(), terrain));
        }
        self.clear();
        for (id, terrain) in decoded {
            self.install(id, terrain);
        }
        log::info!("loaded {} terrains", map.terrains.len());
        Ok(())
    }

    pub fn terrain(&self, id: &str) -> Option<&Terrain> {
        self.terrains.get(id)
    }

    pub fn terrain_mut(&mut self, id: &str) -> Option<&mut Terrain> {
        self.terrains.get_mut(id)
    }

    pub fn terrain_ids(&self) -> impl Iterator<Item = &str> {
        self.terrains.keys().map(String::as_str)
    }

    fn require(&mut self, id: &str) -> Result<&mut Terrain, WorldError> {
        self.terrains
            .get_mut(id)
            .ok_or_else(|| TerraceError::UnknownTerrain(id.to_string()).into())
    }

    /// Dispose and drop a terrain. Returns false if it did not exist.
    pub fn remove_terrain(&mut self, id: &str) -> bool {
        match self.terrains.remove(id) {
            Some(mut terrain) => {
                terrain.dispose(self.sink.as_mut());
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        let ids: Vec<String> = self.terrains.keys().cloned().collect();
        for id in ids {
            self.remove_terrain(&id);
        }
    }

    pub fn set_pixel(&mut self, id: &str, x: i32, z: i32, patch: &CellPatch) -> Result<Cell, WorldError> {
        Ok(self.require(id)?.set_pixel(x, z, patch))
    }

    pub fn get_pixel(&mut self, id: &str, x: i32, z: i32) -> Result<Cell, WorldError> {
        Ok(self.require(id)?.get_pixel(x, z))
    }

    /// Move a terrain and return its previous position.
    pub fn set_position(&mut self, id: &str, position: Vec3) -> Result<Vec3, WorldError> {
        let terrain = self
            .terrains
            .get_mut(id)
            .ok_or_else(|| TerraceError::UnknownTerrain(id.to_string()))?;
        let old = terrain.position();
        terrain.set_position(position, self.sink.as_mut());
        Ok(old)
    }

    pub fn set_visible(&mut self, id: &str, visible: bool) -> Result<(), WorldError> {
        let terrain = self
            .terrains
            .get_mut(id)
            .ok_or_else(|| TerraceError::UnknownTerrain(id.to_string()))?;
        terrain.set_visible(visible, self.sink.as_mut());
        Ok(())
    }

    pub fn set_opacity(&mut self, id: &str, opacity: f32) -> Result<(), WorldError> {
        let terrain = self
            .terrains
            .get_mut(id)
            .ok_or_else(|| TerraceError::UnknownTerrain(id.to_string()))?;
        terrain.set_opacity(opacity, self.sink.as_mut());
        Ok(())
    }

    /// Run every terrain's rebuild whose window has elapsed.
    /// Called once per frame. Returns the number of terrains rebuilt.
    pub fn update(&mut self) -> usize {
        let mut rebuilt = 0;
        for terrain in self.terrains.values_mut() {
            if terrain.update(self.sink.as_mut(), &mut self.registry) {
                rebuilt += 1;
            }
        }
        rebuilt
    }

    /// Rebuild every terrain now.
    pub fn flush(&mut self) {
        for terrain in self.terrains.values_mut() {
            terrain.flush(self.sink.as_mut(), &mut self.registry);
        }
    }

    /// Take the queued events of all terrains, in terrain id order.
    pub fn drain_events(&mut self) -> Vec<TerrainEvent> {
        self.terrains
            .values_mut()
            .flat_map(|t| t.drain_events())
            .collect()
    }

    /// Persisted form of all terrains.
    pub fn serialize(&self) -> BTreeMap<String, TerrainData> {
        self.terrains
            .iter()
            .map(|(id, t)| (id.clone(), t.serialize()))
            .collect()
    }

    /// Get counts for debug display: (terrains, loaded chunks, pending rebuilds)
    pub fn counts(&self) -> (usize, u32, usize) {
        let chunks = self.terrains.values().map(|t| t.chunks().loaded_count()).sum();
        let pending = self
            .terrains
            .values()
            .filter(|t| t.is_rebuild_scheduled())
            .count();
        (self.terrains.len(), chunks, pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::sink::{RecordingSink, SinkOp};
    use glam::IVec2;
    use terrace_core::tile::TileDef;
    use terrace_core::constants::REBUILD_DELAY_MS;
    use terrace_core::TileId;

    fn world() -> (TerrainWorld, Rc<ManualClock>, RecordingSink) {
        let clock = Rc::new(ManualClock::new(0));
        let sink = RecordingSink::new();
        let tiles = TileTable::new(vec![TileDef::plain(1, "terrain.png", 0, 0)]);
        let world = TerrainWorld::new(tiles, Box::new(sink.clone()), clock.clone());
        (world, clock, sink)
    }

    #[test]
    fn test_unknown_terrain_errors() {
        let (mut world, _, _) = world();
        let err = world
            .set_pixel("missing", 0, 0, &CellPatch::tile(TileId(1)))
            .expect_err("no such terrain");
        assert!(matches!(err, WorldError::Core(TerraceError::UnknownTerrain(_))));
    }

    #[test]
    fn test_duplicate_terrain_rejected() {
        let (mut world, _, _) = world();
        world
            .add_terrain("a", TerrainConfig::default(), Vec3::ZERO)
            .expect("first add");
        assert!(matches!(
            world.add_terrain("a", TerrainConfig::default(), Vec3::ZERO),
            Err(WorldError::DuplicateTerrain(_))
        ));
    }

    #[test]
    fn test_one_notification_pair_per_terrain() {
        let (mut world, clock, _) = world();
        for id in ["a", "b"] {
            world
                .add_terrain(id, TerrainConfig::new(1.0, 8.0), Vec3::ZERO)
                .expect("add");
        }
        for k in 0..20 {
            let id = if k % 2 == 0 { "a" } else { "b" };
            world
                .set_pixel(id, k, 1, &CellPatch::height(k % 3 + 1))
                .expect("known terrain");
        }
        world.drain_events();
        clock.advance(REBUILD_DELAY_MS);
        assert_eq!(world.update(), 2);

        let events = world.drain_events();
        for id in ["a", "b"] {
            let tiles = events
                .iter()
                .filter(|e| e.terrain() == id && matches!(e, TerrainEvent::TileUpdated { .. }))
                .count();
            let heights = events
                .iter()
                .filter(|e| e.terrain() == id && matches!(e, TerrainEvent::HeightUpdated { .. }))
                .count();
            assert_eq!((tiles, heights), (1, 1), "terrain {id}");
        }
    }

    #[test]
    fn test_load_map_builds_immediately() {
        let (mut world, _, sink) = world();
        world
            .add_terrain("a", TerrainConfig::new(1.0, 4.0), Vec3::ZERO)
            .expect("add");
        world
            .set_pixel("a", 1, 1, &CellPatch::tile(TileId(1)).with_height(2))
            .expect("set");
        let map = MapData {
            terrains: world.serialize(),
            ..MapData::default()
        };

        let (mut other, _, other_sink) = self::world();
        other.load_map(&map).expect("load");
        assert!(other_sink.count(|op| matches!(op, SinkOp::Mesh { .. })) > 0);
        assert_eq!(
            other.get_pixel("a", 1, 1).expect("terrain a"),
            Cell::new(TileId(1), 2)
        );
        assert_eq!(other.counts(), (1, 1, 0));
        assert!(sink.ops().is_empty());
    }

    #[test]
    fn test_load_map_replaces_terrains() {
        let (mut world, _, sink) = world();
        world
            .add_terrain("old", TerrainConfig::new(1.0, 4.0), Vec3::ZERO)
            .expect("add");
        world.get_pixel("old", 0, 0).expect("known");
        world.flush();
        world.load_map(&MapData::default()).expect("load");
        assert!(world.terrain("old").is_none());
        assert_eq!(sink.live_colliders(), 0);
    }

    #[test]
    fn test_load_map_bad_terrain_keeps_current() {
        let (mut world, _, _) = world();
        world
            .add_terrain("old", TerrainConfig::new(1.0, 4.0), Vec3::ZERO)
            .expect("add");
        world
            .set_pixel("old", 0, 0, &CellPatch::height(3))
            .expect("set");

        let (mut source, _, _) = self::world();
        source
            .add_terrain("a", TerrainConfig::new(1.0, 4.0), Vec3::ZERO)
            .expect("add");
        let mut terrains = source.serialize();
        let mut broken = terrains["a"].clone();
        broken.unit = 0.0;
        terrains.insert("b".into(), broken);
        let map = MapData {
            terrains,
            ..MapData::default()
        };

        assert!(world.load_map(&map).is_err());
        assert_eq!(world.terrain_ids().collect::<Vec<_>>(), vec!["old"]);
        assert_eq!(world.get_pixel("old", 0, 0).expect("old").height, 3);
    }

    #[test]
    fn test_set_position_returns_previous() {
        let (mut world, _, _) = world();
        world
            .add_terrain("a", TerrainConfig::default(), Vec3::new(1.0, 0.0, 0.0))
            .expect("add");
        let old = world.set_position("a", Vec3::new(5.0, 0.0, 0.0)).expect("known");
        assert_eq!(old, Vec3::new(1.0, 0.0, 0.0));
        let cell = world.terrain("a").expect("a").cell_at(5.5, 0.5);
        assert_eq!(cell, IVec2::new(0, 0));
    }
}
