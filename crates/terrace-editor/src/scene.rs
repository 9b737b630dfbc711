use std::rc::Rc;

use terrace_core::constants::AUTOSAVE_DELAY_MS;
use terrace_persist::MapData;
use terrace_world::clock::Clock;
use terrace_world::throttle::RebuildThrottle;
use terrace_world::TerrainWorld;

use crate::error::EditorError;
use crate::objects::ObjectStore;

/// Everything editor actions mutate: the terrains and the placed objects.
///
/// Every applied action calls [`EditorScene::mark_changed`], which arms a
/// coalesced autosave polled from [`EditorScene::update`].
pub struct EditorScene {
    pub world: TerrainWorld,
    pub objects: ObjectStore,
    autosave: RebuildThrottle,
    clock: Rc<dyn Clock>,
    revision: u64,
}

impl EditorScene {
    pub fn new(world: TerrainWorld, clock: Rc<dyn Clock>) -> Self {
        Self::with_autosave_delay(world, clock, AUTOSAVE_DELAY_MS)
    }

    pub fn with_autosave_delay(world: TerrainWorld, clock: Rc<dyn Clock>, delay_ms: u64) -> Self {
        Self {
            world,
            objects: ObjectStore::new(),
            autosave: RebuildThrottle::new(delay_ms),
            clock,
            revision: 0,
        }
    }

    /// Count of applied changes since creation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn mark_changed(&mut self) {
        self.revision += 1;
        self.autosave.arm(self.clock.now_ms());
    }

    pub fn autosave_pending(&self) -> bool {
        self.autosave.is_armed()
    }

    /// Persisted form of terrains and objects.
    pub fn snapshot(&self) -> MapData {
        MapData {
            terrains: self.world.serialize(),
            objects: self.objects.to_data(),
        }
    }

    /// Replace the scene with a saved map. On error the scene is unchanged.
    pub fn load(&mut self, map: &MapData) -> Result<(), EditorError> {
        self.world.load_map(map)?;
        self.objects.load(&map.objects);
        self.autosave.clear();
        Ok(())
    }

    /// Parse and load a JSON map. Input that does not parse, or whose
    /// terrains do not decode, loads an empty scene.
    pub fn load_json(&mut self, json: &str) {
        let map = terrace_persist::load_or_empty(json);
        if let Err(e) = self.load(&map) {
            log::warn!("map rejected ({e}), loading an empty scene");
            self.world.clear();
            self.objects.clear();
            self.autosave.clear();
        }
    }

    pub fn save_json(&self) -> Result<String, EditorError> {
        Ok(terrace_persist::save(&self.snapshot())?)
    }

    /// Drive terrain rebuilds; returns a snapshot when an autosave is due.
    pub fn update(&mut self) -> Option<MapData> {
        self.world.update();
        if self.autosave.poll(self.clock.now_ms()) {
            log::debug!("autosave at revision {}", self.revision);
            return Some(self.snapshot());
        }
        None
    }
}
