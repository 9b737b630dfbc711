pub mod action;
pub mod error;
pub mod history;
pub mod objects;
pub mod scene;

use glam::Vec3;
use terrace_core::types::{Cell, CellPatch};
use terrace_persist::{MapData, ObjectData};

use action::{
    CreateObjectAction, EditorAction, MoveObjectAction, RemoveObjectAction, SetPixelAction,
    SetTerrainPositionAction,
};
use history::{EditorHistory, HistoryEvent};
use scene::EditorScene;

pub use error::EditorError;

/// Primary public struct for the terrace-editor crate.
/// Pairs a scene with its undo history; every edit goes through an action.
pub struct Editor {
    scene: EditorScene,
    history: EditorHistory<EditorScene>,
}

impl Editor {
    pub fn new(scene: EditorScene) -> Self {
        Self {
            scene,
            history: EditorHistory::new(),
        }
    }

    pub fn scene(&self) -> &EditorScene {
        &self.scene
    }

    /// Direct access bypasses history; use it for setup, not edits.
    pub fn scene_mut(&mut self) -> &mut EditorScene {
        &mut self.scene
    }

    pub fn history(&self) -> &EditorHistory<EditorScene> {
        &self.history
    }

    /// Run an action into the open group.
    pub fn push(&mut self, action: Box<dyn EditorAction<EditorScene>>) {
        log::trace!("push {}", action.label());
        self.history.push(action, &mut self.scene);
    }

    /// Paint a cell into the open group and return its new world value.
    pub fn set_pixel(&mut self, terrain: &str, x: i32, z: i32, patch: &CellPatch) -> Result<Cell, EditorError> {
        let action = SetPixelAction::new(&mut self.scene, terrain, x, z, patch)?;
        self.push(Box::new(action));
        Ok(self.scene.world.get_pixel(terrain, x, z)?)
    }

    pub fn set_terrain_position(&mut self, terrain: &str, position: Vec3) -> Result<(), EditorError> {
        let action = SetTerrainPositionAction::new(&self.scene, terrain, position)?;
        self.push(Box::new(action));
        Ok(())
    }

    pub fn create_object(&mut self, id: &str, data: ObjectData) -> Result<(), EditorError> {
        let action = CreateObjectAction::new(&self.scene, id, data)?;
        self.push(Box::new(action));
        Ok(())
    }

    pub fn remove_object(&mut self, id: &str) -> Result<(), EditorError> {
        let action = RemoveObjectAction::new(&self.scene, id)?;
        self.push(Box::new(action));
        Ok(())
    }

    pub fn move_object(&mut self, id: &str, position: Vec3) -> Result<(), EditorError> {
        let action = MoveObjectAction::new(&self.scene, id, position)?;
        self.push(Box::new(action));
        Ok(())
    }

    /// Close the open group (e.g. at the end of a brush stroke).
    pub fn commit(&mut self) -> bool {
        self.history.commit(None, &mut self.scene)
    }

    pub fn undo(&mut self) -> bool {
        self.history.undo(&mut self.scene)
    }

    pub fn redo(&mut self) -> bool {
        self.history.redo(&mut self.scene)
    }

    pub fn discard(&mut self) -> bool {
        self.history.discard(&mut self.scene)
    }

    /// Replace the scene with a saved map and forget history.
    pub fn load(&mut self, map: &MapData) -> Result<(), EditorError> {
        self.scene.load(map)?;
        self.history.clear();
        Ok(())
    }

    /// Load a JSON map, falling back to an empty scene. History is always cleared.
    pub fn load_json(&mut self, json: &str) {
        self.scene.load_json(json);
        self.history.clear();
    }

    /// Per-frame tick: terrain rebuilds and autosave. Returns an autosave snapshot when due.
    pub fn update(&mut self) -> Option<MapData> {
        self.scene.update()
    }

    pub fn drain_history_events(&mut self) -> Vec<HistoryEvent> {
        self.history.drain_events()
    }
}
