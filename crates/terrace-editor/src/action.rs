//! Reversible edits.
//!
//! Every action snapshots both the new and the old state by value when it is
//! built, so replaying it never depends on what happened in between. Applying
//! an action twice, or reverting it twice, leaves the scene as after once.

use glam::Vec3;
use terrace_core::types::{Cell, CellPatch, HeightPatch};
use terrace_core::TerraceError;
use terrace_persist::ObjectData;
use terrace_world::WorldError;

use crate::error::EditorError;
use crate::scene::EditorScene;

pub trait EditorAction<Ctx> {
    fn exec(&self, ctx: &mut Ctx);

    fn revert(&self, ctx: &mut Ctx);

    /// Short name for logs and history listings.
    fn label(&self) -> &'static str {
        "action"
    }
}

/// Paint one terrain cell.
#[derive(Debug, Clone, PartialEq)]
pub struct SetPixelAction {
    pub terrain: String,
    pub x: i32,
    pub z: i32,
    /// Absolute patch; relative heights are resolved at construction.
    pub new: CellPatch,
    pub old: Cell,
}

impl SetPixelAction {
    /// Snapshot the current cell and resolve `patch` against it.
    pub fn new(
        scene: &mut EditorScene,
        terrain: &str,
        x: i32,
        z: i32,
        patch: &CellPatch,
    ) -> Result<Self, EditorError> {
        let old = scene.world.get_pixel(terrain, x, z)?;
        let new = CellPatch {
            tile: patch.tile,
            height: patch
                .height
                .map(|h| HeightPatch::Absolute(h.resolve(old.height))),
        };
        Ok(Self {
            terrain: terrain.to_string(),
            x,
            z,
            new,
            old,
        })
    }

    fn apply(&self, scene: &mut EditorScene, patch: &CellPatch) {
        match scene.world.set_pixel(&self.terrain, self.x, self.z, patch) {
            Ok(_) => scene.mark_changed(),
            Err(e) => log::warn!("set pixel ({}, {}) skipped: {e}", self.x, self.z),
        }
    }
}

impl EditorAction<EditorScene> for SetPixelAction {
    fn exec(&self, scene: &mut EditorScene) {
        self.apply(scene, &self.new);
    }

    fn revert(&self, scene: &mut EditorScene) {
        let old = CellPatch::tile(self.old.tile).with_height(HeightPatch::Absolute(self.old.height));
        self.apply(scene, &old);
    }

    fn label(&self) -> &'static str {
        "set-pixel"
    }
}

/// Move a whole terrain.
#[derive(Debug, Clone, PartialEq)]
pub struct SetTerrainPositionAction {
    pub terrain: String,
    pub new: Vec3,
    pub old: Vec3,
}

impl SetTerrainPositionAction {
    pub fn new(scene: &EditorScene, terrain: &str, position: Vec3) -> Result<Self, EditorError> {
        let old = scene
            .world
            .terrain(terrain)
            .map(|t| t.position())
            .ok_or_else(|| WorldError::from(TerraceError::UnknownTerrain(terrain.to_string())))?;
        Ok(Self {
            terrain: terrain.to_string(),
            new: position,
            old,
        })
    }

    fn apply(&self, scene: &mut EditorScene, position: Vec3) {
        match scene.world.set_position(&self.terrain, position) {
            Ok(_) => scene.mark_changed(),
            Err(e) => log::warn!("terrain move skipped: {e}"),
        }
    }
}

impl EditorAction<EditorScene> for SetTerrainPositionAction {
    fn exec(&self, scene: &mut EditorScene) {
        self.apply(scene, self.new);
    }

    fn revert(&self, scene: &mut EditorScene) {
        self.apply(scene, self.old);
    }

    fn label(&self) -> &'static str {
        "move-terrain"
    }
}

fn place(scene: &mut EditorScene, id: &str, data: &ObjectData) {
    if scene.objects.create(id, data) {
        scene.mark_changed();
    }
}

fn unplace(scene: &mut EditorScene, id: &str) {
    if scene.objects.remove(id).is_some() {
        scene.mark_changed();
    }
}

/// Place a new object.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateObjectAction {
    pub id: String,
    pub data: ObjectData,
}

impl CreateObjectAction {
    pub fn new(scene: &EditorScene, id: &str, data: ObjectData) -> Result<Self, EditorError> {
        if scene.objects.contains(id) {
            return Err(EditorError::DuplicateObject(id.to_string()));
        }
        Ok(Self {
            id: id.to_string(),
            data,
        })
    }
}

impl EditorAction<EditorScene> for CreateObjectAction {
    fn exec(&self, scene: &mut EditorScene) {
        place(scene, &self.id, &self.data);
    }

    fn revert(&self, scene: &mut EditorScene) {
        unplace(scene, &self.id);
    }

    fn label(&self) -> &'static str {
        "create-object"
    }
}

/// Delete an object, keeping a snapshot to restore it.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoveObjectAction {
    pub id: String,
    pub data: ObjectData,
}

impl RemoveObjectAction {
    pub fn new(scene: &EditorScene, id: &str) -> Result<Self, EditorError> {
        let object = scene
            .objects
            .get(id)
            .ok_or_else(|| EditorError::UnknownObject(id.to_string()))?;
        Ok(Self {
            id: id.to_string(),
            data: object.to_data(),
        })
    }
}

impl EditorAction<EditorScene> for RemoveObjectAction {
    fn exec(&self, scene: &mut EditorScene) {
        unplace(scene, &self.id);
    }

    fn revert(&self, scene: &mut EditorScene) {
        place(scene, &self.id, &self.data);
    }

    fn label(&self) -> &'static str {
        "remove-object"
    }
}

/// Move an object.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveObjectAction {
    pub id: String,
    pub new: Vec3,
    pub old: Vec3,
}

impl MoveObjectAction {
    pub fn new(scene: &EditorScene, id: &str, position: Vec3) -> Result<Self, EditorError> {
        let object = scene
            .objects
            .get(id)
            .ok_or_else(|| EditorError::UnknownObject(id.to_string()))?;
        Ok(Self {
            id: id.to_string(),
            new: position,
            old: object.position,
        })
    }

    fn apply(&self, scene: &mut EditorScene, position: Vec3) {
        if scene.objects.move_to(&self.id, position).is_some() {
            scene.mark_changed();
        } else {
            log::warn!("move of missing object {} skipped", self.id);
        }
    }
}

impl EditorAction<EditorScene> for MoveObjectAction {
    fn exec(&self, scene: &mut EditorScene) {
        self.apply(scene, self.new);
    }

    fn revert(&self, scene: &mut EditorScene) {
        self.apply(scene, self.old);
    }

    fn label(&self) -> &'static str {
        "move-object"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;
    use terrace_core::tile::TileTable;
    use terrace_core::TileId;
    use terrace_world::clock::ManualClock;
    use terrace_world::config::TerrainConfig;
    use terrace_world::sink::NullSink;
    use terrace_world::TerrainWorld;

    fn scene() -> EditorScene {
        let clock = Rc::new(ManualClock::new(0));
        let mut world = TerrainWorld::new(TileTable::default(), Box::new(NullSink::default()), clock.clone());
        world
            .add_terrain("ground", TerrainConfig::new(1.0, 8.0), Vec3::ZERO)
            .expect("add terrain");
        EditorScene::new(world, clock)
    }

    fn object() -> ObjectData {
        ObjectData {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            cls_id: "crate".into(),
            args: serde_json::Value::Null,
            terrain_id: None,
        }
    }

    #[test]
    fn test_set_pixel_resolves_relative_at_build() {
        let mut scene = scene();
        scene
            .world
            .set_pixel("ground", 1, 1, &CellPatch::height(3))
            .expect("set");
        let action = SetPixelAction::new(&mut scene, "ground", 1, 1, &CellPatch::height(HeightPatch::Relative(2)))
            .expect("build");
        assert_eq!(action.new.height, Some(HeightPatch::Absolute(5)));
        assert_eq!(action.old, Cell::new(TileId::EMPTY, 3));

        // Unrelated change in between; exec still lands on the snapshot.
        scene
            .world
            .set_pixel("ground", 1, 1, &CellPatch::height(9))
            .expect("set");
        action.exec(&mut scene);
        action.exec(&mut scene);
        assert_eq!(scene.world.get_pixel("ground", 1, 1).expect("get").height, 5);
        action.revert(&mut scene);
        assert_eq!(scene.world.get_pixel("ground", 1, 1).expect("get").height, 3);
    }

    #[test]
    fn test_set_pixel_unknown_terrain() {
        let mut scene = scene();
        let result = SetPixelAction::new(&mut scene, "sky", 0, 0, &CellPatch::tile(TileId(1)));
        assert!(matches!(result, Err(EditorError::World(_))));
    }

    #[test]
    fn test_create_remove_idempotent() {
        let mut scene = scene();
        let create = CreateObjectAction::new(&scene, "c1", object()).expect("new id");
        create.exec(&mut scene);
        create.exec(&mut scene);
        assert_eq!(scene.objects.len(), 1);
        create.revert(&mut scene);
        create.revert(&mut scene);
        assert!(scene.objects.is_empty());

        create.exec(&mut scene);
        let remove = RemoveObjectAction::new(&scene, "c1").expect("exists");
        remove.exec(&mut scene);
        remove.exec(&mut scene);
        assert!(!scene.objects.contains("c1"));
        remove.revert(&mut scene);
        assert!(scene.objects.contains("c1"));
    }

    #[test]
    fn test_object_lookups_fail_cleanly() {
        let scene = scene();
        assert!(matches!(
            MoveObjectAction::new(&scene, "ghost", Vec3::ONE),
            Err(EditorError::UnknownObject(_))
        ));
        assert!(matches!(
            RemoveObjectAction::new(&scene, "ghost"),
            Err(EditorError::UnknownObject(_))
        ));
    }

    #[test]
    fn test_move_object_and_terrain() {
        let mut scene = scene();
        scene.objects.create("c1", &object());
        let mv = MoveObjectAction::new(&scene, "c1", Vec3::new(2.0, 0.0, 1.0)).expect("exists");
        mv.exec(&mut scene);
        assert_eq!(scene.objects.get("c1").expect("c1").position, Vec3::new(2.0, 0.0, 1.0));
        mv.revert(&mut scene);
        assert_eq!(scene.objects.get("c1").expect("c1").position, Vec3::ZERO);

        let shift = SetTerrainPositionAction::new(&scene, "ground", Vec3::new(0.0, 2.0, 0.0)).expect("known");
        shift.exec(&mut scene);
        assert_eq!(scene.world.terrain("ground").expect("ground").position().y, 2.0);
        shift.revert(&mut scene);
        assert_eq!(scene.world.terrain("ground").expect("ground").position(), Vec3::ZERO);
        assert!(scene.revision() >= 4);
    }
}
