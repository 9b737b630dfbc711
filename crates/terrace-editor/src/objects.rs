//! Placed world objects and the behaviours their classes opt into.

use std::collections::{BTreeMap, HashMap};

use glam::Vec3;
use terrace_persist::ObjectData;

/// Optional behaviour an object class supports. Resolved from the class when
/// the object is created; hosts dispatch on it instead of probing objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    /// Reacts when the scene enters play mode.
    Playable,
    /// Reacts to trigger volumes and scripted signals.
    Triggerable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorldObject {
    pub id: String,
    pub cls_id: String,
    pub position: Vec3,
    pub args: serde_json::Value,
    pub terrain_id: Option<String>,
    pub capabilities: Vec<Capability>,
    pub playing: bool,
    pub trigger_count: u32,
}

impl WorldObject {
    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    pub fn to_data(&self) -> ObjectData {
        ObjectData {
            x: self.position.x,
            y: self.position.y,
            z: self.position.z,
            cls_id: self.cls_id.clone(),
            args: self.args.clone(),
            terrain_id: self.terrain_id.clone(),
        }
    }
}

/// All placed objects of a scene, plus the class table that decides capabilities.
#[derive(Debug, Default)]
pub struct ObjectStore {
    objects: BTreeMap<String, WorldObject>,
    classes: HashMap<String, Vec<Capability>>,
}

impl ObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the capabilities of a class. Affects objects created afterwards.
    pub fn register_class(&mut self, cls_id: &str, capabilities: &[Capability]) {
        let mut caps = capabilities.to_vec();
        caps.sort();
        caps.dedup();
        self.classes.insert(cls_id.to_string(), caps);
    }

    /// Place an object. Returns false if the id is taken.
    pub fn create(&mut self, id: &str, data: &ObjectData) -> bool {
        if self.objects.contains_key(id) {
            return false;
        }
        let capabilities = self.classes.get(&data.cls_id).cloned().unwrap_or_default();
        self.objects.insert(
            id.to_string(),
            WorldObject {
                id: id.to_string(),
                cls_id: data.cls_id.clone(),
                position: Vec3::new(data.x, data.y, data.z),
                args: data.args.clone(),
                terrain_id: data.terrain_id.clone(),
                capabilities,
                playing: false,
                trigger_count: 0,
            },
        );
        true
    }

    /// Remove an object, returning its persisted form.
    pub fn remove(&mut self, id: &str) -> Option<ObjectData> {
        self.objects.remove(id).map(|o| o.to_data())
    }

    /// Move an object, returning its previous position.
    pub fn move_to(&mut self, id: &str, position: Vec3) -> Option<Vec3> {
        let object = self.objects.get_mut(id)?;
        Some(std::mem::replace(&mut object.position, position))
    }

    pub fn get(&self, id: &str) -> Option<&WorldObject> {
        self.objects.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.objects.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn with_capability(&self, capability: Capability) -> impl Iterator<Item = &WorldObject> {
        self.objects.values().filter(move |o| o.has(capability))
    }

    /// Put every playable object into play mode. Returns their ids.
    pub fn start_playing(&mut self) -> Vec<String> {
        let mut started = Vec::new();
        for object in self.objects.values_mut() {
            if object.has(Capability::Playable) && !object.playing {
                object.playing = true;
                started.push(object.id.clone());
            }
        }
        started
    }

    pub fn stop_playing(&mut self) {
        for object in self.objects.values_mut() {
            object.playing = false;
        }
    }

    /// Deliver a trigger. Objects without the capability ignore it.
    pub fn trigger(&mut self, id: &str) -> bool {
        match self.objects.get_mut(id) {
            Some(object) if object.has(Capability::Triggerable) => {
                object.trigger_count += 1;
                true
            }
            _ => false,
        }
    }

    pub fn to_data(&self) -> BTreeMap<String, ObjectData> {
        self.objects
            .iter()
            .map(|(id, o)| (id.clone(), o.to_data()))
            .collect()
    }

    /// Replace all objects with those of a saved map.
    pub fn clear(&mut self) {
        self.objects.clear();
    }

    pub fn load(&mut self, objects: &BTreeMap<String, ObjectData>) {
        self.clear();
        for (id, data) in objects {
            self.create(id, data);
        }
    }
}
