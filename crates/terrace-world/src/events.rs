use glam::Vec3;
use terrace_core::ChunkCoord;

/// Notifications for renderer/persistence layers, queued per terrain and
/// drained by the host once per tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TerrainEvent {
    /// A chunk was created in the chunk map.
    ChunkLoaded { terrain: String, chunk: ChunkCoord },
    /// One or more chunk atlases were redrawn and flushed.
    TileUpdated { terrain: String },
    /// These chunks were re-merged; blocks, meshes and colliders changed.
    HeightUpdated {
        terrain: String,
        chunks: Vec<ChunkCoord>,
    },
    /// The terrain origin moved by `delta`.
    PositionUpdated { terrain: String, delta: Vec3 },
}

impl TerrainEvent {
    pub fn terrain(&self) -> &str {
        match self {
            TerrainEvent::ChunkLoaded { terrain, .. }
            | TerrainEvent::TileUpdated { terrain }
            | TerrainEvent::HeightUpdated { terrain, .. }
            | TerrainEvent::PositionUpdated { terrain, .. } => terrain,
        }
    }
}
