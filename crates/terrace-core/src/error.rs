use thiserror::Error;

/// Errors raised while configuring or addressing terrain.
#[derive(Debug, Error)]
pub enum TerraceError {
    #[error("invalid terrain config: {0}")]
    InvalidConfig(String),

    #[error("invalid height patch {0:?} (expected N, +N or -N)")]
    InvalidHeightPatch(String),

    #[error("unknown terrain {0:?}")]
    UnknownTerrain(String),

    #[error("invalid chunk key {0:?} (expected \"i,j\")")]
    InvalidChunkKey(String),
}
