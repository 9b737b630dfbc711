/// Errors that can occur during map save/load operations.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("map JSON is malformed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid chunk key {0:?}")]
    InvalidChunkKey(String),

    #[error("chunk {key} has {actual} {layer}, expected {expected}")]
    ChunkLength {
        key: String,
        layer: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("tile id {0} in chunk data is out of range")]
    TileOutOfRange(i32),
}
