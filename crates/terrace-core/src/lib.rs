pub mod constants;
pub mod direction;
pub mod error;
pub mod math;
pub mod tile;
pub mod types;

pub use error::TerraceError;
pub use types::{Cell, CellPatch, ChunkCoord, HeightPatch, TileId};
