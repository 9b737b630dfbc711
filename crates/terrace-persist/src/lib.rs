pub mod error;
pub mod format;
pub mod load;
pub mod rle;
pub mod save;

pub use error::PersistError;
pub use format::{ChunkData, MapData, ObjectData, TerrainData};
pub use load::{load, load_or_empty};
pub use rle::Rle;
pub use save::{save, save_pretty};
