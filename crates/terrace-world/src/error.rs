use terrace_core::TerraceError;
use terrace_persist::PersistError;
use thiserror::Error;

use crate::loader::LoadError;

/// Errors surfaced by the terrain session.
#[derive(Debug, Error)]
pub enum WorldError {
    #[error(transparent)]
    Core(#[from] TerraceError),

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("terrain {0:?} already exists")]
    DuplicateTerrain(String),
}
