use terrace_persist::PersistError;
use terrace_world::WorldError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    World(#[from] WorldError),

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error("unknown object {0:?}")]
    UnknownObject(String),

    #[error("object {0:?} already exists")]
    DuplicateObject(String),
}
