//! Error types for the editor

use mindmap_codecs::{CodecError, ParseError};
use mindmap_model::ConvertError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HistoryError {
    #[error("Snapshot contains duplicate node id: {0}")]
    DuplicateNodeId(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored record is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    History(#[from] HistoryError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("Graph does not form a tree: {0}")]
    Convert(#[from] ConvertError),

    #[error("A recovered autosave is waiting to be restored or discarded")]
    ConflictPending,

    #[error("No pending autosave conflict to resolve")]
    NoConflict,

    #[error("No save slot at index {0}")]
    NoSuchSlot(usize),

    #[error("Session is closed")]
    Closed,
}
