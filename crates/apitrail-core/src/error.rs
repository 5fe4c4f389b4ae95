//! Error types for the snapshot store.

use thiserror::Error;

/// Errors that can occur when loading or slicing a snapshot store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Snapshot store is empty")]
    Empty,

    #[error("Version index out of bounds: {index} (length: {length})")]
    IndexOutOfBounds { index: usize, length: usize },

    #[error("Invalid version range: {start}..={end} (length: {length})")]
    InvalidRange {
        start: usize,
        end: usize,
        length: usize,
    },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::SerializationError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
