//! Error types for canvas operations.
//!
//! Everything here is a local contract violation (a malformed UI event or a
//! programmer error). These are returned synchronously and never mutate state.

use thiserror::Error;

use crate::BlockId;

/// Errors that can occur while editing the document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CanvasError {
    /// Insert position is negative or past the end of the document.
    #[error("invalid position {position} for document with {len} blocks")]
    InvalidPosition { position: i64, len: usize },

    /// Block or drop-zone index outside the valid range.
    #[error("index {index} out of range for document with {len} blocks")]
    IndexOutOfRange { index: usize, len: usize },

    /// A value was rejected (e.g. a block type dropped on a zone that refuses it).
    #[error("invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// Block ID already present in the document.
    #[error("block already exists: {0:?}")]
    DuplicateBlock(BlockId),
}

impl CanvasError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}
