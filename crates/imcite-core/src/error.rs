//! Error types for imcite-core

use thiserror::Error;

use crate::record::RecordId;

/// Result type alias for collection operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Main error type for collection operations
#[derive(Error, Debug)]
pub enum CoreError {
    /// Parse errors from rejected text edits
    #[error("Parse error: {0}")]
    Parse(#[from] imcite_bibtex::ParseError),

    /// Index outside the collection
    #[error("Index {index} out of bounds for collection of {len}")]
    OutOfBounds { index: usize, len: usize },

    /// Record not found
    #[error("Record not found: {0}")]
    NotFound(RecordId),

    /// Event receiver already taken
    #[error("subscribe: receiver already taken")]
    ReceiverTaken,
}
