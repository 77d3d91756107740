//! Error types for board ingest and validation
//!
//! The reordering engine, the store and the drag controller never fail; these
//! errors only come out of the boundaries where external data enters.

use thiserror::Error;

/// Result type for board operations
pub type Result<T> = std::result::Result<T, BoardError>;

/// Errors raised when a board payload or partition is malformed
#[derive(Debug, Error)]
pub enum BoardError {
    /// The same assignment appears more than once on the board
    #[error("duplicate assignment id: {id}")]
    DuplicateAssignment { id: String },

    /// A card's recorded stage disagrees with the lane it is listed in
    #[error("assignment {id} is listed under '{listed}' but records stage '{recorded}'")]
    StageMismatch {
        id: String,
        listed: String,
        recorded: String,
    },

    /// A card's position does not match its index in the lane
    #[error("assignment {id} in '{stage}' has position {actual}, expected {expected}")]
    PositionMismatch {
        id: String,
        stage: String,
        expected: usize,
        actual: usize,
    },

    /// The board has no stages at all
    #[error("board has no stages")]
    NoStages,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
