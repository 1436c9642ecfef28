//! Error types for board construction, move application and fixture parsing

use thiserror::Error;

/// Errors that can occur while building or mutating a board
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Connect4Error {
    /// A move was attempted in a full column or a column outside the board
    #[error("Invalid move, column {} is full or outside the board (1-{})", .column + 1, .width)]
    InvalidMove { column: usize, width: usize },

    /// Replaying a move string failed, the whole replay is discarded
    #[error("Invalid move '{token}' at index {index} of the move string")]
    InvalidMoveInSequence { index: usize, token: char },

    /// `undo_move` was called before any move was made
    #[error("No moves to undo")]
    EmptyHistory,

    /// The board dimensions are outside the supported range
    #[error(
        "Invalid board size {width}x{height}: width must be 4-10, height at least 4, \
         and width * (height + 1) at most 128"
    )]
    Configuration { width: usize, height: usize },

    /// A fixture line is not of the form `<moves> <score>`
    #[error("Malformed fixture line: '{line}'")]
    MalformedFixture { line: String },
}

/// Result type alias for board operations
pub type Result<T> = std::result::Result<T, Connect4Error>;
