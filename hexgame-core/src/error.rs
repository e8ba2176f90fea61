//! Error types for game operations

use crate::board::{Color, Coord};

/// Result alias used throughout the core crate
pub type Result<T> = std::result::Result<T, GameError>;

/// Recoverable failures of board, ledger, search and persistence operations.
///
/// A failed operation never leaves a session half-updated: every variant is
/// returned before any state has been mutated.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("Invalid move: ({row}, {col}) is not a valid cell")]
    InvalidCoordinate { row: isize, col: isize },

    #[error("Position occupied: {0}")]
    OccupiedCell(Coord),

    #[error("It's not {got:?}'s turn to move ({expected:?} to play)")]
    WrongTurn { expected: Color, got: Color },

    #[error("No moves have been played yet")]
    EmptyLedger,

    #[error("You need to make a move first")]
    NoPriorMove,

    #[error("Swap is not available")]
    InvalidSwapState,

    #[error("{0} is not available")]
    UnavailableFeature(&'static str),

    #[error("The game is already over")]
    GameOver,

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Corrupt state file: {0}")]
    PersistenceFormat(String),

    #[error("State file cannot be accessed: {0}")]
    Io(#[from] std::io::Error),
}

impl GameError {
    pub(crate) fn invalid_coordinate(row: isize, col: isize) -> Self {
        GameError::InvalidCoordinate { row, col }
    }
}
