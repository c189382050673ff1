/// Error types for board construction and entity placement.

use thiserror::Error;

/// Failures that are not part of normal play.
///
/// Collisions are deliberately absent: they end the game through the
/// `game_over` flag, not through an error channel.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("board {width}x{height} is too small (need at least 3x3)")]
    BoardTooSmall { width: i32, height: i32 },

    #[error("no free interior cell left for placement")]
    NoFreeCell,
}

pub type Result<T> = std::result::Result<T, GameError>;
