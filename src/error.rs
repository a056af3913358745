//! Reasons an inbound event is dropped.

use derive_more::{Display, From};
use strictly_tictactoe::InvalidMove;

/// Why the coordinator declined to act on an event.
///
/// None of these are fatal. Apart from [`RelayError::SessionFull`], which is
/// answered with `gameFull`, the client never hears about them; they exist
/// so callers can log and tests can assert the exact reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, From)]
pub enum RelayError {
    /// The target cell is off the board or already marked.
    #[display("Invalid move: {}", _0)]
    #[from]
    InvalidMove(InvalidMove),

    /// The sender is seated but it is the opponent's turn.
    #[display("Not this connection's turn")]
    NotYourTurn,

    /// Moves are only accepted while a game is in progress.
    #[display("No game in progress")]
    GameNotActive,

    /// Two other connections already hold both seats.
    #[display("Session already has two players")]
    SessionFull,

    /// The event names a session that does not exist (stale or late event).
    #[display("Session not found")]
    SessionNotFound,

    /// The sender already holds a seat in this session.
    #[display("Connection already joined this session")]
    DuplicateJoin,

    /// The sender holds no seat in this session.
    #[display("Connection is not a player in this session")]
    NotAPlayer,
}

impl std::error::Error for RelayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RelayError::InvalidMove(err) => Some(err),
            _ => None,
        }
    }
}
