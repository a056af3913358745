//! Wire events exchanged with clients.
//!
//! Every frame is a JSON object `{"event": <name>, "data": <payload>}`.

use crate::session::{ConnectionId, SessionId};
use serde::{Deserialize, Serialize};
use strictly_tictactoe::{Board, Seat};

/// Payload of `makeMove`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    /// Session to play in.
    pub game_id: SessionId,
    /// Cell index, 0-8 row-major.
    pub index: usize,
}

/// Events a client sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, strum::AsRefStr)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ClientEvent {
    /// Create or join a session.
    JoinGame(SessionId),
    /// Give up a seat.
    LeaveGame(SessionId),
    /// Ask the opponent for a rematch.
    RestartRequest(SessionId),
    /// Clear the board and start over.
    RestartGame(SessionId),
    /// Mark a cell.
    MakeMove(MoveRequest),
}

impl ClientEvent {
    /// Session the event targets.
    pub fn session_id(&self) -> &SessionId {
        match self {
            ClientEvent::JoinGame(id)
            | ClientEvent::LeaveGame(id)
            | ClientEvent::RestartRequest(id)
            | ClientEvent::RestartGame(id) => id,
            ClientEvent::MakeMove(request) => &request.game_id,
        }
    }
}

/// Result carried by `gameOver`: `{"winner": 0}` or `{"draw": true}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GameOutcome {
    /// A seat completed a line.
    Winner {
        /// Winning seat.
        winner: Seat,
    },
    /// The board filled without a line.
    Draw {
        /// Always `true`.
        draw: bool,
    },
}

impl GameOutcome {
    /// Outcome for a drawn game.
    pub fn draw() -> Self {
        GameOutcome::Draw { draw: true }
    }
}

/// Events the relay sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, strum::AsRefStr)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
#[strum(serialize_all = "camelCase")]
pub enum ServerEvent {
    /// Both seats filled; play begins.
    GameStart {
        /// Session id.
        game_id: SessionId,
        /// Players in seat order.
        players: Vec<ConnectionId>,
    },
    /// Join refused; sent only to the refused connection.
    GameFull,
    /// A player left; sent to whoever remains.
    PlayerLeft {
        /// Session id.
        game_id: SessionId,
        /// Remaining players in seat order.
        players: Vec<ConnectionId>,
    },
    /// A player asked for a rematch.
    RestartRequested {
        /// Session id.
        game_id: SessionId,
        /// Players in seat order.
        players: Vec<ConnectionId>,
    },
    /// The board was cleared.
    GameRestarted {
        /// The fresh board.
        board: Board,
    },
    /// A move was accepted.
    MoveMade {
        /// Board after the move.
        board: Board,
        /// Cell that was marked.
        index: usize,
        /// Seat that moved.
        player: Seat,
    },
    /// The game ended.
    GameOver(GameOutcome),
}
