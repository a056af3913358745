//! Game session records.
//!
//! A [`Session`] is one two-player game: its board, the connections seated
//! at it (join order decides seat), whose turn it is and the lifecycle
//! [`Phase`]. Sessions know nothing about transports; they only validate and
//! apply state transitions.

use crate::error::RelayError;
use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use strictly_tictactoe::{Board, Seat, apply_mark, check_win, is_draw};
use tracing::{debug, info, instrument};

/// Most players a session seats.
pub const MAX_PLAYERS: usize = 2;

/// Opaque handle for one remote party, valid for the life of its connection.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ConnectionId(String);

impl ConnectionId {
    /// Returns the handle as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ConnectionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl Borrow<str> for ConnectionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Externally supplied session identifier (the client's `gameId`).
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl Borrow<str> for SessionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Phase {
    /// One player seated, waiting for an opponent.
    Waiting,
    /// Both seats filled, game in progress.
    Active,
    /// Won or drawn; only a restart or a departure changes it.
    Concluded,
}

/// Result of seating a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Seated; still waiting for an opponent.
    Seated,
    /// Seated and the session is now full; play starts from the first seat.
    Started {
        /// Both players in seat order.
        players: Vec<ConnectionId>,
    },
}

/// How an accepted move left the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Play continues with `next` to move.
    Continue {
        /// Seat whose turn it now is.
        next: Seat,
    },
    /// The mover completed a line.
    Won(Seat),
    /// The board filled without a line.
    Draw,
}

/// An accepted move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRecord {
    /// Seat that moved.
    pub seat: Seat,
    /// Cell that was marked.
    pub index: usize,
    /// What the move decided.
    pub verdict: Verdict,
}

/// A two-player game session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: SessionId,
    board: Board,
    players: Vec<ConnectionId>,
    current: Seat,
    phase: Phase,
}

impl Session {
    /// Creates a session with its creator in the first seat.
    #[instrument(skip_all, fields(session_id = %id, creator = %creator))]
    pub fn new(id: SessionId, creator: ConnectionId) -> Self {
        info!("Creating new game session");
        Self {
            id,
            board: Board::new(),
            players: vec![creator],
            current: Seat::First,
            phase: Phase::Waiting,
        }
    }

    /// Session identifier.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Current board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Seated connections in seat order.
    pub fn players(&self) -> &[ConnectionId] {
        &self.players
    }

    /// Seat whose turn it is.
    pub fn current(&self) -> Seat {
        self.current
    }

    /// Lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Seat held by `connection`, if seated here.
    pub fn seat_of(&self, connection: &ConnectionId) -> Option<Seat> {
        self.players
            .iter()
            .position(|player| player == connection)
            .and_then(Seat::from_index)
    }

    /// Checks whether `connection` holds a seat.
    pub fn is_player(&self, connection: &ConnectionId) -> bool {
        self.players.contains(connection)
    }

    /// Checks whether both seats are taken.
    pub fn is_full(&self) -> bool {
        self.players.len() >= MAX_PLAYERS
    }

    /// Connection whose turn it is.
    pub fn current_player(&self) -> Option<&ConnectionId> {
        self.players.get(self.current.index())
    }

    /// Seats `connection` in the next free seat.
    ///
    /// Filling the second seat starts play with the first seat to move. The
    /// board is kept as it stands; only a restart clears it.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub(crate) fn add_player(&mut self, connection: ConnectionId) -> Result<Admission, RelayError> {
        if self.is_player(&connection) {
            debug!(%connection, "Connection already seated");
            return Err(RelayError::DuplicateJoin);
        }
        if self.is_full() {
            debug!(%connection, "Session already has 2 players");
            return Err(RelayError::SessionFull);
        }

        info!(%connection, seat = self.players.len(), "Seating player");
        self.players.push(connection);

        if self.is_full() {
            self.start_game();
            Ok(Admission::Started {
                players: self.players.clone(),
            })
        } else {
            Ok(Admission::Seated)
        }
    }

    /// Removes `connection` from its seat. Returns `false` if it held none.
    ///
    /// A lone remaining player moves to the first seat and waits for a new
    /// opponent.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub(crate) fn remove_player(&mut self, connection: &ConnectionId) -> bool {
        let before = self.players.len();
        self.players.retain(|player| player != connection);
        if self.players.len() == before {
            return false;
        }

        if !self.is_full() {
            self.phase = Phase::Waiting;
            self.current = Seat::First;
        }
        info!(%connection, remaining = self.players.len(), "Player left session");
        true
    }

    /// Validates and applies a move by `connection` at `index`.
    ///
    /// A rejected move leaves the session untouched.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub(crate) fn play(
        &mut self,
        connection: &ConnectionId,
        index: usize,
    ) -> Result<MoveRecord, RelayError> {
        if self.phase != Phase::Active {
            return Err(RelayError::GameNotActive);
        }
        if !self.is_player(connection) {
            return Err(RelayError::NotAPlayer);
        }
        if self.current_player() != Some(connection) {
            return Err(RelayError::NotYourTurn);
        }

        let seat = self.current;
        self.board = apply_mark(&self.board, index, seat)?;

        let verdict = if check_win(&self.board, seat) {
            self.phase = Phase::Concluded;
            Verdict::Won(seat)
        } else if is_draw(&self.board) {
            self.phase = Phase::Concluded;
            Verdict::Draw
        } else {
            // A lone player keeps the move.
            self.current = if self.is_full() {
                seat.opponent()
            } else {
                Seat::First
            };
            Verdict::Continue { next: self.current }
        };

        debug!(%connection, index, ?verdict, "Move applied\n{}", self.board);
        Ok(MoveRecord {
            seat,
            index,
            verdict,
        })
    }

    /// Clears the board and gives the first seat the move.
    ///
    /// Works from any phase and always leaves the session `Active`, even
    /// with a single player seated.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub(crate) fn restart(&mut self) {
        self.board = Board::new();
        self.current = Seat::First;
        self.phase = Phase::Active;
        info!(players = self.players.len(), "Game restarted");
    }

    fn start_game(&mut self) {
        self.current = Seat::First;
        self.phase = Phase::Active;
        info!(session_id = %self.id, "Game started");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strictly_tictactoe::{Cell, InvalidMove};

    fn full_session() -> Session {
        let mut session = Session::new("g1".into(), "x".into());
        session.add_player("o".into()).unwrap();
        session
    }

    #[test]
    fn test_new_session_waits() {
        let session = Session::new("g1".into(), "x".into());
        assert_eq!(session.phase(), Phase::Waiting);
        assert_eq!(session.players().to_vec(), vec![ConnectionId::from("x")]);
        assert_eq!(session.seat_of(&"x".into()), Some(Seat::First));
    }

    #[test]
    fn test_second_player_starts_game() {
        let mut session = Session::new("g1".into(), "x".into());
        let admission = session.add_player("o".into()).unwrap();
        assert_eq!(
            admission,
            Admission::Started {
                players: vec!["x".into(), "o".into()]
            }
        );
        assert_eq!(session.phase(), Phase::Active);
        assert_eq!(session.current_player(), Some(&"x".into()));
    }

    #[test]
    fn test_duplicate_and_third_player_rejected() {
        let mut session = full_session();
        assert_eq!(session.add_player("x".into()), Err(RelayError::DuplicateJoin));
        assert_eq!(session.add_player("z".into()), Err(RelayError::SessionFull));
        assert_eq!(session.players().len(), 2);
    }

    #[test]
    fn test_move_out_of_turn_rejected() {
        let mut session = full_session();
        let before = session.clone();
        assert_eq!(session.play(&"o".into(), 0), Err(RelayError::NotYourTurn));
        assert_eq!(session, before);
    }

    #[test]
    fn test_move_on_occupied_cell_rejected() {
        let mut session = full_session();
        session.play(&"x".into(), 4).unwrap();
        let before = session.clone();
        assert_eq!(
            session.play(&"o".into(), 4),
            Err(RelayError::InvalidMove(InvalidMove::Occupied(4)))
        );
        assert_eq!(session, before);
    }

    #[test]
    fn test_move_while_waiting_rejected() {
        let mut session = Session::new("g1".into(), "x".into());
        assert_eq!(session.play(&"x".into(), 0), Err(RelayError::GameNotActive));
    }

    #[test]
    fn test_leave_reverts_to_waiting() {
        let mut session = full_session();
        session.play(&"x".into(), 4).unwrap();
        assert!(session.remove_player(&"x".into()));
        assert_eq!(session.phase(), Phase::Waiting);
        assert_eq!(session.seat_of(&"o".into()), Some(Seat::First));
        assert!(!session.remove_player(&"x".into()));
    }

    #[test]
    fn test_restart_clears_concluded_game() {
        let mut session = full_session();
        for (player, index) in [("x", 0), ("o", 3), ("x", 1), ("o", 4), ("x", 2)] {
            session.play(&player.into(), index).unwrap();
        }
        assert_eq!(session.phase(), Phase::Concluded);

        session.restart();
        assert_eq!(session.phase(), Phase::Active);
        assert_eq!(session.current(), Seat::First);
        assert!(session.board().cells().iter().all(|cell| *cell == Cell::Empty));
    }

    #[test]
    fn test_refilled_seat_keeps_board() {
        let mut session = full_session();
        session.play(&"x".into(), 4).unwrap();
        session.remove_player(&"o".into());

        session.add_player("z".into()).unwrap();
        assert_eq!(session.phase(), Phase::Active);
        assert_eq!(session.current_player(), Some(&"x".into()));
        assert_eq!(session.board().get(4), Some(Cell::Marked(Seat::First)));
    }

    #[test]
    fn test_lone_player_restart_activates() {
        let mut session = Session::new("g1".into(), "x".into());
        session.restart();
        assert_eq!(session.phase(), Phase::Active);

        let record = session.play(&"x".into(), 0).unwrap();
        assert_eq!(
            record.verdict,
            Verdict::Continue {
                next: Seat::First
            }
        );
        session.play(&"x".into(), 1).unwrap();
        assert_eq!(session.current_player(), Some(&"x".into()));
    }
}
