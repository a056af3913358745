//! The session protocol state machine.
//!
//! [`Coordinator`] applies one inbound event at a time to its
//! [`SessionStore`] and reports the settled result through a [`Transport`].
//! It is driven through `&mut self`; see [`crate::runtime`] for the task that
//! serializes events from many connections into it.

use crate::error::RelayError;
use crate::protocol::{ClientEvent, GameOutcome, MoveRequest, ServerEvent};
use crate::session::{Admission, ConnectionId, SessionId, Verdict};
use crate::store::{Release, SessionStore, StoreEntry};
use crate::transport::Transport;
use tracing::{debug, info, instrument, warn};

/// Owns the session registry and applies the join/leave/move/restart protocol.
#[derive(Debug)]
pub struct Coordinator<T> {
    store: SessionStore,
    transport: T,
}

impl<T: Transport> Coordinator<T> {
    /// Creates a coordinator with an empty store.
    pub fn new(transport: T) -> Self {
        Self::with_store(SessionStore::new(), transport)
    }

    /// Creates a coordinator over an existing store.
    pub fn with_store(store: SessionStore, transport: T) -> Self {
        Self { store, transport }
    }

    /// The session registry.
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// The outbound transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Tears the coordinator down, handing back its store.
    pub fn into_store(self) -> SessionStore {
        self.store
    }

    /// Applies one event sent by `connection`.
    ///
    /// An `Err` means the event was dropped and explains why. Only
    /// [`RelayError::SessionFull`] produced any outbound traffic (`gameFull`
    /// to the sender); every other error left state and clients untouched.
    #[instrument(
        skip_all,
        fields(connection = %connection, event = event.as_ref(), session_id = %event.session_id())
    )]
    pub fn handle(
        &mut self,
        connection: &ConnectionId,
        event: ClientEvent,
    ) -> Result<(), RelayError> {
        match event {
            ClientEvent::JoinGame(id) => self.join(connection, id),
            ClientEvent::LeaveGame(id) => self.leave(connection, &id),
            ClientEvent::RestartRequest(id) => self.request_restart(connection, &id),
            ClientEvent::RestartGame(id) => self.restart(connection, &id),
            ClientEvent::MakeMove(MoveRequest { game_id, index }) => {
                self.make_move(connection, &game_id, index)
            }
        }
    }

    /// Handles a closed connection: leaves every session it was seated in.
    ///
    /// Returns the sessions it left.
    #[instrument(skip_all, fields(connection = %connection))]
    pub fn disconnect(&mut self, connection: &ConnectionId) -> Vec<SessionId> {
        let sessions = self.store.sessions_of(connection);
        debug!(count = sessions.len(), "Connection disconnected");

        for id in &sessions {
            if let Err(reason) = self.leave(connection, id) {
                // The reverse index and the store disagree.
                warn!(session_id = %id, %reason, "Leave on disconnect failed");
            }
        }
        sessions
    }

    fn join(&mut self, connection: &ConnectionId, id: SessionId) -> Result<(), RelayError> {
        if let StoreEntry::Created(_) = self.store.create_if_absent(id.clone(), connection.clone())
        {
            self.transport.add_to_group(connection, &id);
            info!(session_id = %id, "Session created, waiting for opponent");
            return Ok(());
        }

        match self.store.admit(&id, connection) {
            Ok(Admission::Seated) => {
                self.transport.add_to_group(connection, &id);
                Ok(())
            }
            Ok(Admission::Started { players }) => {
                self.transport.add_to_group(connection, &id);
                info!(session_id = %id, ?players, "Game started");
                self.transport.send_to_group(
                    &id,
                    &ServerEvent::GameStart {
                        game_id: id.clone(),
                        players,
                    },
                );
                Ok(())
            }
            Err(RelayError::SessionFull) => {
                info!(session_id = %id, "Game is full");
                self.transport
                    .send_to_connection(connection, &ServerEvent::GameFull);
                Err(RelayError::SessionFull)
            }
            Err(reason) => Err(reason),
        }
    }

    fn leave(&mut self, connection: &ConnectionId, id: &SessionId) -> Result<(), RelayError> {
        let release = self.store.release(id, connection)?;
        self.transport.remove_from_group(connection, id);

        match release {
            Release::Closed => {
                info!(session_id = %id, "Session closed");
            }
            Release::Remaining(players) => {
                self.transport.send_to_group(
                    id,
                    &ServerEvent::PlayerLeft {
                        game_id: id.clone(),
                        players,
                    },
                );
            }
        }
        Ok(())
    }

    fn request_restart(
        &mut self,
        connection: &ConnectionId,
        id: &SessionId,
    ) -> Result<(), RelayError> {
        let session = self.store.get(id.as_str()).ok_or(RelayError::SessionNotFound)?;
        debug!(
            session_id = %id,
            seated = session.is_player(connection),
            "Relaying restart request"
        );

        self.transport.send_to_group(
            id,
            &ServerEvent::RestartRequested {
                game_id: id.clone(),
                players: session.players().to_vec(),
            },
        );
        Ok(())
    }

    fn restart(&mut self, connection: &ConnectionId, id: &SessionId) -> Result<(), RelayError> {
        let session = self
            .store
            .get_mut(id.as_str())
            .ok_or(RelayError::SessionNotFound)?;
        debug!(
            session_id = %id,
            seated = session.is_player(connection),
            "Restart confirmed"
        );

        session.restart();
        self.transport.send_to_group(
            id,
            &ServerEvent::GameRestarted {
                board: *session.board(),
            },
        );
        Ok(())
    }

    fn make_move(
        &mut self,
        connection: &ConnectionId,
        id: &SessionId,
        index: usize,
    ) -> Result<(), RelayError> {
        let session = self
            .store
            .get_mut(id.as_str())
            .ok_or(RelayError::SessionNotFound)?;
        let record = session.play(connection, index)?;

        self.transport.send_to_group(
            id,
            &ServerEvent::MoveMade {
                board: *session.board(),
                index: record.index,
                player: record.seat,
            },
        );

        let outcome = match record.verdict {
            Verdict::Continue { .. } => return Ok(()),
            Verdict::Won(winner) => GameOutcome::Winner { winner },
            Verdict::Draw => GameOutcome::draw(),
        };
        info!(session_id = %id, ?outcome, "Game over");
        self.transport
            .send_to_group(id, &ServerEvent::GameOver(outcome));
        Ok(())
    }
}
