//! Session registry.
//!
//! [`SessionStore`] owns every [`Session`] plus a reverse index from
//! connection to the sessions it is seated in. It is a plain owned value:
//! exclusive access comes from `&mut self`, so it carries no locks.

use crate::error::RelayError;
use crate::session::{Admission, ConnectionId, Session, SessionId};
use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info, instrument};

/// Outcome of [`SessionStore::create_if_absent`].
#[derive(Debug)]
pub enum StoreEntry<'a> {
    /// No session existed; a new one seats the creator.
    Created(&'a mut Session),
    /// A session already existed and was left unchanged.
    AlreadyExists(&'a mut Session),
}

/// Outcome of [`SessionStore::release`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Release {
    /// Players still seated, in seat order.
    Remaining(Vec<ConnectionId>),
    /// The last player left and the session was deleted.
    Closed,
}

/// In-memory registry of game sessions.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<SessionId, Session>,
    memberships: HashMap<ConnectionId, BTreeSet<SessionId>>,
}

impl SessionStore {
    /// Creates an empty store.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating session store");
        Self::default()
    }

    /// Looks up a session.
    pub fn get(&self, id: &str) -> Option<&Session> {
        self.sessions.get(id)
    }

    /// Looks up a session for mutation.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Session> {
        self.sessions.get_mut(id)
    }

    /// Creates a session seating `creator` unless `id` is already taken.
    ///
    /// An existing session is returned untouched as
    /// [`StoreEntry::AlreadyExists`] so the caller can take the join path.
    #[instrument(skip_all, fields(session_id = %id, creator = %creator))]
    pub fn create_if_absent(&mut self, id: SessionId, creator: ConnectionId) -> StoreEntry<'_> {
        match self.sessions.entry(id) {
            Entry::Occupied(entry) => {
                debug!("Session already exists");
                StoreEntry::AlreadyExists(entry.into_mut())
            }
            Entry::Vacant(entry) => {
                let id = entry.key().clone();
                self.memberships
                    .entry(creator.clone())
                    .or_default()
                    .insert(id.clone());
                StoreEntry::Created(entry.insert(Session::new(id, creator)))
            }
        }
    }

    /// Seats `connection` in an existing session.
    #[instrument(skip_all, fields(session_id = %id, connection = %connection))]
    pub fn admit(
        &mut self,
        id: &SessionId,
        connection: &ConnectionId,
    ) -> Result<Admission, RelayError> {
        let session = self
            .sessions
            .get_mut(id)
            .ok_or(RelayError::SessionNotFound)?;
        let admission = session.add_player(connection.clone())?;
        self.link(connection, id);
        Ok(admission)
    }

    /// Unseats `connection`, deleting the session once nobody is left.
    ///
    /// A connection holding no seat leaves the session untouched and gets
    /// back the current players.
    #[instrument(skip_all, fields(session_id = %id, connection = %connection))]
    pub fn release(
        &mut self,
        id: &SessionId,
        connection: &ConnectionId,
    ) -> Result<Release, RelayError> {
        let session = self
            .sessions
            .get_mut(id)
            .ok_or(RelayError::SessionNotFound)?;
        if !session.remove_player(connection) {
            debug!("Connection holds no seat");
            return Ok(Release::Remaining(session.players().to_vec()));
        }
        let remaining = session.players().to_vec();
        self.unlink(connection, id);

        if remaining.is_empty() {
            self.sessions.remove(id);
            info!("Last player left, session closed");
            Ok(Release::Closed)
        } else {
            Ok(Release::Remaining(remaining))
        }
    }

    /// Removes a session outright, forgetting all of its memberships.
    #[instrument(skip_all, fields(session_id = %id))]
    pub fn delete(&mut self, id: &SessionId) -> Option<Session> {
        let session = self.sessions.remove(id)?;
        for player in session.players() {
            self.unlink(player, id);
        }
        info!("Session deleted");
        Some(session)
    }

    /// Sessions `connection` is currently seated in.
    pub fn sessions_of(&self, connection: &ConnectionId) -> Vec<SessionId> {
        self.memberships
            .get(connection)
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Checks whether no session is live.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Identifiers of all live sessions, sorted.
    pub fn ids(&self) -> Vec<SessionId> {
        let mut ids: Vec<_> = self.sessions.keys().cloned().collect();
        ids.sort();
        ids
    }

    fn link(&mut self, connection: &ConnectionId, id: &SessionId) {
        self.memberships
            .entry(connection.clone())
            .or_default()
            .insert(id.clone());
    }

    fn unlink(&mut self, connection: &ConnectionId, id: &SessionId) {
        if let Some(ids) = self.memberships.get_mut(connection) {
            ids.remove(id);
            if ids.is_empty() {
                self.memberships.remove(connection);
            }
        }
    }
}
