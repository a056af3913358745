//! Outbound delivery contract.
//!
//! The coordinator never touches sockets. It talks to a [`Transport`], which
//! owns connection handles and broadcast groups. Every primitive is a
//! non-blocking enqueue so the coordinator can finish an event without
//! yielding.

use crate::protocol::ServerEvent;
use crate::session::{ConnectionId, SessionId};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::trace;

/// Delivery primitives the coordinator relies on.
pub trait Transport {
    /// Sends `event` to one connection.
    fn send_to_connection(&self, connection: &ConnectionId, event: &ServerEvent);

    /// Sends `event` to every connection in the session's group.
    fn send_to_group(&self, session: &SessionId, event: &ServerEvent);

    /// Adds a connection to a session's group.
    fn add_to_group(&self, connection: &ConnectionId, session: &SessionId);

    /// Removes a connection from a session's group.
    fn remove_from_group(&self, connection: &ConnectionId, session: &SessionId);
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send_to_connection(&self, connection: &ConnectionId, event: &ServerEvent) {
        (**self).send_to_connection(connection, event)
    }

    fn send_to_group(&self, session: &SessionId, event: &ServerEvent) {
        (**self).send_to_group(session, event)
    }

    fn add_to_group(&self, connection: &ConnectionId, session: &SessionId) {
        (**self).add_to_group(connection, session)
    }

    fn remove_from_group(&self, connection: &ConnectionId, session: &SessionId) {
        (**self).remove_from_group(connection, session)
    }
}

#[derive(Debug, Default)]
struct Recorded {
    groups: HashMap<SessionId, BTreeSet<ConnectionId>>,
    inboxes: HashMap<ConnectionId, Vec<ServerEvent>>,
}

/// In-memory transport that records what each connection would receive.
///
/// Cloning shares the recording, so a test can keep one handle while the
/// coordinator owns another.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    inner: Arc<Mutex<Recorded>>,
}

impl RecordingTransport {
    /// Creates an empty recording.
    pub fn new() -> Self {
        Self::default()
    }

    fn recorded(&self) -> MutexGuard<'_, Recorded> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Events delivered to `connection` so far.
    pub fn inbox(&self, connection: &ConnectionId) -> Vec<ServerEvent> {
        self.recorded()
            .inboxes
            .get(connection)
            .cloned()
            .unwrap_or_default()
    }

    /// Drains and returns the events delivered to `connection`.
    pub fn take_inbox(&self, connection: &ConnectionId) -> Vec<ServerEvent> {
        self.recorded()
            .inboxes
            .remove(connection)
            .unwrap_or_default()
    }

    /// Current members of a session's group.
    pub fn group(&self, session: &SessionId) -> Vec<ConnectionId> {
        self.recorded()
            .groups
            .get(session)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Forgets every delivered event, keeping group membership.
    pub fn clear(&self) {
        self.recorded().inboxes.clear();
    }
}

impl Transport for RecordingTransport {
    fn send_to_connection(&self, connection: &ConnectionId, event: &ServerEvent) {
        trace!(%connection, event = event.as_ref(), "Recording direct event");
        self.recorded()
            .inboxes
            .entry(connection.clone())
            .or_default()
            .push(event.clone());
    }

    fn send_to_group(&self, session: &SessionId, event: &ServerEvent) {
        trace!(%session, event = event.as_ref(), "Recording group event");
        let mut recorded = self.recorded();
        let members: Vec<_> = recorded
            .groups
            .get(session)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default();
        for member in members {
            recorded.inboxes.entry(member).or_default().push(event.clone());
        }
    }

    fn add_to_group(&self, connection: &ConnectionId, session: &SessionId) {
        self.recorded()
            .groups
            .entry(session.clone())
            .or_default()
            .insert(connection.clone());
    }

    fn remove_from_group(&self, connection: &ConnectionId, session: &SessionId) {
        let mut recorded = self.recorded();
        if let Some(members) = recorded.groups.get_mut(session) {
            members.remove(connection);
            if members.is_empty() {
                recorded.groups.remove(session);
            }
        }
    }
}
