//! The coordinator task.
//!
//! [`spawn_coordinator`] moves a [`Coordinator`] into a single tokio task and
//! feeds it from an unbounded channel. Events from every connection are
//! applied one at a time, each to completion, so no session is ever observed
//! mid-mutation and the coordinator needs no locks.

use crate::coordinator::Coordinator;
use crate::protocol::ClientEvent;
use crate::session::{ConnectionId, Session, SessionId};
use crate::store::SessionStore;
use crate::transport::Transport;
use derive_more::Display;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument};

/// The coordinator task has stopped and accepts no more commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[display("Coordinator is no longer running")]
pub struct CoordinatorStopped;

impl std::error::Error for CoordinatorStopped {}

#[derive(Debug)]
enum Command {
    Event {
        connection: ConnectionId,
        event: ClientEvent,
    },
    Disconnect {
        connection: ConnectionId,
    },
    Inspect {
        id: SessionId,
        reply: oneshot::Sender<Option<Session>>,
    },
    Count {
        reply: oneshot::Sender<usize>,
    },
    Shutdown {
        reply: oneshot::Sender<SessionStore>,
    },
}

/// Cloneable handle to a running coordinator task.
#[derive(Debug, Clone)]
pub struct CoordinatorHandle {
    commands: mpsc::UnboundedSender<Command>,
}

/// Starts the coordinator task on the current tokio runtime.
#[instrument(skip_all)]
pub fn spawn_coordinator<T>(transport: T) -> CoordinatorHandle
where
    T: Transport + Send + 'static,
{
    let (commands, inbox) = mpsc::unbounded_channel();
    let coordinator = Coordinator::new(transport);
    tokio::spawn(run(coordinator, inbox));
    info!("Coordinator task started");
    CoordinatorHandle { commands }
}

impl CoordinatorHandle {
    /// Queues an inbound event from `connection`.
    pub fn submit(
        &self,
        connection: ConnectionId,
        event: ClientEvent,
    ) -> Result<(), CoordinatorStopped> {
        self.send(Command::Event { connection, event })
    }

    /// Queues the disconnect of `connection`.
    pub fn disconnect(&self, connection: ConnectionId) -> Result<(), CoordinatorStopped> {
        self.send(Command::Disconnect { connection })
    }

    /// Copy of a session once every previously queued event has been applied.
    pub async fn inspect(&self, id: SessionId) -> Result<Option<Session>, CoordinatorStopped> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Inspect { id, reply })?;
        response.await.map_err(|_| CoordinatorStopped)
    }

    /// Number of live sessions once every previously queued event has been
    /// applied.
    pub async fn session_count(&self) -> Result<usize, CoordinatorStopped> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Count { reply })?;
        response.await.map_err(|_| CoordinatorStopped)
    }

    /// Stops the task after draining queued commands and returns the store.
    ///
    /// Other handles see [`CoordinatorStopped`] afterwards.
    pub async fn shutdown(self) -> Result<SessionStore, CoordinatorStopped> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Shutdown { reply })?;
        response.await.map_err(|_| CoordinatorStopped)
    }

    fn send(&self, command: Command) -> Result<(), CoordinatorStopped> {
        self.commands.send(command).map_err(|_| CoordinatorStopped)
    }
}

async fn run<T: Transport>(
    mut coordinator: Coordinator<T>,
    mut inbox: mpsc::UnboundedReceiver<Command>,
) {
    while let Some(command) = inbox.recv().await {
        match command {
            Command::Event { connection, event } => {
                let name = event.as_ref().to_string();
                if let Err(reason) = coordinator.handle(&connection, event) {
                    debug!(%connection, event = %name, %reason, "Event dropped");
                }
            }
            Command::Disconnect { connection } => {
                coordinator.disconnect(&connection);
            }
            Command::Inspect { id, reply } => {
                let _ = reply.send(coordinator.store().get(id.as_str()).cloned());
            }
            Command::Count { reply } => {
                let _ = reply.send(coordinator.store().len());
            }
            Command::Shutdown { reply } => {
                info!(sessions = coordinator.store().len(), "Coordinator shutting down");
                let _ = reply.send(coordinator.into_store());
                return;
            }
        }
    }
    info!("All coordinator handles dropped, task exiting");
}
