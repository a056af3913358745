//! WebSocket transport and HTTP routes.
//!
//! Each socket gets a fresh [`ConnectionId`] and an outbound queue drained
//! by a writer task. Text frames are parsed as [`ClientEvent`]s and handed
//! to the coordinator task; closing the socket disconnects the connection.

use crate::protocol::{ClientEvent, ServerEvent};
use crate::runtime::CoordinatorHandle;
use crate::session::{ConnectionId, SessionId};
use crate::transport::Transport;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use derive_new::new;
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Default)]
struct Connections {
    outboxes: HashMap<ConnectionId, mpsc::UnboundedSender<ServerEvent>>,
    groups: HashMap<SessionId, BTreeSet<ConnectionId>>,
}

/// [`Transport`] over live WebSocket connections.
#[derive(Debug, Default)]
pub struct WsTransport {
    connections: Mutex<Connections>,
    next_id: AtomicU64,
}

impl WsTransport {
    /// Creates a transport with no connections.
    pub fn new() -> Self {
        Self::default()
    }

    fn connections(&self) -> MutexGuard<'_, Connections> {
        self.connections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a new connection, returning its id and outbound queue.
    #[instrument(skip(self))]
    pub fn register(&self) -> (ConnectionId, mpsc::UnboundedReceiver<ServerEvent>) {
        let serial = self.next_id.fetch_add(1, Ordering::Relaxed);
        let connection = ConnectionId::from(format!("conn-{serial}"));
        let (outbox, queue) = mpsc::unbounded_channel();
        self.connections()
            .outboxes
            .insert(connection.clone(), outbox);
        info!(%connection, "Connection registered");
        (connection, queue)
    }

    /// Drops a connection's queue and all of its group memberships.
    #[instrument(skip(self), fields(connection = %connection))]
    pub fn unregister(&self, connection: &ConnectionId) {
        let mut connections = self.connections();
        connections.outboxes.remove(connection);
        connections.groups.retain(|_, members| {
            members.remove(connection);
            !members.is_empty()
        });
        info!("Connection unregistered");
    }

    /// Number of open connections.
    pub fn connection_count(&self) -> usize {
        self.connections().outboxes.len()
    }

    fn deliver(outbox: Option<&mpsc::UnboundedSender<ServerEvent>>, event: &ServerEvent) {
        if let Some(outbox) = outbox
            && outbox.send(event.clone()).is_err()
        {
            debug!(event = event.as_ref(), "Outbox closed, event discarded");
        }
    }
}

impl Transport for WsTransport {
    fn send_to_connection(&self, connection: &ConnectionId, event: &ServerEvent) {
        let connections = self.connections();
        Self::deliver(connections.outboxes.get(connection), event);
    }

    fn send_to_group(&self, session: &SessionId, event: &ServerEvent) {
        let connections = self.connections();
        let Some(members) = connections.groups.get(session) else {
            return;
        };
        for member in members {
            Self::deliver(connections.outboxes.get(member), event);
        }
    }

    fn add_to_group(&self, connection: &ConnectionId, session: &SessionId) {
        self.connections()
            .groups
            .entry(session.clone())
            .or_default()
            .insert(connection.clone());
    }

    fn remove_from_group(&self, connection: &ConnectionId, session: &SessionId) {
        let mut connections = self.connections();
        if let Some(members) = connections.groups.get_mut(session) {
            members.remove(connection);
            if members.is_empty() {
                connections.groups.remove(session);
            }
        }
    }
}

/// Shared state behind the HTTP routes.
#[derive(Debug, Clone, new)]
pub struct AppState {
    coordinator: CoordinatorHandle,
    transport: Arc<WsTransport>,
}

/// Response body of `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct Health {
    /// Always `"ok"` when the coordinator answers.
    pub status: &'static str,
    /// Live sessions.
    pub sessions: usize,
    /// Open WebSocket connections.
    pub connections: usize,
}

/// Builds the router: `GET /ws` and `GET /health`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ws", get(upgrade))
        .route("/health", get(health))
        .with_state(state)
}

/// Serves the router on `listener` until `shutdown` resolves.
#[instrument(skip_all)]
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let address = listener.local_addr()?;
    info!(%address, "Relay listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

async fn upgrade(socket: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    socket.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn health(State(state): State<AppState>) -> Result<Json<Health>, StatusCode> {
    let sessions = state
        .coordinator
        .session_count()
        .await
        .map_err(|_| StatusCode::SERVICE_UNAVAILABLE)?;
    Ok(Json(Health {
        status: "ok",
        sessions,
        connections: state.transport.connection_count(),
    }))
}

#[instrument(skip_all)]
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (connection, mut queue) = state.transport.register();
    let (mut sink, mut stream) = socket.split();

    let writer = tokio::spawn(async move {
        while let Some(event) = queue.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(err) => {
                    warn!(error = %err, "Failed to encode outbound event");
                    continue;
                }
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(frame) = stream.next().await {
        let text = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(err) => {
                debug!(%connection, error = %err, "Socket read failed");
                break;
            }
        };

        match serde_json::from_str::<ClientEvent>(text.as_str()) {
            Ok(event) => {
                if state.coordinator.submit(connection.clone(), event).is_err() {
                    warn!(%connection, "Coordinator stopped, closing socket");
                    break;
                }
            }
            Err(err) => {
                warn!(%connection, error = %err, "Ignoring malformed frame");
            }
        }
    }

    if state.coordinator.disconnect(connection.clone()).is_err() {
        debug!(%connection, "Coordinator already stopped");
    }
    state.transport.unregister(&connection);
    writer.abort();
    info!(%connection, "Connection closed");
}
