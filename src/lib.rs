//! Strictly Relay - realtime session coordinator for two-player tic-tac-toe.
//!
//! Clients connect over a WebSocket, join a session by id and exchange moves.
//! The relay is the single source of truth for every session.
//!
//! # Architecture
//!
//! - **Store**: in-memory registry of sessions plus a connection index
//! - **Coordinator**: the join/leave/move/restart state machine
//! - **Runtime**: one task that applies events one at a time
//! - **Server**: axum WebSocket transport
//!
//! # Example
//!
//! ```
//! use strictly_relay::{ClientEvent, Coordinator, RecordingTransport, ServerEvent};
//!
//! let transport = RecordingTransport::new();
//! let mut coordinator = Coordinator::new(transport.clone());
//!
//! coordinator.handle(&"x".into(), ClientEvent::JoinGame("g1".into())).unwrap();
//! coordinator.handle(&"o".into(), ClientEvent::JoinGame("g1".into())).unwrap();
//!
//! assert!(matches!(
//!     transport.inbox(&"x".into()).as_slice(),
//!     [ServerEvent::GameStart { .. }]
//! ));
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod coordinator;
mod error;
mod protocol;
mod runtime;
mod server;
mod session;
mod store;
mod transport;

// Crate-level exports - Configuration
pub use config::{ConfigError, RelayConfig};

// Crate-level exports - Protocol
pub use coordinator::Coordinator;
pub use error::RelayError;
pub use protocol::{ClientEvent, GameOutcome, MoveRequest, ServerEvent};

// Crate-level exports - Sessions
pub use session::{
    Admission, ConnectionId, MAX_PLAYERS, MoveRecord, Phase, Session, SessionId, Verdict,
};
pub use store::{Release, SessionStore, StoreEntry};

// Crate-level exports - Runtime and transport
pub use runtime::{CoordinatorHandle, CoordinatorStopped, spawn_coordinator};
pub use server::{AppState, Health, WsTransport, router, serve};
pub use transport::{RecordingTransport, Transport};

// Crate-level exports - Board types
pub use strictly_tictactoe::{Board, Cell, InvalidMove, Seat};
