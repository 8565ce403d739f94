//! Session capabilities required by the broadcast and shutdown paths.
//!
//! The registry is the sole owner of sessions. Callers only ever hold the
//! snapshot returned by [`SessionRegistry::sessions`] for the duration of one
//! operation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use thiserror::Error;

use crate::session::message::ChatMessage;

/// Global atomic counter for session IDs.
static SESSION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    /// Allocate the next session ID.
    pub fn next() -> Self {
        Self(SESSION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// Failure acting on a single session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The session's connection has already ended.
    #[error("{0} is closed")]
    Closed(SessionId),

    /// The session is not draining its outbound queue.
    #[error("{0} outbound queue is full")]
    QueueFull(SessionId),
}

/// Failure enumerating or admitting sessions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The session set changed while it was being enumerated.
    #[error("session set changed during enumeration")]
    ConcurrentModification,

    /// The registry refuses new sessions.
    #[error("session limit of {0} reached")]
    AtCapacity(usize),

    #[error("session registry unavailable: {0}")]
    Unavailable(String),
}

/// A live client connection.
pub trait Session: Send + Sync + 'static {
    fn id(&self) -> SessionId;

    /// Queue a chat message for delivery. Never waits on the network.
    fn send(&self, message: ChatMessage) -> Result<(), SessionError>;

    /// Ask the connection to close.
    fn disconnect(&self) -> Result<(), SessionError>;
}

/// Shared reference to a session taken from a registry snapshot.
pub type SessionRef = Arc<dyn Session>;

/// Owner of the live session set.
pub trait SessionRegistry: Send + Sync + 'static {
    /// Snapshot of the sessions live at the time of the call.
    fn sessions(&self) -> Result<Vec<SessionRef>, RegistryError>;
}
