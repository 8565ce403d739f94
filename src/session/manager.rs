//! In-process session registry backing the WebSocket transport.
//!
//! # Responsibilities
//! - Admit sessions up to `max_sessions`
//! - Hand each connection a bounded outbound queue
//! - Remove sessions when their connection task ends (RAII guard)

use std::net::SocketAddr;
use std::ops::Deref;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::sync::{mpsc, Notify};

use crate::config::ListenerConfig;
use crate::observability::metrics;
use crate::session::message::ChatMessage;
use crate::session::registry::{RegistryError, Session, SessionError, SessionId, SessionRef, SessionRegistry};

/// A connected game client.
#[derive(Debug)]
pub struct WorldSession {
    id: SessionId,
    peer: SocketAddr,
    connected_at: Instant,
    outbound: mpsc::Sender<ChatMessage>,
    kick: Notify,
}

impl WorldSession {
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub fn connected_for(&self) -> Duration {
        self.connected_at.elapsed()
    }

    /// Resolves once [`Session::disconnect`] has been requested.
    pub async fn kicked(&self) {
        self.kick.notified().await;
    }
}

impl Session for WorldSession {
    fn id(&self) -> SessionId {
        self.id
    }

    fn send(&self, message: ChatMessage) -> Result<(), SessionError> {
        self.outbound.try_send(message).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SessionError::QueueFull(self.id),
            mpsc::error::TrySendError::Closed(_) => SessionError::Closed(self.id),
        })
    }

    fn disconnect(&self) -> Result<(), SessionError> {
        if self.outbound.is_closed() {
            return Err(SessionError::Closed(self.id));
        }
        // Stores a permit, so a kick issued before the connection task polls is not lost.
        self.kick.notify_one();
        Ok(())
    }
}

/// Registry of live [`WorldSession`]s.
#[derive(Debug)]
pub struct SessionManager {
    sessions: DashMap<SessionId, Arc<WorldSession>>,
    max_sessions: usize,
    outbound_buffer: usize,
}

impl SessionManager {
    pub fn new(config: &ListenerConfig) -> Self {
        Self {
            sessions: DashMap::new(),
            max_sessions: config.max_sessions,
            outbound_buffer: config.outbound_buffer.max(1),
        }
    }

    /// Register a new session for `peer`.
    ///
    /// The session stays registered while the returned guard is alive; the
    /// receiver yields the messages queued for it.
    pub fn open(
        self: &Arc<Self>,
        peer: SocketAddr,
    ) -> Result<(SessionGuard, mpsc::Receiver<ChatMessage>), RegistryError> {
        if self.sessions.len() >= self.max_sessions {
            return Err(RegistryError::AtCapacity(self.max_sessions));
        }

        let (outbound, rx) = mpsc::channel(self.outbound_buffer);
        let session = Arc::new(WorldSession {
            id: SessionId::next(),
            peer,
            connected_at: Instant::now(),
            outbound,
            kick: Notify::new(),
        });

        self.sessions.insert(session.id, session.clone());
        metrics::record_active_sessions(self.sessions.len());
        tracing::debug!(session = %session.id, peer = %peer, "Session registered");

        Ok((
            SessionGuard {
                manager: self.clone(),
                session,
            },
            rx,
        ))
    }

    /// Concrete snapshot, for operator listings.
    pub fn world_sessions(&self) -> Vec<Arc<WorldSession>> {
        self.sessions.iter().map(|entry| entry.value().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn remove(&self, id: SessionId) {
        if self.sessions.remove(&id).is_some() {
            metrics::record_active_sessions(self.sessions.len());
            tracing::debug!(session = %id, "Session unregistered");
        }
    }
}

impl SessionRegistry for SessionManager {
    fn sessions(&self) -> Result<Vec<SessionRef>, RegistryError> {
        Ok(self
            .sessions
            .iter()
            .map(|entry| entry.value().clone() as SessionRef)
            .collect())
    }
}

/// Keeps a session registered for the lifetime of its connection.
#[derive(Debug)]
pub struct SessionGuard {
    manager: Arc<SessionManager>,
    session: Arc<WorldSession>,
}

impl Deref for SessionGuard {
    type Target = WorldSession;
    fn deref(&self) -> &Self::Target {
        &self.session
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.manager.remove(self.session.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(max_sessions: usize) -> Arc<SessionManager> {
        Arc::new(SessionManager::new(&ListenerConfig {
            max_sessions,
            outbound_buffer: 2,
            ..ListenerConfig::default()
        }))
    }

    fn peer() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    #[tokio::test]
    async fn test_guard_unregisters_on_drop() {
        let sessions = manager(10);
        let (guard, _rx) = sessions.open(peer()).unwrap();
        let id = guard.id();

        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions.world_sessions()[0].id(), id);

        drop(guard);
        assert!(sessions.is_empty());
        assert!(sessions.world_sessions().is_empty());
    }

    #[tokio::test]
    async fn test_capacity_is_enforced() {
        let sessions = manager(1);
        let (_guard, _rx) = sessions.open(peer()).unwrap();
        let err = sessions.open(peer()).unwrap_err();
        assert_eq!(err, RegistryError::AtCapacity(1));
    }

    #[tokio::test]
    async fn test_send_reports_full_and_closed_queues() {
        let sessions = manager(10);
        let (guard, rx) = sessions.open(peer()).unwrap();
        let id = guard.id();

        guard.send(ChatMessage::system("one")).unwrap();
        guard.send(ChatMessage::system("two")).unwrap();
        assert_eq!(
            guard.send(ChatMessage::system("three")),
            Err(SessionError::QueueFull(id))
        );

        drop(rx);
        assert_eq!(guard.send(ChatMessage::system("four")), Err(SessionError::Closed(id)));
        assert_eq!(guard.disconnect(), Err(SessionError::Closed(id)));
    }

    #[tokio::test]
    async fn test_disconnect_before_wait_is_not_lost() {
        let sessions = manager(10);
        let (guard, _rx) = sessions.open(peer()).unwrap();

        guard.disconnect().unwrap();
        tokio::time::timeout(Duration::from_secs(1), guard.kicked())
            .await
            .expect("kick should already be pending");
    }

    #[tokio::test]
    async fn test_snapshot_is_detached_from_registry() {
        let sessions = manager(10);
        let (first, _rx1) = sessions.open(peer()).unwrap();
        let (_second, _rx2) = sessions.open(peer()).unwrap();

        let snapshot = sessions.sessions().unwrap();
        drop(first);

        assert_eq!(snapshot.len(), 2);
        assert_eq!(sessions.len(), 1);
    }
}
