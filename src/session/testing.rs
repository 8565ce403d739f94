//! In-memory sessions and registries for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::session::message::ChatMessage;
use crate::session::registry::{RegistryError, Session, SessionError, SessionId, SessionRef, SessionRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Healthy,
    /// Every operation returns `SessionError::Closed`.
    Closed,
    /// Every operation panics.
    Panics,
}

/// Records everything sent to it.
pub struct RecordingSession {
    id: SessionId,
    behavior: Behavior,
    received: Mutex<Vec<ChatMessage>>,
    disconnected: AtomicBool,
}

impl RecordingSession {
    pub fn new() -> Arc<Self> {
        Self::with_behavior(Behavior::Healthy)
    }

    pub fn with_behavior(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            id: SessionId::next(),
            behavior,
            received: Mutex::new(Vec::new()),
            disconnected: AtomicBool::new(false),
        })
    }

    pub fn received(&self) -> Vec<ChatMessage> {
        self.received.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.received().into_iter().map(|m| m.text).collect()
    }

    pub fn is_disconnected(&self) -> bool {
        self.disconnected.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), SessionError> {
        match self.behavior {
            Behavior::Healthy => Ok(()),
            Behavior::Closed => Err(SessionError::Closed(self.id)),
            Behavior::Panics => panic!("{} exploded", self.id),
        }
    }
}

impl Session for RecordingSession {
    fn id(&self) -> SessionId {
        self.id
    }

    fn send(&self, message: ChatMessage) -> Result<(), SessionError> {
        self.check()?;
        self.received.lock().unwrap().push(message);
        Ok(())
    }

    fn disconnect(&self) -> Result<(), SessionError> {
        self.check()?;
        self.disconnected.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Registry over a mutable list with scripted enumeration failures.
#[derive(Default)]
pub struct StaticRegistry {
    sessions: Mutex<Vec<SessionRef>>,
    /// One entry per upcoming `sessions()` call; `None` lets it succeed.
    plan: Mutex<VecDeque<Option<RegistryError>>>,
}

impl StaticRegistry {
    pub fn new(sessions: Vec<SessionRef>) -> Arc<Self> {
        Arc::new(Self {
            sessions: Mutex::new(sessions),
            plan: Mutex::new(VecDeque::new()),
        })
    }

    pub fn push(&self, session: SessionRef) {
        self.sessions.lock().unwrap().push(session);
    }

    pub fn fail_next(&self, error: RegistryError) {
        self.plan.lock().unwrap().push_back(Some(error));
    }

    pub fn succeed_next(&self) {
        self.plan.lock().unwrap().push_back(None);
    }
}

impl SessionRegistry for StaticRegistry {
    fn sessions(&self) -> Result<Vec<SessionRef>, RegistryError> {
        if let Some(Some(error)) = self.plan.lock().unwrap().pop_front() {
            return Err(error);
        }
        Ok(self.sessions.lock().unwrap().clone())
    }
}
