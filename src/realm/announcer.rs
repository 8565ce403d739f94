//! Realm message of the day.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::broadcast::{BroadcastDispatcher, FanOutReport};
use crate::observability::metrics;
use crate::session::{ChatMessage, Session, SessionError};

/// Holds the realm's message of the day and announces changes.
pub struct RealmAnnouncer {
    motd: ArcSwap<String>,
    dispatcher: BroadcastDispatcher,
}

impl RealmAnnouncer {
    pub fn new(motd: impl Into<String>, dispatcher: BroadcastDispatcher) -> Self {
        Self {
            motd: ArcSwap::from_pointee(motd.into()),
            dispatcher,
        }
    }

    /// Current message of the day.
    pub fn motd(&self) -> Arc<String> {
        self.motd.load_full()
    }

    /// Replace the message of the day and announce it to every connected session.
    ///
    /// The text is stored as given; no validation happens here.
    pub async fn set_motd(&self, message: impl Into<String>) -> FanOutReport {
        let message = Arc::new(message.into());
        self.motd.store(message.clone());
        metrics::record_motd_update();
        tracing::info!(motd = %message, "Realm message of the day updated");

        self.dispatcher.broadcast(ChatMessage::motd(message.as_str())).await
    }

    /// Greet a freshly connected session with the current message of the day.
    pub fn welcome(&self, session: &dyn Session) -> Result<(), SessionError> {
        let motd = self.motd.load();
        if motd.is_empty() {
            return Ok(());
        }
        session.send(ChatMessage::motd(motd.as_str()))
    }
}
