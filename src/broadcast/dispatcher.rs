//! Per-session fan-out.
//!
//! # Responsibilities
//! - Run one task per session for a send or disconnect
//! - Isolate failures (errors and panics) to the session they hit
//! - Summarize the outcome for logs and metrics

use std::sync::Arc;

use tokio::task::JoinSet;

use crate::observability::metrics;
use crate::session::{ChatMessage, RegistryError, Session, SessionError, SessionRef, SessionRegistry};

/// Outcome of one fan-out pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanOutReport {
    /// Sessions the operation succeeded on.
    pub succeeded: usize,
    /// Sessions that had already closed.
    pub gone: usize,
    /// Sessions that errored or whose task panicked.
    pub failed: usize,
}

impl FanOutReport {
    pub fn total(&self) -> usize {
        self.succeeded + self.gone + self.failed
    }
}

/// Apply `op` to every session concurrently, one task per session.
///
/// Waits for every task so the caller observes a complete report; a failure in
/// one task never affects the others.
pub async fn fan_out<F>(kind: &'static str, sessions: Vec<SessionRef>, op: F) -> FanOutReport
where
    F: Fn(&dyn Session) -> Result<(), SessionError> + Clone + Send + 'static,
{
    let mut tasks = JoinSet::new();
    for session in sessions {
        let op = op.clone();
        tasks.spawn(async move { op(session.as_ref()) });
    }

    let mut report = FanOutReport::default();
    while let Some(result) = tasks.join_next().await {
        match result {
            Ok(Ok(())) => report.succeeded += 1,
            Ok(Err(SessionError::Closed(id))) => {
                tracing::debug!(kind, session = %id, "Session closed before fan-out reached it");
                report.gone += 1;
            }
            Ok(Err(e)) => {
                tracing::warn!(kind, error = %e, "Fan-out to session failed");
                report.failed += 1;
            }
            Err(e) => {
                tracing::error!(kind, error = %e, "Fan-out task aborted");
                report.failed += 1;
            }
        }
    }

    metrics::record_fan_out(kind, &report);
    report
}

/// Delivers chat messages to every live session.
#[derive(Clone)]
pub struct BroadcastDispatcher {
    registry: Arc<dyn SessionRegistry>,
}

impl BroadcastDispatcher {
    pub fn new(registry: Arc<dyn SessionRegistry>) -> Self {
        Self { registry }
    }

    /// Fresh snapshot of the registry.
    pub fn snapshot(&self) -> Result<Vec<SessionRef>, RegistryError> {
        self.registry.sessions()
    }

    /// Send `message` to every session currently registered.
    ///
    /// Fire-and-forget per session: nothing is retried and no error reaches
    /// the caller.
    pub async fn broadcast(&self, message: ChatMessage) -> FanOutReport {
        match self.snapshot() {
            Ok(sessions) => self.deliver(sessions, message).await,
            Err(e) => {
                tracing::warn!(error = %e, "Broadcast skipped: session enumeration failed");
                FanOutReport::default()
            }
        }
    }

    /// Send `message` to the given snapshot.
    pub async fn deliver(&self, sessions: Vec<SessionRef>, message: ChatMessage) -> FanOutReport {
        let recipients = sessions.len();
        let report = fan_out("broadcast", sessions, move |session: &dyn Session| {
            session.send(message.clone())
        })
        .await;

        tracing::debug!(
            recipients,
            delivered = report.succeeded,
            gone = report.gone,
            failed = report.failed,
            "Broadcast delivered"
        );
        report
    }
}
