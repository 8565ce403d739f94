//! Mass disconnect and process termination.
//!
//! # Sequence
//! ```text
//! "Realm is shutting down now."          (broadcast)
//!     → snapshot registry → disconnect every session (one task each)
//! "All users have been disconnected."    (broadcast, always reached)
//!     → phase = Terminating
//!     → after grace delay: "Realm Shutdown." (log) → exit(0)
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::broadcast::{fan_out, BroadcastDispatcher};
use crate::lifecycle::state::{ShutdownPhase, ShutdownSession};
use crate::session::{ChatMessage, RegistryError, Session};

pub const SHUTTING_DOWN_NOW: &str = "Realm is shutting down now.";
pub const ALL_DISCONNECTED: &str = "All users have been disconnected.";
pub const REALM_SHUTDOWN: &str = "Realm Shutdown.";

/// Final step of a realm shutdown.
pub trait Terminate: Send + Sync + 'static {
    fn terminate(&self);
}

/// Exits the process with a success status.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExit;

impl Terminate for ProcessExit {
    fn terminate(&self) {
        std::process::exit(0);
    }
}

/// Releases every session, then ends the process after a grace delay.
#[derive(Clone)]
pub struct ShutdownExecutor {
    session: ShutdownSession,
    dispatcher: BroadcastDispatcher,
    terminator: Arc<dyn Terminate>,
    grace: Duration,
}

impl ShutdownExecutor {
    pub fn new(
        session: ShutdownSession,
        dispatcher: BroadcastDispatcher,
        terminator: Arc<dyn Terminate>,
        grace: Duration,
    ) -> Self {
        Self {
            session,
            dispatcher,
            terminator,
            grace,
        }
    }

    /// Disconnect every session and arm process termination.
    ///
    /// Enumeration and disconnect failures are logged and never stop the
    /// sequence. Returns the handle of the armed termination timer.
    pub async fn disconnect(&self) -> JoinHandle<()> {
        self.session.set_phase(ShutdownPhase::Disconnecting);

        tracing::info!("{SHUTTING_DOWN_NOW}");
        self.dispatcher.broadcast(ChatMessage::system(SHUTTING_DOWN_NOW)).await;

        match self.dispatcher.snapshot() {
            Ok(sessions) => {
                let count = sessions.len();
                let report = fan_out("disconnect", sessions, |session: &dyn Session| session.disconnect()).await;
                tracing::info!(
                    sessions = count,
                    disconnected = report.succeeded,
                    gone = report.gone,
                    failed = report.failed,
                    "Disconnect pass complete"
                );
            }
            Err(RegistryError::ConcurrentModification) => {
                tracing::debug!("Session set changed during disconnect pass");
            }
            Err(e) => {
                tracing::error!(error = %e, "Disconnect pass failed");
            }
        }

        tracing::info!("{ALL_DISCONNECTED}");
        self.dispatcher.broadcast(ChatMessage::system(ALL_DISCONNECTED)).await;

        self.session.set_phase(ShutdownPhase::Terminating);
        self.arm_termination()
    }

    fn arm_termination(&self) -> JoinHandle<()> {
        let terminator = self.terminator.clone();
        let grace = self.grace;
        tracing::info!(grace_secs = grace.as_secs(), "Process termination armed");

        tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            tracing::info!("{REALM_SHUTDOWN}");
            terminator.terminate();
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::session::testing::{Behavior, RecordingSession, StaticRegistry};
    use crate::session::{SessionError, SessionId, SessionRef};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts terminate calls instead of exiting.
    #[derive(Default)]
    pub(crate) struct CountingTerminator {
        calls: AtomicUsize,
    }

    impl CountingTerminator {
        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Terminate for CountingTerminator {
        fn terminate(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Registers a newcomer in the registry while being disconnected.
    struct Mutator {
        id: SessionId,
        registry: Arc<StaticRegistry>,
        newcomer: SessionRef,
    }

    impl Session for Mutator {
        fn id(&self) -> SessionId {
            self.id
        }

        fn send(&self, _message: ChatMessage) -> Result<(), SessionError> {
            Ok(())
        }

        fn disconnect(&self) -> Result<(), SessionError> {
            self.registry.push(self.newcomer.clone());
            Ok(())
        }
    }

    fn executor(registry: Arc<StaticRegistry>) -> (ShutdownExecutor, ShutdownSession, Arc<CountingTerminator>) {
        let session = ShutdownSession::new();
        let terminator = Arc::new(CountingTerminator::default());
        let executor = ShutdownExecutor::new(
            session.clone(),
            BroadcastDispatcher::new(registry),
            terminator.clone(),
            Duration::from_secs(15),
        );
        (executor, session, terminator)
    }

    #[tokio::test(start_paused = true)]
    async fn test_disconnects_everyone_then_terminates_after_grace() {
        let sessions: Vec<_> = (0..3).map(|_| RecordingSession::new()).collect();
        let registry = StaticRegistry::new(sessions.iter().map(|s| s.clone() as SessionRef).collect());
        let (executor, state, terminator) = executor(registry);

        let timer = executor.disconnect().await;

        assert_eq!(state.phase(), ShutdownPhase::Terminating);
        for session in &sessions {
            assert!(session.is_disconnected());
            assert_eq!(session.texts(), vec![SHUTTING_DOWN_NOW, ALL_DISCONNECTED]);
        }

        tokio::time::sleep(Duration::from_millis(14_900)).await;
        assert_eq!(terminator.calls(), 0);

        timer.await.unwrap();
        assert_eq!(terminator.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_completes_when_enumeration_sees_concurrent_change() {
        let session = RecordingSession::new();
        let registry = StaticRegistry::new(vec![session.clone() as SessionRef]);
        let (executor, state, terminator) = executor(registry.clone());

        // "now" broadcast enumerates fine, the disconnect pass does not.
        registry.succeed_next();
        registry.fail_next(RegistryError::ConcurrentModification);
        let timer = executor.disconnect().await;

        assert!(!session.is_disconnected());
        assert_eq!(session.texts(), vec![SHUTTING_DOWN_NOW, ALL_DISCONNECTED]);
        assert_eq!(state.phase(), ShutdownPhase::Terminating);

        timer.await.unwrap();
        assert_eq!(terminator.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_completes_when_session_set_changes_mid_pass() {
        let newcomer = RecordingSession::new();
        let registry = StaticRegistry::new(Vec::new());
        let mutator: SessionRef = Arc::new(Mutator {
            id: SessionId::next(),
            registry: registry.clone(),
            newcomer: newcomer.clone(),
        });
        let departed = RecordingSession::with_behavior(Behavior::Closed);
        let stayed = RecordingSession::new();
        registry.push(mutator);
        registry.push(departed);
        registry.push(stayed.clone());

        let (executor, state, _terminator) = executor(registry);
        executor.disconnect().await;

        assert!(stayed.is_disconnected());
        assert_eq!(stayed.texts(), vec![SHUTTING_DOWN_NOW, ALL_DISCONNECTED]);
        // Joined after the snapshot: not disconnected, but told the pass is over.
        assert!(!newcomer.is_disconnected());
        assert_eq!(newcomer.texts(), vec![ALL_DISCONNECTED]);
        assert_eq!(state.phase(), ShutdownPhase::Terminating);
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_enumeration_errors_do_not_abort() {
        let registry = StaticRegistry::new(Vec::new());
        let (executor, state, terminator) = executor(registry.clone());

        registry.succeed_next();
        registry.fail_next(RegistryError::Unavailable("registry offline".into()));
        let timer = executor.disconnect().await;
        assert_eq!(state.phase(), ShutdownPhase::Terminating);

        timer.await.unwrap();
        assert_eq!(terminator.calls(), 1);
    }
}
