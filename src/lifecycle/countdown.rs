//! Realm shutdown countdown.
//!
//! # Responsibilities
//! - Start (or restart) a countdown towards a target instant
//! - Run the single ticker task that re-arms its own delay every tick
//! - Broadcast one warning per tick, then hand over to the executor
//!
//! # Design Decisions
//! - Starts are serialized on the ticker slot; the latest start owns the
//!   only live ticker and every older one stops at its next tick
//! - Expiry moves the phase to `Disconnecting` under the same lock that
//!   decided it, so no start can slip in between
//! - The disconnect sequence runs in its own task, never inside a ticker
//! - No cancellation path: a countdown ends at its target or with the process

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::broadcast::BroadcastDispatcher;
use crate::config::ShutdownConfig;
use crate::lifecycle::cadence::{self, Tick};
use crate::lifecycle::executor::ShutdownExecutor;
use crate::lifecycle::state::{ShutdownError, ShutdownPhase, ShutdownSession, ShutdownStatus};
use crate::session::ChatMessage;

/// Longest countdown honoured; larger requests are clamped to it.
pub const MAX_COUNTDOWN: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Drives the warning cadence of a realm shutdown.
#[derive(Clone)]
pub struct CountdownScheduler {
    inner: Arc<Inner>,
}

struct Inner {
    session: ShutdownSession,
    dispatcher: BroadcastDispatcher,
    executor: ShutdownExecutor,
    timings: ShutdownConfig,
    ticker: Mutex<Option<JoinHandle<()>>>,
}

impl CountdownScheduler {
    pub fn new(
        session: ShutdownSession,
        dispatcher: BroadcastDispatcher,
        executor: ShutdownExecutor,
        timings: ShutdownConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                session,
                dispatcher,
                executor,
                timings,
                ticker: Mutex::new(None),
            }),
        }
    }

    /// Shut the realm down `seconds` from now.
    ///
    /// Replaces a countdown that is still running. Fails once sessions are
    /// already being disconnected.
    pub fn start_shutdown(&self, seconds: u64) -> Result<ShutdownStatus, ShutdownError> {
        let mut delay = Duration::from_secs(seconds);
        if delay > MAX_COUNTDOWN {
            tracing::warn!(seconds, max_secs = MAX_COUNTDOWN.as_secs(), "Clamping realm shutdown delay");
            delay = MAX_COUNTDOWN;
        }
        let target = Instant::now() + delay;

        // Held until the new ticker is installed so concurrent starts install
        // their tickers in the order their targets were accepted.
        let mut slot = self.inner.ticker.lock().expect("ticker mutex poisoned");
        let begun = self.inner.session.begin(target, self.inner.timings.initial_tick())?;

        if let Some(previous) = begun.replaced {
            let previous_secs = previous.saturating_duration_since(Instant::now()).as_secs();
            tracing::warn!(previous_secs, seconds = delay.as_secs(), "Replacing pending realm shutdown");
        }
        tracing::info!(seconds = delay.as_secs(), "Realm is shutting down in {} seconds.", delay.as_secs());

        let ticker = tokio::spawn(run(self.inner.clone(), begun.generation));
        if let Some(previous) = slot.replace(ticker) {
            previous.abort();
        }
        drop(slot);

        Ok(self.inner.session.status())
    }

    pub fn status(&self) -> ShutdownStatus {
        self.inner.session.status()
    }

    pub fn phase(&self) -> ShutdownPhase {
        self.inner.session.phase()
    }
}

async fn run(inner: Arc<Inner>, generation: u64) {
    loop {
        let interval = inner.session.update(|state| state.tick_interval);
        tokio::time::sleep(interval).await;
        if !inner.tick(generation).await {
            break;
        }
    }
}

impl Inner {
    /// One countdown evaluation for the countdown started as `generation`.
    /// Returns false once ticking should stop.
    async fn tick(&self, generation: u64) -> bool {
        let decision = self.session.update(|state| {
            if state.phase != ShutdownPhase::Counting || state.generation != generation {
                return None;
            }
            let decision = cadence::evaluate(state.remaining(Instant::now()), state.tick_interval, &self.timings);
            match &decision {
                Tick::Expired => state.enter(ShutdownPhase::Disconnecting),
                Tick::Warn { interval, .. } => state.tick_interval = *interval,
            }
            Some(decision)
        });

        match decision {
            None => false,
            Some(Tick::Expired) => {
                tracing::info!("Realm shutdown countdown expired");
                // Aborting this ticker must not cut the disconnect short.
                let executor = self.executor.clone();
                tokio::spawn(async move {
                    let _termination = executor.disconnect().await;
                });
                false
            }
            Some(Tick::Warn { interval, rearm, phrase }) => {
                if rearm {
                    tracing::debug!(interval_secs = interval.as_secs(), "Countdown cadence changed");
                }
                let text = cadence::warning_text(&phrase);
                tracing::info!("{text}");
                self.dispatcher.broadcast(ChatMessage::system(text)).await;
                true
            }
        }
    }
}
