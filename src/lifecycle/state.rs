//! Realm shutdown state machine.
//!
//! # States
//! ```text
//! Idle → Counting → Disconnecting → Terminating → (process exit)
//!          ↺ start_shutdown while Counting replaces the target
//! ```
//!
//! One `ShutdownSession` exists per process; the scheduler and the executor
//! share it by cloning the handle.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::time::Instant;

use crate::observability::metrics;

/// Stage of a realm shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShutdownPhase {
    #[default]
    Idle,
    Counting,
    Disconnecting,
    Terminating,
}

impl ShutdownPhase {
    /// True once sessions are being (or have been) released.
    pub fn is_final(&self) -> bool {
        matches!(self, ShutdownPhase::Disconnecting | ShutdownPhase::Terminating)
    }
}

impl std::fmt::Display for ShutdownPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ShutdownPhase::Idle => "idle",
            ShutdownPhase::Counting => "counting",
            ShutdownPhase::Disconnecting => "disconnecting",
            ShutdownPhase::Terminating => "terminating",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShutdownError {
    #[error("realm shutdown is already {0}")]
    Underway(ShutdownPhase),
}

/// Mutable shutdown bookkeeping.
#[derive(Debug, Default)]
pub struct ShutdownState {
    pub target: Option<Instant>,
    pub phase: ShutdownPhase,
    pub tick_interval: Duration,
    /// Bumped by every accepted start; a ticker only acts for its own.
    pub generation: u64,
}

/// An accepted `begin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Begun {
    pub generation: u64,
    /// Target of the countdown this one replaced.
    pub replaced: Option<Instant>,
}

impl ShutdownState {
    pub fn enter(&mut self, phase: ShutdownPhase) {
        self.phase = phase;
        metrics::record_shutdown_phase(phase);
    }

    /// Time left until the target, zero once it has passed.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.target
            .map(|target| target.saturating_duration_since(now))
            .unwrap_or_default()
    }
}

/// Read-only view of the shutdown state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShutdownStatus {
    pub phase: ShutdownPhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tick_interval_secs: Option<u64>,
}

/// Shared handle to the process-wide shutdown state.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSession {
    state: Arc<Mutex<ShutdownState>>,
}

impl ShutdownSession {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ShutdownState> {
        self.state.lock().expect("shutdown state mutex poisoned")
    }

    pub fn phase(&self) -> ShutdownPhase {
        self.lock().phase
    }

    pub fn status(&self) -> ShutdownStatus {
        let state = self.lock();
        match state.phase {
            ShutdownPhase::Idle => ShutdownStatus {
                phase: state.phase,
                remaining_secs: None,
                tick_interval_secs: None,
            },
            ShutdownPhase::Counting => ShutdownStatus {
                phase: state.phase,
                remaining_secs: Some(state.remaining(Instant::now()).as_secs()),
                tick_interval_secs: Some(state.tick_interval.as_secs()),
            },
            ShutdownPhase::Disconnecting | ShutdownPhase::Terminating => ShutdownStatus {
                phase: state.phase,
                remaining_secs: Some(0),
                tick_interval_secs: None,
            },
        }
    }

    /// Enter `Counting` towards `target`.
    ///
    /// A countdown already in progress is overwritten (last writer wins).
    pub fn begin(&self, target: Instant, first_tick: Duration) -> Result<Begun, ShutdownError> {
        let mut state = self.lock();
        if state.phase.is_final() {
            return Err(ShutdownError::Underway(state.phase));
        }

        let replaced = (state.phase == ShutdownPhase::Counting)
            .then_some(state.target)
            .flatten();
        state.target = Some(target);
        state.tick_interval = first_tick;
        state.generation += 1;
        state.enter(ShutdownPhase::Counting);
        Ok(Begun {
            generation: state.generation,
            replaced,
        })
    }

    pub fn set_phase(&self, phase: ShutdownPhase) {
        self.lock().enter(phase);
    }

    /// Run `f` with exclusive access to the state.
    pub fn update<R>(&self, f: impl FnOnce(&mut ShutdownState) -> R) -> R {
        f(&mut *self.lock())
    }
}
