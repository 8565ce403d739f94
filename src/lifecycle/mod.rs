//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Realm shutdown (operator "realm shutdown <seconds>"):
//!     countdown.rs start → state.rs Counting
//!     → periodic tick → cadence.rs (interval + phrase) → warning broadcast
//!     → expiry → executor.rs (disconnect all → grace delay → exit 0)
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → graceful server stop
//! ```
//!
//! # Design Decisions
//! - One shutdown state per process, shared by handle rather than a static
//! - Restarting a running countdown replaces it; once disconnecting, it is final
//! - The grace delay is the only timeout; termination is unconditional after it

pub mod cadence;
pub mod countdown;
pub mod executor;
pub mod signals;
pub mod state;

pub use countdown::CountdownScheduler;
pub use executor::{ProcessExit, ShutdownExecutor, Terminate};
pub use state::{Begun, ShutdownError, ShutdownPhase, ShutdownSession, ShutdownStatus};
