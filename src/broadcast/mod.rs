//! Broadcast subsystem.
//!
//! # Data Flow
//! ```text
//! MOTD / countdown warning / shutdown notice
//!     → dispatcher.rs (fresh registry snapshot)
//!     → JoinSet: one task per session
//!     → FanOutReport (logged + metrics)
//! ```
//!
//! # Design Decisions
//! - Snapshot first, then iterate: registry mutation never disturbs a pass
//! - Per-session failures are counted, never propagated
//! - No acknowledgment, no retry

pub mod dispatcher;

pub use dispatcher::{fan_out, BroadcastDispatcher, FanOutReport};
