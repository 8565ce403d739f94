//! Session subsystem.
//!
//! # Data Flow
//! ```text
//! WebSocket upgrade (http/websocket.rs)
//!     → manager.rs (admit, allocate SessionId, outbound queue)
//!     → connection task drains queue to the socket
//!
//! Broadcast / shutdown paths:
//!     → registry.rs traits (snapshot, send, disconnect)
//! ```
//!
//! # Design Decisions
//! - Callers see sessions only through the `Session`/`SessionRegistry` traits
//! - Enumeration returns an owned snapshot; nothing caches it across operations
//! - Sending never blocks: messages go to a bounded per-session queue

pub mod manager;
pub mod message;
pub mod registry;

#[cfg(test)]
pub(crate) mod testing;

pub use manager::{SessionGuard, SessionManager, WorldSession};
pub use message::{ChatChannel, ChatMessage, MOTD_TAG};
pub use registry::{RegistryError, Session, SessionError, SessionId, SessionRef, SessionRegistry};
