//! Realm-wide announcements.
//!
//! # Data Flow
//! ```text
//! operator "realm motd <text>"
//!     → announcer.rs (store in ArcSwap)
//!     → broadcast dispatcher (tag "MOTD", realm channel)
//!
//! new session
//!     → announcer.rs welcome (current MOTD, if any)
//! ```

pub mod announcer;

pub use announcer::RealmAnnouncer;
