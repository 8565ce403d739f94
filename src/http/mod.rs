//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup)
//!     → /ws        → websocket.rs (session transport)
//!     → /admin/*   → request.rs (request ID) → admin handlers
//! ```

pub mod request;
pub mod server;
pub mod websocket;

pub use request::{RequestUuid, X_REQUEST_ID};
pub use server::{AppState, RealmServer};
