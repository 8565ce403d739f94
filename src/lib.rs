//! Realm server library: session hosting, announcements and operator-driven
//! shutdown.

pub mod admin;
pub mod broadcast;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod realm;
pub mod session;

pub use config::schema::RealmConfig;
pub use http::RealmServer;
pub use lifecycle::{CountdownScheduler, ShutdownPhase, Terminate};
pub use realm::RealmAnnouncer;
