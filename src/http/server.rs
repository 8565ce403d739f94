//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the realm subsystems (sessions, announcer, countdown) from config
//! - Create Axum Router with the session socket and operator routes
//! - Wire up middleware (tracing)
//! - Serve until the stop future resolves

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::admin::setup_admin_router;
use crate::broadcast::BroadcastDispatcher;
use crate::config::RealmConfig;
use crate::http::websocket::session_socket;
use crate::lifecycle::{CountdownScheduler, ProcessExit, ShutdownExecutor, ShutdownSession, Terminate};
use crate::realm::RealmAnnouncer;
use crate::session::SessionManager;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RealmConfig>,
    pub sessions: Arc<SessionManager>,
    pub announcer: Arc<RealmAnnouncer>,
    pub scheduler: CountdownScheduler,
}

/// HTTP server for the realm.
pub struct RealmServer {
    router: Router,
    state: AppState,
}

impl RealmServer {
    /// Create a server whose realm shutdown exits the process.
    pub fn new(config: RealmConfig) -> Self {
        Self::with_terminator(config, Arc::new(ProcessExit))
    }

    /// Create a server with a custom final shutdown step.
    pub fn with_terminator(config: RealmConfig, terminator: Arc<dyn Terminate>) -> Self {
        let config = Arc::new(config);

        let sessions = Arc::new(SessionManager::new(&config.listener));
        let dispatcher = BroadcastDispatcher::new(sessions.clone());
        let announcer = Arc::new(RealmAnnouncer::new(config.realm.motd.clone(), dispatcher.clone()));

        let shutdown = ShutdownSession::new();
        let executor = ShutdownExecutor::new(
            shutdown.clone(),
            dispatcher.clone(),
            terminator,
            config.shutdown.grace(),
        );
        let scheduler = CountdownScheduler::new(shutdown, dispatcher, executor, config.shutdown.clone());

        let state = AppState {
            config,
            sessions,
            announcer,
            scheduler,
        };

        let router = Self::build_router(state.clone());
        Self { router, state }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        let mut router = Router::new()
            .route("/ws", get(session_socket))
            .with_state(state.clone());

        if state.config.admin.enabled {
            router = router.merge(setup_admin_router(state));
        } else {
            tracing::info!("Admin API disabled");
        }

        router.layer(TraceLayer::new_for_http())
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// The fully layered router, for in-process requests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until `stop` resolves.
    pub async fn run<F>(self, listener: TcpListener, stop: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            realm = %self.state.config.realm.name,
            "Realm server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(stop)
            .await?;

        let sessions = &self.state.sessions;
        if sessions.is_empty() {
            tracing::info!("Realm server stopped");
        } else {
            tracing::warn!(sessions = sessions.len(), "Realm server stopped with sessions still open");
        }
        Ok(())
    }
}
