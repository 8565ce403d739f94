//! WebSocket session transport.
//!
//! # Data Flow
//! ```text
//! GET /ws → admission (shutdown phase, session limit)
//!     → SessionManager::open (guard + outbound queue)
//!     → upgrade → welcome MOTD
//!     → loop: queue → JSON text frame | kick → Close(1001) | client close
//!     → guard dropped → session unregistered
//! ```
//!
//! # Design Decisions
//! - Inbound frames are drained but not interpreted here
//! - Queued messages are flushed before a pending kick is honoured

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{close_code, CloseFrame, Message, WebSocket, WebSocketUpgrade},
        ConnectInfo, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::http::server::AppState;
use crate::realm::RealmAnnouncer;
use crate::session::{ChatMessage, Session, SessionGuard};

/// Upgrade handler for `/ws`.
pub async fn session_socket(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
) -> Response {
    let phase = state.scheduler.phase();
    if phase.is_final() {
        tracing::debug!(peer = %peer, %phase, "Refusing session: realm is shutting down");
        return (StatusCode::SERVICE_UNAVAILABLE, "Realm is shutting down").into_response();
    }

    let (session, outbound) = match state.sessions.open(peer) {
        Ok(opened) => opened,
        Err(e) => {
            tracing::warn!(peer = %peer, error = %e, "Refusing session");
            return (StatusCode::SERVICE_UNAVAILABLE, e.to_string()).into_response();
        }
    };

    let announcer = state.announcer.clone();
    ws.on_upgrade(move |socket| serve_session(socket, session, outbound, announcer))
}

async fn serve_session(
    socket: WebSocket,
    session: SessionGuard,
    mut outbound: mpsc::Receiver<ChatMessage>,
    announcer: Arc<RealmAnnouncer>,
) {
    let id = session.id();
    tracing::info!(session = %id, peer = %session.peer(), "Session connected");

    if let Err(e) = announcer.welcome(&*session) {
        tracing::debug!(session = %id, error = %e, "Welcome message not queued");
    }

    let (mut sink, mut stream) = socket.split();
    loop {
        tokio::select! {
            biased;

            Some(message) = outbound.recv() => {
                let payload = match serde_json::to_string(&message) {
                    Ok(payload) => payload,
                    Err(e) => {
                        tracing::error!(session = %id, error = %e, "Failed to encode chat message");
                        continue;
                    }
                };
                if let Err(e) = sink.send(Message::Text(payload.into())).await {
                    tracing::debug!(session = %id, error = %e, "Socket write failed");
                    break;
                }
            }
            _ = session.kicked() => {
                let frame = CloseFrame {
                    code: close_code::AWAY,
                    reason: "Disconnected by server".into(),
                };
                let _ = sink.send(Message::Close(Some(frame))).await;
                break;
            }
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Err(e)) => {
                    tracing::debug!(session = %id, error = %e, "Socket read failed");
                    break;
                }
                Some(Ok(_)) => {}
            },
        }
    }

    tracing::info!(session = %id, connected_secs = session.connected_for().as_secs(), "Session disconnected");
}
