use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::broadcast::FanOutReport;
use crate::http::server::AppState;
use crate::lifecycle::{ShutdownPhase, ShutdownStatus};
use crate::session::Session;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub realm: String,
    pub status: &'static str,
    pub sessions: usize,
    pub motd: String,
    pub shutdown: ShutdownStatus,
}

#[derive(Serialize)]
pub struct SessionInfo {
    pub id: u64,
    pub peer: String,
    pub connected_secs: u64,
}

#[derive(Deserialize)]
pub struct MotdRequest {
    pub message: String,
}

#[derive(Deserialize)]
pub struct ShutdownRequest {
    pub seconds: u64,
}

#[derive(Serialize)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub gone: usize,
    pub failed: usize,
}

impl From<FanOutReport> for DeliveryReport {
    fn from(report: FanOutReport) -> Self {
        Self {
            delivered: report.succeeded,
            gone: report.gone,
            failed: report.failed,
        }
    }
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    let shutdown = state.scheduler.status();
    let status = match shutdown.phase {
        ShutdownPhase::Idle => "operational",
        _ => "shutting_down",
    };

    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        realm: state.config.realm.name.clone(),
        status,
        sessions: state.sessions.len(),
        motd: state.announcer.motd().to_string(),
        shutdown,
    })
}

pub async fn get_sessions(State(state): State<AppState>) -> Json<Vec<SessionInfo>> {
    let mut sessions: Vec<SessionInfo> = state
        .sessions
        .world_sessions()
        .iter()
        .map(|s| SessionInfo {
            id: s.id().as_u64(),
            peer: s.peer().to_string(),
            connected_secs: s.connected_for().as_secs(),
        })
        .collect();
    sessions.sort_by_key(|s| s.id);

    Json(sessions)
}

/// `realm motd <message>`
pub async fn set_motd(
    State(state): State<AppState>,
    Json(request): Json<MotdRequest>,
) -> Json<DeliveryReport> {
    let report = state.announcer.set_motd(request.message).await;
    Json(report.into())
}

/// `realm shutdown <seconds>`
pub async fn start_shutdown(
    State(state): State<AppState>,
    Json(request): Json<ShutdownRequest>,
) -> Response {
    match state.scheduler.start_shutdown(request.seconds) {
        Ok(status) => (StatusCode::ACCEPTED, Json(status)).into_response(),
        Err(e) => {
            tracing::warn!(seconds = request.seconds, error = %e, "Realm shutdown request rejected");
            (
                StatusCode::CONFLICT,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

pub async fn get_shutdown(State(state): State<AppState>) -> Json<ShutdownStatus> {
    Json(state.scheduler.status())
}
