//! Operator API.
//!
//! Exposes the realm commands (`realm motd`, `realm shutdown`) and read-only
//! status over HTTP, gated by a bearer token.

pub mod auth;
pub mod handlers;

use std::time::Duration;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::http::request::RequestUuid;
use crate::http::server::AppState;

#[allow(deprecated)]
pub fn setup_admin_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.timeouts.request_secs);

    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/sessions", get(get_sessions))
        .route("/admin/realm/motd", post(set_motd))
        .route("/admin/realm/shutdown", get(get_shutdown).post(start_shutdown))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .layer(TimeoutLayer::new(timeout))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(RequestUuid))
        .with_state(state)
}
