pub mod health;
pub mod report;
pub mod token;

use std::path::Path;

use axum::routing::{get, post};
use axum::Router;
use tower_http::services::ServeDir;

use crate::state::AppState;
use crate::ws;

/// Build the route tree.
///
/// Routes mirror the public wire interface:
///
/// ```text
/// /health      liveness check
/// /gettoken    viewer bearer token
/// /ws          client task channel (WebSocket upgrade)
/// /report      completion callback from the compute service
/// /*           static public tree (scripts, extracted images, viewer)
/// ```
///
/// Middleware layers are applied by the binary entrypoint.
pub fn router(public_dir: &Path) -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .route("/gettoken", get(token::get_token))
        .route("/ws", get(ws::ws_handler))
        .route("/report", post(report::report))
        .fallback_service(ServeDir::new(public_dir))
}
