//! Router construction and serving.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::{handlers, ApiError, AppState};

/// Build the full route table over shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/session", post(handlers::create_session))
        .route("/session/:id", get(handlers::session_snapshot))
        .route("/session/:id/search", post(handlers::search_address))
        .route("/session/:id/confirm", post(handlers::confirm_address))
        .route("/session/:id/district", post(handlers::enter_district))
        .route("/session/:id/identity", post(handlers::submit_identity))
        .route("/session/:id/code", post(handlers::submit_code))
        .route("/session/:id/restart", post(handlers::restart))
        .route("/stats", get(handlers::stats))
        .route("/admin/reset", post(handlers::admin_reset))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(state: Arc<AppState>, port: u16) -> Result<(), ApiError> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .map_err(|e| ApiError::Server(format!("bind failed on port {port}: {e}")))?;
    info!(port, "pledge API listening");
    axum::serve(listener, router(state))
        .await
        .map_err(|e| ApiError::Server(e.to_string()))
}
