//! Axum WebSocket upgrade handler.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::http::{HeaderMap, header};
use axum::response::{IntoResponse, Response};

use super::connection::run_connection;
use crate::app_state::AppState;
use crate::error::RelayError;

/// `GET /ws` — Upgrade HTTP connection to a signaling WebSocket.
///
/// # Errors
///
/// Returns [`RelayError::OriginRejected`] (`403`) when a browser origin is
/// outside the configured allow-list.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    State(state): State<AppState>,
) -> Result<Response, RelayError> {
    let origin = headers
        .get(header::ORIGIN)
        .map(|v| v.to_str().unwrap_or_default());
    if !state.config.allowed_origins.permits(origin) {
        let origin = origin.unwrap_or_default().to_string();
        tracing::warn!(%origin, "ws upgrade refused");
        return Err(RelayError::OriginRejected(origin));
    }

    let relay = Arc::clone(&state.relay);
    let config = Arc::clone(&state.config);
    Ok(ws
        .on_upgrade(move |socket| run_connection(socket, relay, config))
        .into_response())
}
