//! HTTP API layer: plain HTTP routes served next to the WebSocket.

pub mod handlers;

use axum::Router;

use crate::app_state::AppState;

/// Builds the HTTP router (everything except `/ws`).
pub fn build_router() -> Router<AppState> {
    Router::new().merge(handlers::system::routes())
}
