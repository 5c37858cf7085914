use crate::{app::AppState, handlers::{create_room, diagnostics, get_room, health_check, languages, ready_check}};
use axum::{routing::{get, post}, Router};
use std::sync::Arc;

/// Create API routes
pub fn create_api_routes() -> Router<Arc<AppState>> {
    Router::<Arc<AppState>>::new()
        .route("/health", get(health_check))
        .route("/ready", get(ready_check))
        .route("/v1/rooms", post(create_room))
        .route("/v1/rooms/:room_id", get(get_room))
        .route("/v1/languages", get(languages))
        .route("/v1/diagnostics", get(diagnostics))
}
