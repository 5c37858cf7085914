use std::sync::Arc;
use axum::{extract::{Path, State}, http::StatusCode, Json};
use tracing::{debug, info};
use uuid::Uuid;

use crate::app::AppState;
use crate::models::{CreateRoomResponse, ErrorResponse, LanguagesResponse, RoomSummaryResponse};
use crate::rooms::SyncError;

/// Issue a fresh room id.
///
/// The room itself only comes into existence when the first participant joins.
pub async fn create_room() -> (StatusCode, Json<CreateRoomResponse>) {
    let room_id = Uuid::new_v4().to_string();
    info!("Issued room id {}", room_id);
    (StatusCode::CREATED, Json(CreateRoomResponse { room_id }))
}

/// Inspect a live room
pub async fn get_room(
    State(app_state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<(StatusCode, Json<RoomSummaryResponse>), (StatusCode, Json<ErrorResponse>)> {
    let snapshot = match app_state.registry.snapshot(&room_id).await {
        Some(snapshot) => snapshot,
        None => {
            debug!("Room {} requested but not live", room_id);
            return Err(ErrorResponse::with_status(
                StatusCode::NOT_FOUND,
                SyncError::RoomNotFound(room_id).to_string(),
            ));
        }
    };

    Ok((StatusCode::OK, Json(RoomSummaryResponse {
        room_id: snapshot.room_id,
        language: snapshot.language,
        users: snapshot.users,
        buffer_length: snapshot.buffer.chars().count(),
    })))
}

/// List the accepted language tags
pub async fn languages(State(app_state): State<Arc<AppState>>) -> Json<LanguagesResponse> {
    let languages = app_state.registry.languages();
    Json(LanguagesResponse {
        languages: languages.tags().to_vec(),
        default_language: languages.default_tag().to_string(),
    })
}
