use utoipa::OpenApi;
use crate::models::*;

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
#[allow(dead_code)]
pub async fn health_check_doc() {}

/// Readiness check endpoint
#[utoipa::path(
    get,
    path = "/api/ready",
    responses(
        (status = 200, description = "Service is ready", body = HealthResponse)
    )
)]
#[allow(dead_code)]
pub async fn ready_check_doc() {}

/// Issue a new room id
#[utoipa::path(
    post,
    path = "/api/v1/rooms",
    responses(
        (status = 201, description = "Room id issued; the room is created on first join", body = CreateRoomResponse)
    )
)]
#[allow(dead_code)]
pub async fn create_room_doc() {}

/// Inspect a live room
#[utoipa::path(
    get,
    path = "/api/v1/rooms/{room_id}",
    params(
        ("room_id" = String, Path, description = "Room identifier")
    ),
    responses(
        (status = 200, description = "Room summary", body = RoomSummaryResponse),
        (status = 404, description = "No participant is in the room", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn get_room_doc() {}

/// List accepted languages
#[utoipa::path(
    get,
    path = "/api/v1/languages",
    responses(
        (status = 200, description = "Configured language tags", body = LanguagesResponse)
    )
)]
#[allow(dead_code)]
pub async fn languages_doc() {}

/// Service diagnostics
#[utoipa::path(
    get,
    path = "/api/v1/diagnostics",
    responses(
        (status = 200, description = "Room, connection and host statistics", body = DiagnosticsResponse)
    )
)]
#[allow(dead_code)]
pub async fn diagnostics_doc() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check_doc,
        ready_check_doc,
        create_room_doc,
        get_room_doc,
        languages_doc,
        diagnostics_doc,
    ),
    components(
        schemas(
            HealthResponse,
            CreateRoomResponse,
            RoomSummaryResponse,
            LanguagesResponse,
            DiagnosticsResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "api", description = "API endpoints")
    )
)]
pub struct ApiDoc;
