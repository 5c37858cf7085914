use std::sync::Arc;
use axum::{http::HeaderValue, routing::get, Router};
use tower_http::{cors::{Any, CorsLayer}, trace::TraceLayer};
use tracing::warn;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::docs::ApiDoc;
use crate::rooms::RoomRegistry;
use crate::routes::create_api_routes;
use crate::websocket::websocket_handler;

/// State shared by every HTTP and WebSocket handler.
pub struct AppState {
    pub registry: Arc<RoomRegistry>,
    pub outbox_capacity: usize,
    pub service_name: String,
}

impl AppState {
    pub fn new(config: &Config, registry: Arc<RoomRegistry>) -> Self {
        Self {
            registry,
            outbox_capacity: config.outbox_capacity.max(1),
            service_name: config.service_name.clone(),
        }
    }
}

/// Assemble the full application router: WebSocket endpoint, REST API and
/// Swagger UI.
pub fn build_app(config: &Config, registry: Arc<RoomRegistry>) -> Router {
    let app_state = Arc::new(AppState::new(config, registry));

    Router::new()
        .route("/ws", get(websocket_handler))
        // Mount API routes
        .nest("/api", create_api_routes())
        .with_state(app_state)
        // Mount Swagger UI
        .merge(SwaggerUi::new("/swagger").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors_layer(config))
        // Add tracing layer
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origin_list()
        .into_iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(origins)
    }
}
