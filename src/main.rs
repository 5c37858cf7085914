use std::panic;
use std::sync::Arc;
use codefun_sync::build_app;
use codefun_sync::config::{self, Config};
use codefun_sync::rooms::{LanguageSet, RoomRegistry};
use tracing::{info, error, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() {

    // Set panic hook for better error messages
    panic::set_hook(Box::new(|info| {
        eprintln!("PANIC: {info}");
    }));

    // Load configuration
    let loaded = Config::load();
    let config = config::init_config(loaded.as_ref().cloned().unwrap_or_default());

    // Initialize tracing
    let default_filter = format!("codefun_sync=debug,tower_http=debug,{}", config.log_level);
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .init();

    info!("Starting server...");
    if let Err(e) = &loaded {
        error!("Failed to load configuration: {}", e);
        warn!("Using default configuration");
    }
    if config.is_development() {
        info!("Running in development mode");
    }

    let languages = config.language_set().unwrap_or_else(|e| {
        error!("{}", e);
        warn!("Falling back to the default language set");
        LanguageSet::default()
    });
    info!("Accepted languages: {} (default {})", languages.tags().join(", "), languages.default_tag());
    let registry = Arc::new(RoomRegistry::new(languages));

    let app_routes = build_app(config, registry);

    // Start the HTTP/WebSocket server
    let listener = match tokio::net::TcpListener::bind(config.server_address()).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", config.server_address(), e);
            std::process::exit(1);
        }
    };

    info!("🚀 Server running on http://{}", config.server_address());
    info!("📡 WebSocket available at ws://{}/ws", config.server_address());
    info!("📚 Swagger UI available at http://{}/swagger", config.server_address());

    if let Err(e) = axum::serve(listener, app_routes)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
    info!("Server stopped");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
