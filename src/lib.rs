pub mod app;
pub mod client;
pub mod config;
pub mod docs;
pub mod handlers;
pub mod models;
pub mod rooms;
pub mod routes;
pub mod websocket;

pub use app::{build_app, AppState};
