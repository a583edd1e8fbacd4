//! HTTP API module
//!
//! This module contains the command surface endpoints, config editing and
//! the display endpoints polled by spectator screens.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/start-game", post(start_game_handler))
        .route("/start", post(start_handler))
        .route("/pause", post(pause_handler))
        .route("/reset", post(reset_handler))
        .route("/extend", post(extend_handler))
        .route("/quit", post(quit_handler))
        .route("/config", put(config_handler))
        .route("/config/focus", post(focus_handler))
        .route("/display/:name", get(display_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
