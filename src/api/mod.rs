//! Relay API endpoints.
//!
//! Endpoints:
//! - OPTIONS /api/chat - CORS preflight
//! - GET /api/chat - Status check (credential presence, granted origin)
//! - POST /api/chat - Relay a chat request upstream
//! - GET /health - Health check

mod handlers;
mod types;

use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::cors;

// Re-export the pure pipeline steps for unit tests and embedders
pub use handlers::{build_upstream_body, check_origin, parse_chat_request, require_credential};
pub use types::*;

/// Application state shared across handlers.
///
/// The config is loaded once at startup and never mutated afterwards;
/// concurrent requests share it read-only.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

/// Create the API router with default configuration.
pub fn create_router() -> Router {
    create_router_with_state(AppState::new(Config::default()))
}

/// Create the API router with custom state.
pub fn create_router_with_state(state: AppState) -> Router {
    let config = state.config.clone();

    Router::new()
        .route("/health", get(handlers::health_check))
        .route(
            "/api/chat",
            get(handlers::relay_status)
                .post(handlers::relay)
                .options(handlers::preflight),
        )
        .with_state(Arc::new(state))
        .layer(middleware::from_fn_with_state(config, cors::apply))
        .layer(TraceLayer::new_for_http())
}
