//! Axum router construction for the observer API.
//!
//! Assembles all routes into a single [`Router`] with CORS middleware
//! enabled for cross-origin dashboard access.

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete router for the observer server.
///
/// CORS allows any origin for development; restrict it in production.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/api/agents", get(handlers::list_agents))
        .route("/api/agents/{id}", get(handlers::get_agent))
        .route("/api/villages", get(handlers::list_villages))
        .route("/api/events", get(handlers::list_events))
        .route("/api/relationships/{id}", get(handlers::get_relationships))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
