use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Recording control
        .route(
            "/recordings",
            post(handlers::start_recording).get(handlers::list_recordings),
        )
        .route(
            "/recordings/:id",
            get(handlers::get_recording).delete(handlers::discard_recording),
        )
        .route("/recordings/:id/stop", post(handlers::stop_recording))
        .route("/recordings/:id/save", post(handlers::save_recording))
        // Live queries
        .route("/recordings/:id/level", get(handlers::get_recording_level))
        .route(
            "/recordings/:id/duration",
            get(handlers::get_recording_duration),
        )
        .route("/level", get(handlers::get_current_level))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
