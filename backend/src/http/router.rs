//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{
    routing::{get, put},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration - permissive for development, should be restricted in production
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the API router with versioned endpoints
    let api_v1 = Router::new()
        // Reference data
        .route("/days", get(handlers::list_days))
        .route("/roles", get(handlers::list_roles))
        .route("/workers", get(handlers::list_workers))
        // Shift editing
        .route("/days/{day}/shifts/{group}", get(handlers::get_shift))
        .route(
            "/days/{day}/shifts/{group}/roles/{role_id}",
            put(handlers::assign_worker),
        )
        // Weekly document
        .route("/export/weekly", get(handlers::get_weekly_export))
        .route("/export/weekly.txt", get(handlers::download_weekly_export));

    // Combine all routes
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
