//! API Routes
//!
//! Configures the Axum router with all projection service endpoints.

use axum::{
    routing::{delete, get},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_handler, global_stats_handler, health_handler, history_handler,
    invalidate_projection_handler, projection_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /projections` - Read a projection query
/// - `DELETE /projections` - Invalidate a projection query
/// - `GET /history` - Read a climate history query
/// - `GET /global-stats` - Read the global statistics query
/// - `DELETE /cache` - Invalidate every query
/// - `GET /stats` - Get cache statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin so a browser dashboard can call the API
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/projections",
            get(projection_handler).delete(invalidate_projection_handler),
        )
        .route("/history", get(history_handler))
        .route("/global-stats", get(global_stats_handler))
        .route("/cache", delete(clear_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
