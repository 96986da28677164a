//! API route definitions

use axum::routing::get;
use axum::routing::post;
use axum::Router;

use super::handlers::AppState;
use super::handlers::{
    self,
};

/// Create RESTful API router
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Search endpoints
        .route("/search", post(handlers::keyword_search))
        .route("/search/semantic", post(handlers::semantic_search))
        // Explanation and commentary
        .route("/explain", post(handlers::explain_search))
        .route("/commentary", post(handlers::generate_commentary))
        // Direct reference lookup
        .route("/chapter/:book/:chapter", get(handlers::get_chapter))
        // Statistics
        .route("/stats", get(handlers::get_stats))
        .with_state(state)
}
