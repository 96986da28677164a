/// API request handlers
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::api::types::ApiResponse;
use crate::api::types::HealthResponse;
use crate::commentary::CommentaryService;
use crate::config::AppConfig;
use crate::errors::VerseRagError;
use crate::search::SemanticSearcher;
use crate::store::VerseStore;

// Re-export sub-modules
pub mod commentary;
pub mod explain;
pub mod search;
pub mod stats;

// Re-export handlers
pub use commentary::*;
pub use explain::*;
pub use search::*;
pub use stats::*;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<VerseStore>,
    pub semantic: Arc<SemanticSearcher>,
    pub commentary: Arc<CommentaryService>,
    pub config: Arc<AppConfig>,
}

/// Map a domain error to the HTTP status it should surface as
pub fn error_status(error: &VerseRagError) -> StatusCode {
    match error {
        VerseRagError::EmptyQuery => StatusCode::BAD_REQUEST,
        VerseRagError::IndexUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Error body paired with its status
pub fn error_response<T>(error: &VerseRagError) -> (StatusCode, Json<ApiResponse<T>>) {
    (error_status(error), Json(ApiResponse::error(error.to_string())))
}

/// Health check handler
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::success(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        verses_loaded: state.store.len(),
        semantic_index_available: state.semantic.is_available(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(error_status(&VerseRagError::EmptyQuery), StatusCode::BAD_REQUEST);
        assert_eq!(
            error_status(&VerseRagError::IndexUnavailable("missing".to_string())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            error_status(&VerseRagError::Config("bad".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
