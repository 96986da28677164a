/// Commentary API handler
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::error;
use tracing::info;

use super::error_response;
use super::AppState;
use crate::api::types::ApiResponse;
use crate::api::types::CommentaryRequest;
use crate::api::types::CommentaryResponse;
use crate::errors::VerseRagError;

/// Generate commentary over the top semantic matches (POST /api/commentary).
///
/// Retrieval failures map to their usual statuses; generation failures never
/// surface here because the service degrades to fallback text on its own.
pub async fn generate_commentary(
    State(state): State<AppState>,
    Json(req): Json<CommentaryRequest>,
) -> Result<
    Json<ApiResponse<CommentaryResponse>>,
    (StatusCode, Json<ApiResponse<CommentaryResponse>>),
> {
    info!("POST /api/commentary: {}", req.query);

    if req.query.trim().is_empty() {
        return Err(error_response(&VerseRagError::EmptyQuery));
    }

    let max_results = req.max_results.unwrap_or(state.config.default_max_results());
    let results = match state.semantic.search(&req.query, max_results, None).await {
        Ok(results) => results,
        Err(e) => {
            error!("Retrieval for commentary failed: {}", e);
            return Err(error_response(&e));
        }
    };
    let commentary = state.commentary.generate(&req.query, &results).await;

    Ok(Json(ApiResponse::success(CommentaryResponse {
        query: req.query,
        commentary: commentary.text,
        mode: commentary.mode,
        verses_used: commentary.verses_used,
    })))
}
