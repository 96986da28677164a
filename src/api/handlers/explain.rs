/// Explanation API handler
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::error;
use tracing::info;

use super::error_response;
use super::AppState;
use crate::api::types::ApiResponse;
use crate::api::types::ExplainRequest;
use crate::api::types::ExplainResponse;
use crate::errors::VerseRagError;
use crate::explain;
use crate::search;

/// Explain search results in natural language (POST /api/explain)
pub async fn explain_search(
    State(state): State<AppState>,
    Json(req): Json<ExplainRequest>,
) -> Result<Json<ApiResponse<ExplainResponse>>, (StatusCode, Json<ApiResponse<ExplainResponse>>)> {
    info!("POST /api/explain: {} (semantic={})", req.query, req.semantic);

    if req.query.trim().is_empty() {
        return Err(error_response(&VerseRagError::EmptyQuery));
    }

    let max_results = req.max_results.unwrap_or(state.config.default_max_results());

    let (results, explanation, search_type) = if req.semantic {
        let results = match state.semantic.search(&req.query, max_results, None).await {
            Ok(results) => results,
            Err(e) => {
                error!("Semantic search failed: {}", e);
                return Err(error_response(&e));
            }
        };
        let explanation = explain::explain_semantic_results(&results, &req.query, req.max_verses);
        (results, explanation, "semantic")
    } else {
        let results = search::rank(state.store.verses(), &req.query, max_results);
        let explanation = explain::explain_results(&results, &req.query, req.max_verses);
        (results, explanation, "keyword")
    };

    Ok(Json(ApiResponse::success(ExplainResponse {
        query: req.query,
        search_type: search_type.to_string(),
        total_results: results.len(),
        explanation,
        verses: results,
    })))
}
