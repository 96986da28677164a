/// Search API handlers
use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::error;
use tracing::info;

use super::error_response;
use super::AppState;
use crate::api::types::ApiResponse;
use crate::api::types::ChapterResponse;
use crate::api::types::SearchRequest;
use crate::api::types::SearchResponse;
use crate::api::types::SemanticSearchRequest;
use crate::errors::VerseRagError;
use crate::search;

/// Keyword search (POST /api/search)
pub async fn keyword_search(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<ApiResponse<SearchResponse>>, (StatusCode, Json<ApiResponse<SearchResponse>>)> {
    info!("POST /api/search: {}", req.query);

    if req.query.trim().is_empty() {
        return Err(error_response(&VerseRagError::EmptyQuery));
    }

    let max_results = req.max_results.unwrap_or(state.config.default_max_results());
    let results = search::rank(state.store.verses(), &req.query, max_results);

    Ok(Json(ApiResponse::success(SearchResponse {
        query: req.query,
        total_results: results.len(),
        results,
    })))
}

/// Semantic search (POST /api/search/semantic)
pub async fn semantic_search(
    State(state): State<AppState>,
    Json(req): Json<SemanticSearchRequest>,
) -> Result<Json<ApiResponse<SearchResponse>>, (StatusCode, Json<ApiResponse<SearchResponse>>)> {
    info!("POST /api/search/semantic: {}", req.query);

    if req.query.trim().is_empty() {
        return Err(error_response(&VerseRagError::EmptyQuery));
    }

    let max_results = req.max_results.unwrap_or(state.config.default_max_results());
    match state
        .semantic
        .search(&req.query, max_results, req.min_similarity)
        .await
    {
        Ok(results) => Ok(Json(ApiResponse::success(SearchResponse {
            query: req.query,
            total_results: results.len(),
            results,
        }))),
        Err(e) => {
            error!("Semantic search failed: {}", e);
            Err(error_response(&e))
        }
    }
}

/// Chapter lookup (GET /api/chapter/:book/:chapter)
pub async fn get_chapter(
    State(state): State<AppState>,
    Path((book, chapter)): Path<(String, u32)>,
) -> Result<Json<ApiResponse<ChapterResponse>>, (StatusCode, Json<ApiResponse<ChapterResponse>>)> {
    info!("GET /api/chapter/{}/{}", book, chapter);

    let verses = search::search_by_reference(state.store.verses(), &book, chapter, None);
    if verses.is_empty() {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error(format!(
                "Chapter not found: {book} {chapter}"
            ))),
        ));
    }

    Ok(Json(ApiResponse::success(ChapterResponse {
        book,
        chapter,
        total_verses: verses.len(),
        verses,
    })))
}
