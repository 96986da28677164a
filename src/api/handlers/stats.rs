/// Statistics API handler
use axum::extract::State;
use axum::Json;
use tracing::info;

use super::AppState;
use crate::api::types::ApiResponse;
use crate::api::types::StatsResponse;

/// Corpus and index statistics (GET /api/stats)
pub async fn get_stats(State(state): State<AppState>) -> Json<ApiResponse<StatsResponse>> {
    info!("GET /api/stats");

    Json(ApiResponse::success(StatsResponse {
        corpus: state.store.stats(),
        embeddings: state.semantic.stats(),
    }))
}
