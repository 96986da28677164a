//! API request and response types

use serde::Deserialize;
use serde::Serialize;

use crate::commentary::CommentaryMode;
use crate::models::CorpusStats;
use crate::models::ScoredVerse;
use crate::models::Verse;
use crate::search::EmbeddingStats;

/// Standard API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub verses_loaded: usize,
    pub semantic_index_available: bool,
}

/// Keyword search request
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub max_results: Option<usize>,
}

/// Semantic search request
#[derive(Debug, Deserialize)]
pub struct SemanticSearchRequest {
    pub query: String,
    #[serde(default)]
    pub max_results: Option<usize>,
    #[serde(default)]
    pub min_similarity: Option<f64>,
}

/// Explanation request; `semantic` selects the ranker
#[derive(Debug, Deserialize)]
pub struct ExplainRequest {
    pub query: String,
    #[serde(default)]
    pub max_results: Option<usize>,
    #[serde(default = "default_max_verses")]
    pub max_verses: usize,
    #[serde(default)]
    pub semantic: bool,
}

fn default_max_verses() -> usize {
    5
}

/// Commentary request
#[derive(Debug, Deserialize)]
pub struct CommentaryRequest {
    pub query: String,
    #[serde(default)]
    pub max_results: Option<usize>,
}

/// Search response: ranked verses plus the query they answer
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub total_results: usize,
    pub results: Vec<ScoredVerse>,
}

/// Explanation response
#[derive(Debug, Serialize)]
pub struct ExplainResponse {
    pub query: String,
    pub search_type: String,
    pub total_results: usize,
    pub explanation: String,
    pub verses: Vec<ScoredVerse>,
}

/// Commentary response
#[derive(Debug, Serialize)]
pub struct CommentaryResponse {
    pub query: String,
    pub commentary: String,
    pub mode: CommentaryMode,
    pub verses_used: Vec<String>,
}

/// Chapter lookup response
#[derive(Debug, Serialize)]
pub struct ChapterResponse {
    pub book: String,
    pub chapter: u32,
    pub total_verses: usize,
    pub verses: Vec<Verse>,
}

/// Corpus and index statistics
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub corpus: CorpusStats,
    pub embeddings: EmbeddingStats,
}
