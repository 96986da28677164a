//! Embeddings generation module
//!
//! Generates text embeddings through an HTTP provider:
//! - OpenAI-compatible endpoints (text-embedding-3-small, etc.)
//! - Ollama local models (all-minilm and friends)
//!
//! Query and corpus vectors are L2-normalized so that inner product equals
//! cosine similarity.

pub mod client;
pub mod generator;

pub use client::EmbeddingClient;
pub use client::EmbeddingProvider;
pub use generator::EmbeddingService;

use crate::errors::Result;
use crate::errors::VerseRagError;

/// Maximum number of texts sent to a provider in one request
pub const MAX_BATCH_SIZE: usize = 100;

/// Configuration for embedding generation
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    pub model: String,
    pub dimension: usize,
    pub endpoint: String,
    pub api_key: Option<String>,
}

impl EmbeddingConfig {
    pub fn from_app_config(config: &crate::config::AppConfig) -> Self {
        let endpoint = config.embeddings.endpoint.clone();
        // OpenAI-style endpoints need a key; everything else is assumed Ollama
        let provider = if endpoint.contains("api.openai.com") {
            EmbeddingProvider::OpenAI
        } else {
            EmbeddingProvider::Ollama
        };

        Self {
            provider,
            model: config.embedding_model().to_string(),
            dimension: config.embedding_dimension(),
            endpoint,
            api_key: config.embeddings.api_key.clone(),
        }
    }
}

/// Normalize a vector to unit length in place.
///
/// Zero vectors are left untouched; downstream similarity against them is 0.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in vector.iter_mut() {
            *x /= norm;
        }
    }
}

/// Prepare text for embedding: collapse whitespace, reject empty input
pub fn preprocess_text_for_embedding(text: &str) -> Result<String> {
    let cleaned = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.is_empty() {
        return Err(VerseRagError::Embedding(
            "cannot embed empty text".to_string(),
        ));
    }
    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_l2_normalize() {
        let mut v = vec![3.0, 4.0];
        l2_normalize(&mut v);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_l2_normalize_zero_vector() {
        let mut v = vec![0.0, 0.0, 0.0];
        l2_normalize(&mut v);
        assert_eq!(v, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_preprocess_collapses_whitespace() {
        let out = preprocess_text_for_embedding("  For God\n so  loved\tthe world ").unwrap();
        assert_eq!(out, "For God so loved the world");
    }

    #[test]
    fn test_preprocess_rejects_empty() {
        assert!(preprocess_text_for_embedding("   \n\t ").is_err());
    }
}
