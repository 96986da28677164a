//! Embedding generation service with batching and normalization

use std::sync::Arc;

use tracing::info;

use super::client::EmbeddingClient;
use super::EmbeddingConfig;
use super::MAX_BATCH_SIZE;
use crate::errors::Result;
use crate::errors::VerseRagError;

/// Service for generating unit-length embeddings
pub struct EmbeddingService {
    client: Arc<EmbeddingClient>,
    config: EmbeddingConfig,
}

impl EmbeddingService {
    /// Create a new embedding service from application config
    pub fn new(config: &crate::config::AppConfig) -> Result<Self> {
        Self::from_config(EmbeddingConfig::from_app_config(config))
    }

    /// Create from custom config
    pub fn from_config(config: EmbeddingConfig) -> Result<Self> {
        let client = EmbeddingClient::new(
            config.provider,
            config.model.clone(),
            config.endpoint.clone(),
            config.api_key.clone(),
        )?;

        Ok(Self {
            client: Arc::new(client),
            config,
        })
    }

    /// Generate a unit-normalized embedding for a single text.
    ///
    /// Fails if the provider returns a vector of the wrong dimension; a
    /// dimension drift would silently corrupt the index otherwise.
    pub async fn generate(&self, text: &str) -> Result<Vec<f32>> {
        let processed = super::preprocess_text_for_embedding(text)?;
        let mut embedding = self.client.generate(&processed).await?;
        self.check_dimension(&embedding)?;
        super::l2_normalize(&mut embedding);
        Ok(embedding)
    }

    /// Generate unit-normalized embeddings for multiple texts
    pub async fn generate_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut processed = Vec::with_capacity(texts.len());
        for text in texts {
            processed.push(super::preprocess_text_for_embedding(text)?);
        }

        let mut embeddings = Vec::with_capacity(processed.len());
        for chunk in processed.chunks(MAX_BATCH_SIZE) {
            let chunk_embeddings = self
                .client
                .generate_batch(chunk.iter().map(String::as_str).collect())
                .await?;
            embeddings.extend(chunk_embeddings);
        }

        if embeddings.len() != texts.len() {
            return Err(VerseRagError::Embedding(format!(
                "provider returned {} embeddings for {} texts",
                embeddings.len(),
                texts.len()
            )));
        }

        for embedding in &mut embeddings {
            self.check_dimension(embedding)?;
            super::l2_normalize(embedding);
        }

        info!("Generated {} embeddings", embeddings.len());
        Ok(embeddings)
    }

    fn check_dimension(&self, embedding: &[f32]) -> Result<()> {
        if embedding.len() != self.config.dimension {
            return Err(VerseRagError::Embedding(format!(
                "expected dimension {}, provider returned {}",
                self.config.dimension,
                embedding.len()
            )));
        }
        Ok(())
    }

    /// Get the embedding dimension
    pub const fn dimension(&self) -> usize {
        self.config.dimension
    }

    /// Get the model name
    pub fn model(&self) -> &str {
        &self.config.model
    }
}
