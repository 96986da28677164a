//! Semantic ranker: embedding-based nearest-neighbor search with thresholding

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::OnceCell;
use tracing::debug;
use tracing::info;

use crate::config::AppConfig;
use crate::embeddings::EmbeddingService;
use crate::errors::Result;
use crate::errors::VerseRagError;
use crate::index::load_mapping;
use crate::index::save_mapping;
use crate::index::VectorIndex;
use crate::models::ScoredVerse;
use crate::store::VerseStore;

/// Index plus its ID mapping, loaded together and verified against the store
struct LoadedIndex {
    index: VectorIndex,
    mapping: Vec<usize>,
}

/// Outcome of an index build request
#[derive(Debug, PartialEq, Eq)]
pub enum BuildOutcome {
    /// Artifacts already existed and `force` was not set
    Skipped,
    /// Index rebuilt with this many vectors
    Built(usize),
}

/// Statistics about the embedding index artifacts
#[derive(Debug, Serialize)]
pub struct EmbeddingStats {
    pub index_exists: bool,
    pub mapping_exists: bool,
    pub total_vectors: Option<usize>,
    pub model_name: String,
    pub embedding_dim: usize,
}

/// Semantic search over the verse store.
///
/// The on-disk index is loaded lazily on the first query and memoized
/// process-wide; concurrent first requests trigger at most one load. The
/// loaded index is never mutated, only replaced by rebuilding the artifacts
/// and restarting.
pub struct SemanticSearcher {
    store: Arc<VerseStore>,
    embedding_service: EmbeddingService,
    index_file: PathBuf,
    mapping_file: PathBuf,
    default_threshold: f64,
    overfetch_factor: usize,
    model_name: String,
    dimension: usize,
    batch_size: usize,
    loaded: OnceCell<LoadedIndex>,
}

impl SemanticSearcher {
    pub fn new(store: Arc<VerseStore>, config: &AppConfig) -> Result<Self> {
        let embedding_service = EmbeddingService::new(config)?;
        Ok(Self {
            store,
            embedding_service,
            index_file: config.index_file(),
            mapping_file: config.mapping_file(),
            default_threshold: config.similarity_threshold(),
            overfetch_factor: config.search.overfetch_factor,
            model_name: config.embedding_model().to_string(),
            dimension: config.embedding_dimension(),
            batch_size: config.embeddings.batch_size,
            loaded: OnceCell::new(),
        })
    }

    /// Whether both index artifacts exist on disk
    pub fn is_available(&self) -> bool {
        self.index_file.exists() && self.mapping_file.exists()
    }

    /// Rank verses by cosine similarity to the query.
    ///
    /// Empty queries short-circuit to an empty list without touching the
    /// embedding provider. A missing index is `IndexUnavailable`, distinct
    /// from "no results"; a count mismatch between index, mapping and store
    /// is an integrity fault.
    pub async fn search(
        &self,
        query: &str,
        max_results: usize,
        min_similarity: Option<f64>,
    ) -> Result<Vec<ScoredVerse>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        if !self.is_available() {
            return Err(VerseRagError::IndexUnavailable(format!(
                "index artifacts not found at {} - run the index command first",
                self.index_file.display()
            )));
        }

        let loaded = self.loaded.get_or_try_init(|| self.load()).await?;

        let min_similarity = min_similarity.unwrap_or(self.default_threshold);

        debug!("Performing semantic search: {}", query);
        let query_embedding = self.embedding_service.generate(query).await?;

        // Over-fetch: the threshold filter below may discard raw candidates
        let k = std::cmp::min(
            max_results.saturating_mul(self.overfetch_factor),
            loaded.index.len(),
        );
        let candidates = loaded.index.search(&query_embedding, k)?;

        collect_matches(
            &candidates,
            &loaded.mapping,
            &self.store,
            max_results,
            min_similarity,
        )
    }

    /// Build the embedding index from the store and persist it.
    ///
    /// Idempotent: when the artifacts already exist and `force` is false the
    /// build is skipped. Runs offline, never in the query path.
    pub async fn build_index(&self, force: bool) -> Result<BuildOutcome> {
        if !force && self.is_available() {
            info!("Embeddings already cached. Use force to regenerate.");
            return Ok(BuildOutcome::Skipped);
        }

        let verses = self.store.verses();
        info!("Generating embeddings for {} verses...", verses.len());

        let mut index = VectorIndex::new(self.dimension);
        // Configured batch size; the embedding service further splits each
        // batch to what the provider accepts per request
        let batch_size = self.batch_size;
        for (batch_no, chunk) in verses.chunks(batch_size).enumerate() {
            let texts: Vec<&str> = chunk.iter().map(|v| v.text.as_str()).collect();
            let embeddings = self.embedding_service.generate_batch(&texts).await?;
            for embedding in &embeddings {
                index.add(embedding)?;
            }
            info!(
                "  Progress: {}/{}",
                (batch_no * batch_size + chunk.len()).min(verses.len()),
                verses.len()
            );
        }

        if index.len() != verses.len() {
            return Err(VerseRagError::IndexMismatch {
                expected: verses.len(),
                actual: index.len(),
            });
        }

        index.save(&self.index_file)?;
        let mapping: Vec<usize> = (0..verses.len()).collect();
        save_mapping(&self.mapping_file, &mapping)?;

        info!("Generated and cached {} embeddings", verses.len());
        Ok(BuildOutcome::Built(verses.len()))
    }

    /// Statistics about the embedding cache
    pub fn stats(&self) -> EmbeddingStats {
        let total_vectors = if self.index_file.exists() {
            VectorIndex::load(&self.index_file).ok().map(|i| i.len())
        } else {
            None
        };

        EmbeddingStats {
            index_exists: self.index_file.exists(),
            mapping_exists: self.mapping_file.exists(),
            total_vectors,
            model_name: self.model_name.clone(),
            embedding_dim: self.dimension,
        }
    }

    async fn load(&self) -> Result<LoadedIndex> {
        info!("Loading vector index from {}", self.index_file.display());
        let index = VectorIndex::load(&self.index_file)?;
        let mapping = load_mapping(&self.mapping_file)?;
        verify_consistency(index.len(), mapping.len(), self.store.len())?;
        Ok(LoadedIndex { index, mapping })
    }
}

/// The index, its mapping and the store must agree on verse count; anything
/// else means the corpus changed after the index was built.
fn verify_consistency(index_len: usize, mapping_len: usize, store_len: usize) -> Result<()> {
    if index_len != mapping_len || index_len != store_len {
        return Err(VerseRagError::IndexMismatch {
            expected: store_len,
            actual: index_len,
        });
    }
    Ok(())
}

/// Filter similarity-sorted candidates by threshold and collect up to
/// `max_results` matches. Candidates arrive sorted descending, so stopping
/// early preserves ranking; no re-sort.
fn collect_matches(
    candidates: &[(usize, f32)],
    mapping: &[usize],
    store: &VerseStore,
    max_results: usize,
    min_similarity: f64,
) -> Result<Vec<ScoredVerse>> {
    let mut results = Vec::new();
    for &(internal_id, similarity) in candidates {
        let similarity = f64::from(similarity);
        if similarity < min_similarity {
            continue;
        }

        let verse_position = *mapping.get(internal_id).ok_or(VerseRagError::IndexMismatch {
            expected: mapping.len(),
            actual: internal_id + 1,
        })?;
        let verse = store.get(verse_position).ok_or(VerseRagError::IndexMismatch {
            expected: store.len(),
            actual: verse_position + 1,
        })?;

        results.push(ScoredVerse {
            verse: verse.clone(),
            relevance_score: (similarity * 10_000.0).round() / 10_000.0,
        });

        if results.len() >= max_results {
            break;
        }
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Verse;

    fn store() -> VerseStore {
        VerseStore::from_verses(vec![
            Verse::new("Genesis", 1, 1, "In the beginning."),
            Verse::new("John", 3, 16, "For God so loved the world."),
            Verse::new("Psalms", 23, 1, "The LORD is my shepherd."),
        ])
    }

    fn searcher(config: &AppConfig) -> SemanticSearcher {
        SemanticSearcher::new(Arc::new(store()), config).unwrap()
    }

    #[tokio::test]
    async fn test_empty_query_is_empty_result_even_without_index() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.cache.dir = dir.path().to_path_buf();

        let searcher = searcher(&config);
        assert!(!searcher.is_available());
        assert_eq!(searcher.search("", 10, None).await.unwrap(), Vec::new());
        assert_eq!(searcher.search("   ", 10, None).await.unwrap(), Vec::new());
    }

    #[test]
    fn test_build_batch_size_comes_from_config() {
        let mut config = AppConfig::default();
        config.embeddings.batch_size = 64;
        assert_eq!(searcher(&config).batch_size, 64);
    }

    #[test]
    fn test_verify_consistency_accepts_equal_counts() {
        assert!(verify_consistency(3, 3, 3).is_ok());
    }

    #[test]
    fn test_verify_consistency_rejects_mismatch() {
        let err = verify_consistency(2, 3, 3).unwrap_err();
        assert!(matches!(
            err,
            VerseRagError::IndexMismatch {
                expected: 3,
                actual: 2
            }
        ));
        assert!(verify_consistency(3, 3, 4).is_err());
    }

    #[test]
    fn test_collect_matches_filters_below_threshold() {
        let store = store();
        let candidates = vec![(1, 0.9_f32), (0, 0.5), (2, 0.2)];
        let mapping = vec![0, 1, 2];
        let results = collect_matches(&candidates, &mapping, &store, 10, 0.3).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].verse.reference, "John 3:16");
        assert!(results.iter().all(|r| r.relevance_score >= 0.3));
    }

    #[test]
    fn test_collect_matches_stops_at_max_results() {
        let store = store();
        let candidates = vec![(0, 0.9_f32), (1, 0.8), (2, 0.7)];
        let mapping = vec![0, 1, 2];
        let results = collect_matches(&candidates, &mapping, &store, 2, 0.0).unwrap();
        assert_eq!(results.len(), 2);
        // Already similarity-sorted; order preserved without re-sort
        assert!(results[0].relevance_score >= results[1].relevance_score);
    }

    #[test]
    fn test_collect_matches_rounds_to_four_decimals() {
        let store = store();
        let candidates = vec![(0, 0.123_456_f32)];
        let mapping = vec![0, 1, 2];
        let results = collect_matches(&candidates, &mapping, &store, 10, 0.0).unwrap();
        assert!((results[0].relevance_score - 0.1235).abs() < 1e-9);
    }

    #[test]
    fn test_collect_matches_detects_dangling_mapping() {
        let store = store();
        let candidates = vec![(5, 0.9_f32)];
        let mapping = vec![0, 1, 2];
        let err = collect_matches(&candidates, &mapping, &store, 10, 0.0).unwrap_err();
        assert!(matches!(err, VerseRagError::IndexMismatch { .. }));
    }
}
