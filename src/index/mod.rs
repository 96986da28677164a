//! Flat inner-product vector index over unit-normalized embeddings
//!
//! The index is built offline in one pass, persisted to disk, and loaded
//! read-only at query time. Inner product on unit vectors equals cosine
//! similarity, so search results come back similarity-sorted descending.

use std::cmp::Ordering;
use std::fs::File;
use std::io::BufReader;
use std::io::BufWriter;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;
use tracing::info;

use crate::errors::Result;
use crate::errors::VerseRagError;

/// Dense row-major matrix of unit-normalized vectors
#[derive(Debug, Serialize, Deserialize)]
pub struct VectorIndex {
    dimension: usize,
    vectors: Vec<f32>,
}

impl VectorIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: Vec::new(),
        }
    }

    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of vectors in the index
    pub fn len(&self) -> usize {
        if self.dimension == 0 {
            0
        } else {
            self.vectors.len() / self.dimension
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Append a vector; dimension mismatches are rejected up front
    pub fn add(&mut self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(VerseRagError::Embedding(format!(
                "cannot add vector of dimension {} to index of dimension {}",
                vector.len(),
                self.dimension
            )));
        }
        self.vectors.extend_from_slice(vector);
        Ok(())
    }

    fn row(&self, i: usize) -> &[f32] {
        &self.vectors[i * self.dimension..(i + 1) * self.dimension]
    }

    /// Exact top-k search by inner product.
    ///
    /// Returns `(internal_id, similarity)` pairs sorted by similarity
    /// descending, ties broken by ascending ID for determinism.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
        if query.len() != self.dimension {
            return Err(VerseRagError::Embedding(format!(
                "query dimension {} does not match index dimension {}",
                query.len(),
                self.dimension
            )));
        }

        let mut scored: Vec<(usize, f32)> = (0..self.len())
            .map(|i| {
                let dot: f32 = self
                    .row(i)
                    .iter()
                    .zip(query.iter())
                    .map(|(&x, &y)| x * y)
                    .sum();
                (i, dot)
            })
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        scored.truncate(k);
        Ok(scored)
    }

    /// Persist the index to disk
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        bincode::serialize_into(BufWriter::new(file), self)?;
        info!("Saved index with {} vectors to {}", self.len(), path.display());
        Ok(())
    }

    /// Load a previously persisted index
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let index: Self = bincode::deserialize_from(BufReader::new(file))?;
        info!(
            "Loaded index with {} vectors from {}",
            index.len(),
            path.display()
        );
        Ok(index)
    }
}

/// Persist the index-position to verse-position mapping
pub fn save_mapping<P: AsRef<Path>>(path: P, mapping: &[usize]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    serde_json::to_writer(BufWriter::new(file), mapping)?;
    Ok(())
}

/// Load the index-position to verse-position mapping
pub fn load_mapping<P: AsRef<Path>>(path: P) -> Result<Vec<usize>> {
    let file = File::open(path.as_ref())?;
    let mapping: Vec<usize> = serde_json::from_reader(BufReader::new(file))?;
    Ok(mapping)
}
