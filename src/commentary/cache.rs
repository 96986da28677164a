//! Content-addressed on-disk cache for generated commentary
//!
//! Keys are a sha256 hash of the query plus the sorted reference set, so the
//! same query over the same verses always hits the same entry. Writes are
//! last-writer-wins; a duplicate generation under a race is acceptable.
//! No eviction policy: entries accumulate until cleared externally.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;
use tracing::debug;
use tracing::warn;

use crate::errors::Result;

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    query: String,
    commentary: String,
    cached_at: chrono::DateTime<chrono::Utc>,
}

/// Derive the cache key for a query and the references it was answered from
pub fn cache_key(query: &str, references: &[&str]) -> String {
    let mut sorted: Vec<&str> = references.to_vec();
    sorted.sort_unstable();
    let content = format!("{query}|{}", sorted.join("|"));
    let digest = Sha256::digest(content.as_bytes());
    hex::encode(digest)
}

/// On-disk commentary cache with get/put semantics
pub struct CommentaryCache {
    dir: PathBuf,
}

impl CommentaryCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Load cached commentary if available
    pub fn get(&self, key: &str) -> Option<String> {
        let path = self.entry_path(key);
        if !path.exists() {
            return None;
        }

        match read_entry(&path) {
            Ok(entry) => {
                debug!("Commentary cache hit for query: {}", entry.query);
                Some(entry.commentary)
            }
            Err(e) => {
                warn!("Commentary cache read error: {e}");
                None
            }
        }
    }

    /// Store commentary; failures are logged, never fatal
    pub fn put(&self, key: &str, query: &str, commentary: &str) {
        if let Err(e) = self.try_put(key, query, commentary) {
            warn!("Commentary cache write error: {e}");
        }
    }

    fn try_put(&self, key: &str, query: &str, commentary: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let entry = CacheEntry {
            query: query.to_string(),
            commentary: commentary.to_string(),
            cached_at: chrono::Utc::now(),
        };
        let json = serde_json::to_string_pretty(&entry)?;
        fs::write(self.entry_path(key), json)?;
        debug!("Cached commentary for: {query}");
        Ok(())
    }
}

fn read_entry(path: &Path) -> Result<CacheEntry> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
