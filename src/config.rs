use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    pub data_file: PathBuf,
    #[serde(default = "default_canonical_verse_count")]
    pub canonical_verse_count: usize,
    #[serde(default = "default_canonical_book_count")]
    pub canonical_book_count: usize,
}

fn default_canonical_verse_count() -> usize {
    // KJV verse count from the parsed corpus
    31102
}

fn default_canonical_book_count() -> usize {
    66
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub backtrace: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    pub model: String,
    pub dimension: usize,
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_batch_size() -> usize {
    256
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_max_results")]
    pub default_max_results: usize,
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
    #[serde(default = "default_overfetch_factor")]
    pub overfetch_factor: usize,
}

fn default_max_results() -> usize {
    10
}

fn default_similarity_threshold() -> f64 {
    0.3
}

fn default_overfetch_factor() -> usize {
    3
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_max_results: default_max_results(),
            similarity_threshold: default_similarity_threshold(),
            overfetch_factor: default_overfetch_factor(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub llm_endpoint: String,
    pub llm_key: String,
    #[serde(default = "default_llm_model")]
    pub llm_model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_llm_model() -> String {
    "gemma3:27b".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

/// Thresholds for the heuristic gibberish classifier used by the commentary
/// prompt builder. Tuned by trial on real query logs; kept configurable
/// rather than hard-coded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default = "default_classifier_enabled")]
    pub enabled: bool,
    #[serde(default = "default_max_consonant_run")]
    pub max_consonant_run: usize,
    #[serde(default = "default_repetition_ratio")]
    pub repetition_ratio: f64,
}

fn default_classifier_enabled() -> bool {
    true
}

fn default_max_consonant_run() -> usize {
    5
}

fn default_repetition_ratio() -> f64 {
    0.4
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            enabled: default_classifier_enabled(),
            max_consonant_run: default_max_consonant_run(),
            repetition_ratio: default_repetition_ratio(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub corpus: CorpusConfig,
    pub cache: CacheConfig,
    pub logging: LoggingConfig,
    pub embeddings: EmbeddingsConfig,
    #[serde(default)]
    pub search: SearchConfig,
    pub llm: LlmConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from default config file path
    pub fn load() -> crate::Result<Self> {
        // Try to load from config.toml first, then fall back to config.example.toml
        if Path::new("config.toml").exists() {
            Self::from_file("config.toml")
        } else if Path::new("config.example.toml").exists() {
            tracing::warn!(
                "Using config.example.toml. Please create config.toml for production use."
            );
            Self::from_file("config.example.toml")
        } else {
            Err(crate::VerseRagError::Config(
                "No config file found. Please create config.toml or config.example.toml"
                    .to_string(),
            ))
        }
    }

    /// Get the corpus data file path
    pub fn corpus_file(&self) -> &Path {
        &self.corpus.data_file
    }

    /// Get embedding model name
    pub fn embedding_model(&self) -> &str {
        &self.embeddings.model
    }

    /// Get embedding dimension
    pub fn embedding_dimension(&self) -> usize {
        self.embeddings.dimension
    }

    /// Path to the persisted vector index
    pub fn index_file(&self) -> PathBuf {
        self.cache.dir.join("verse_index.bin")
    }

    /// Path to the index-position to verse-position mapping
    pub fn mapping_file(&self) -> PathBuf {
        self.cache.dir.join("verse_mapping.json")
    }

    /// Directory for cached commentary responses
    pub fn commentary_cache_dir(&self) -> PathBuf {
        self.cache.dir.join("commentary")
    }

    /// Default maximum number of search results
    pub fn default_max_results(&self) -> usize {
        self.search.default_max_results
    }

    /// Minimum cosine similarity for semantic matches
    pub fn similarity_threshold(&self) -> f64 {
        self.search.similarity_threshold
    }

    /// Get LLM endpoint
    pub fn llm_endpoint(&self) -> &str {
        &self.llm.llm_endpoint
    }

    /// Get LLM key
    pub fn llm_key(&self) -> &str {
        &self.llm.llm_key
    }

    /// Get LLM model
    pub fn llm_model(&self) -> &str {
        &self.llm.llm_model
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            corpus: CorpusConfig {
                data_file: PathBuf::from("kjv_chunks.jsonl"),
                canonical_verse_count: default_canonical_verse_count(),
                canonical_book_count: default_canonical_book_count(),
            },
            cache: CacheConfig {
                dir: PathBuf::from("cache"),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                backtrace: true,
            },
            embeddings: EmbeddingsConfig {
                model: "all-minilm".to_string(),
                dimension: 384,
                endpoint: "http://localhost:11434".to_string(),
                api_key: None,
                batch_size: default_batch_size(),
            },
            search: SearchConfig::default(),
            llm: LlmConfig {
                llm_endpoint: "http://localhost:11434".to_string(),
                llm_key: "ollama".to_string(),
                llm_model: default_llm_model(),
                temperature: default_temperature(),
            },
            classifier: ClassifierConfig::default(),
            server: ServerConfig::default(),
        }
    }
}
