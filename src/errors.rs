use thiserror::Error;

#[derive(Error, Debug)]
pub enum VerseRagError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("Index encoding error: {0}")]
    IndexEncoding(#[from] bincode::Error),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Corpus error: {0}")]
    Corpus(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Query cannot be empty")]
    EmptyQuery,

    #[error("Semantic index unavailable: {0}")]
    IndexUnavailable(String),

    #[error("Index/store size mismatch: index has {actual} vectors, store has {expected} verses")]
    IndexMismatch { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, VerseRagError>;
