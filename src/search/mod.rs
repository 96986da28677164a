//! Verse ranking: keyword heuristics and embedding-based semantic search
//!
//! Both rankers share the same contract: empty queries are degenerate input
//! and yield an empty list, results are similarity/score-sorted descending,
//! and output is truncated to the caller's limit.

pub mod keyword;
pub mod semantic;

pub use keyword::rank;
pub use keyword::search_by_reference;
pub use semantic::BuildOutcome;
pub use semantic::EmbeddingStats;
pub use semantic::SemanticSearcher;
