//! Core domain types: verses, scored results, and corpus statistics

use serde::Deserialize;
use serde::Serialize;

/// A single addressable unit of scripture text, keyed by book/chapter/verse.
///
/// Immutable once loaded; the position of a verse inside the store is the
/// stable ID the vector index mapping refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verse {
    pub book: String,
    pub chapter: u32,
    pub verse: u32,
    pub text: String,
    /// Display string `"{book} {chapter}:{verse}"`, derived at load time
    pub reference: String,
}

impl Verse {
    pub fn new(book: impl Into<String>, chapter: u32, verse: u32, text: impl Into<String>) -> Self {
        let book = book.into();
        let reference = format!("{book} {chapter}:{verse}");
        Self {
            book,
            chapter,
            verse,
            text: text.into(),
            reference,
        }
    }
}

/// A verse paired with a relevance score.
///
/// Keyword mode: additive heuristic score rounded to 2 decimals.
/// Semantic mode: cosine similarity rounded to 4 decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredVerse {
    #[serde(flatten)]
    pub verse: Verse,
    pub relevance_score: f64,
}

/// Statistics about the loaded corpus
#[derive(Debug, Clone, Serialize)]
pub struct CorpusStats {
    pub total_verses: usize,
    pub total_books: usize,
    pub total_chapters: usize,
    pub books: Vec<String>,
    pub canonical_verse_count: usize,
    pub canonical_book_count: usize,
    pub is_complete: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_derivation() {
        let verse = Verse::new("John", 3, 16, "For God so loved the world...");
        assert_eq!(verse.reference, "John 3:16");
    }

    #[test]
    fn test_scored_verse_serializes_flat() {
        let scored = ScoredVerse {
            verse: Verse::new("Genesis", 1, 1, "In the beginning..."),
            relevance_score: 12.5,
        };
        let json = serde_json::to_value(&scored).unwrap();
        assert_eq!(json["book"], "Genesis");
        assert_eq!(json["reference"], "Genesis 1:1");
        assert_eq!(json["relevance_score"], 12.5);
    }
}
