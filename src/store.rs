//! Verse store: loads the JSONL corpus once at startup, read-only after that

use std::collections::BTreeSet;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;
use tracing::info;
use tracing::warn;

use crate::config::AppConfig;
use crate::errors::Result;
use crate::errors::VerseRagError;
use crate::models::CorpusStats;
use crate::models::Verse;

/// One line of the corpus file; `reference` is derived, not stored
#[derive(Debug, Deserialize)]
struct VerseRecord {
    book: String,
    chapter: u32,
    verse: u32,
    text: String,
}

/// In-memory ordered collection of verses.
///
/// Populated once at process startup; all rankers borrow it read-only, so
/// concurrent queries need no locking.
#[derive(Debug)]
pub struct VerseStore {
    verses: Vec<Verse>,
    canonical_verse_count: usize,
    canonical_book_count: usize,
}

impl VerseStore {
    /// Load the corpus configured in `config`
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::load(
            config.corpus_file(),
            config.corpus.canonical_verse_count,
            config.corpus.canonical_book_count,
        )
    }

    /// Load verses from a line-delimited JSON file
    pub fn load<P: AsRef<Path>>(
        path: P,
        canonical_verse_count: usize,
        canonical_book_count: usize,
    ) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(VerseRagError::Corpus(format!(
                "corpus file not found: {}",
                path.display()
            )));
        }

        info!("Loading verses from {}", path.display());

        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let mut verses = Vec::new();
        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let record: VerseRecord = serde_json::from_str(trimmed).map_err(|e| {
                VerseRagError::Corpus(format!(
                    "malformed corpus line {}: {e}",
                    line_no + 1
                ))
            })?;
            verses.push(Verse::new(
                record.book,
                record.chapter,
                record.verse,
                record.text,
            ));
        }

        let books: HashSet<&str> = verses.iter().map(|v| v.book.as_str()).collect();
        info!("Loaded {} verses from {} books", verses.len(), books.len());

        if verses.len() != canonical_verse_count {
            warn!(
                "Expected {} verses, got {}",
                canonical_verse_count,
                verses.len()
            );
        }

        Ok(Self {
            verses,
            canonical_verse_count,
            canonical_book_count,
        })
    }

    /// Build a store directly from verses (used by tests and tooling)
    pub fn from_verses(verses: Vec<Verse>) -> Self {
        Self {
            canonical_verse_count: verses.len(),
            canonical_book_count: 0,
            verses,
        }
    }

    pub fn verses(&self) -> &[Verse] {
        &self.verses
    }

    pub fn len(&self) -> usize {
        self.verses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verses.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&Verse> {
        self.verses.get(position)
    }

    /// Calculate statistics about the verse collection
    pub fn stats(&self) -> CorpusStats {
        let books: BTreeSet<&str> = self.verses.iter().map(|v| v.book.as_str()).collect();
        let chapters: HashSet<(&str, u32)> = self
            .verses
            .iter()
            .map(|v| (v.book.as_str(), v.chapter))
            .collect();

        CorpusStats {
            total_verses: self.verses.len(),
            total_books: books.len(),
            total_chapters: chapters.len(),
            books: books.into_iter().map(String::from).collect(),
            canonical_verse_count: self.canonical_verse_count,
            canonical_book_count: self.canonical_book_count,
            is_complete: self.verses.len() == self.canonical_verse_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_corpus(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file
    }

    #[test]
    fn test_load_jsonl_corpus() {
        let file = write_corpus(&[
            r#"{"book":"Genesis","chapter":1,"verse":1,"text":"In the beginning God created the heaven and the earth."}"#,
            r#"{"book":"Genesis","chapter":1,"verse":2,"text":"And the earth was without form, and void."}"#,
            r#"{"book":"John","chapter":3,"verse":16,"text":"For God so loved the world."}"#,
        ]);

        let store = VerseStore::load(file.path(), 3, 2).unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.get(0).unwrap().reference, "Genesis 1:1");
        assert_eq!(store.get(2).unwrap().book, "John");

        let stats = store.stats();
        assert_eq!(stats.total_books, 2);
        assert_eq!(stats.total_chapters, 2);
        assert!(stats.is_complete);
        assert_eq!(stats.books, vec!["Genesis".to_string(), "John".to_string()]);
    }

    #[test]
    fn test_blank_lines_skipped() {
        let file = write_corpus(&[
            r#"{"book":"Genesis","chapter":1,"verse":1,"text":"In the beginning."}"#,
            "",
            r#"{"book":"Genesis","chapter":1,"verse":2,"text":"And the earth."}"#,
        ]);
        let store = VerseStore::load(file.path(), 2, 1).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_malformed_line_is_error() {
        let file = write_corpus(&[r#"{"book":"Genesis""#]);
        let err = VerseStore::load(file.path(), 1, 1).unwrap_err();
        assert!(matches!(err, VerseRagError::Corpus(_)));
    }

    #[test]
    fn test_missing_file_is_error() {
        let err = VerseStore::load("/nonexistent/corpus.jsonl", 0, 0).unwrap_err();
        assert!(matches!(err, VerseRagError::Corpus(_)));
    }

    #[test]
    fn test_incomplete_corpus_flagged() {
        let file = write_corpus(&[
            r#"{"book":"Genesis","chapter":1,"verse":1,"text":"In the beginning."}"#,
        ]);
        let store = VerseStore::load(file.path(), 31102, 66).unwrap();
        assert!(!store.stats().is_complete);
    }
}
