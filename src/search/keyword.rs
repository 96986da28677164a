//! Keyword ranker: phrase/term matching with additive relevance scoring

use std::cmp::Ordering;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::ScoredVerse;
use crate::models::Verse;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").expect("valid regex"));

const EXACT_PHRASE_BONUS: f64 = 10.0;
const PHRASE_OCCURRENCE_WEIGHT: f64 = 2.0;
const TERM_FREQUENCY_WEIGHT: f64 = 1.5;
const COVERAGE_WEIGHT: f64 = 5.0;
const POSITION_WINDOW: usize = 50;
const LENGTH_PENALTY_DIVISOR: f64 = 500.0;

/// Tokenize a query into word-character runs, preserving duplicates and order
pub fn query_terms(query: &str) -> Vec<String> {
    WORD_RE
        .find_iter(query)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Rank verses against a free-text query.
///
/// A verse is a candidate when the full lowercased query appears as a
/// substring of its text, or when at least one query term does. Candidates
/// are scored, rounded to 2 decimals, sorted descending (stable, so tied
/// verses keep store order) and truncated to `max_results`.
///
/// Empty or whitespace-only queries yield an empty list, never an error.
pub fn rank(verses: &[Verse], query: &str, max_results: usize) -> Vec<ScoredVerse> {
    let query_lower = query.trim().to_lowercase();
    if query_lower.is_empty() || max_results == 0 {
        return Vec::new();
    }

    let terms = query_terms(&query_lower);

    let mut results = Vec::new();
    for verse in verses {
        let text_lower = verse.text.to_lowercase();

        let exact_match = text_lower.contains(&query_lower);
        let matching_terms = terms.iter().filter(|t| text_lower.contains(t.as_str())).count();

        if exact_match || matching_terms > 0 {
            let score = relevance_score(
                &text_lower,
                &query_lower,
                &terms,
                exact_match,
                matching_terms,
                verse.text.chars().count(),
            );
            results.push(ScoredVerse {
                verse: verse.clone(),
                relevance_score: (score * 100.0).round() / 100.0,
            });
        }
    }

    // Stable sort: ties retain original store order
    results.sort_by(|a, b| {
        b.relevance_score
            .partial_cmp(&a.relevance_score)
            .unwrap_or(Ordering::Equal)
    });
    results.truncate(max_results);
    results
}

/// Additive relevance score. Term order matters: phrase bonus, term
/// frequency, coverage, position bonus, length penalty.
fn relevance_score(
    text_lower: &str,
    query_lower: &str,
    terms: &[String],
    exact_match: bool,
    matching_terms: usize,
    text_length: usize,
) -> f64 {
    let mut score = 0.0;

    // 1. Exact phrase match bonus, plus a bump per occurrence
    if exact_match {
        score += EXACT_PHRASE_BONUS;
        score += text_lower.matches(query_lower).count() as f64 * PHRASE_OCCURRENCE_WEIGHT;
    }

    // 2. Individual term frequency; repeated query terms are re-counted
    for term in terms {
        score += text_lower.matches(term.as_str()).count() as f64 * TERM_FREQUENCY_WEIGHT;
    }

    // 3. Term coverage over the raw term list (repeats and all). A repeated
    //    term that matches counts twice; the fraction still lands in [0, 1].
    if !terms.is_empty() {
        score += matching_terms as f64 / terms.len() as f64 * COVERAGE_WEIGHT;
    }

    // 4. Position bonus: exact matches near the start of the verse
    if exact_match {
        if let Some(byte_pos) = text_lower.find(query_lower) {
            let position = text_lower[..byte_pos].chars().count();
            if position < POSITION_WINDOW {
                score += 3.0 - (position as f64 / POSITION_WINDOW as f64 * 2.0);
            }
        }
    }

    // 5. Length penalty: prefer concise matches
    score -= text_length as f64 / LENGTH_PENALTY_DIVISOR;

    score
}

/// Look up verses by biblical reference.
///
/// Book comparison is case-insensitive; chapter is exact; when `verse` is
/// given only that verse is returned, otherwise the whole chapter. Missing
/// references produce an empty list, not an error.
pub fn search_by_reference(
    verses: &[Verse],
    book: &str,
    chapter: u32,
    verse: Option<u32>,
) -> Vec<Verse> {
    let book_lower = book.to_lowercase();
    verses
        .iter()
        .filter(|v| {
            v.book.to_lowercase() == book_lower
                && v.chapter == chapter
                && verse.map_or(true, |n| v.verse == n)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_verses() -> Vec<Verse> {
        vec![
            Verse::new(
                "John",
                3,
                16,
                "For God so loved the world, that he gave his only begotten Son, that whosoever believeth in him should not perish, but have everlasting life.",
            ),
            Verse::new("Genesis", 1, 1, "In the beginning God created the heaven and the earth."),
            Verse::new("Psalms", 23, 1, "The LORD is my shepherd; I shall not want."),
            Verse::new("John", 11, 35, "Jesus wept."),
        ]
    }

    #[test]
    fn test_empty_query_returns_empty() {
        let verses = sample_verses();
        assert!(rank(&verses, "", 10).is_empty());
        assert!(rank(&verses, "   \t ", 10).is_empty());
    }

    #[test]
    fn test_zero_max_results_returns_empty() {
        let verses = sample_verses();
        assert!(rank(&verses, "God", 0).is_empty());
    }

    #[test]
    fn test_exact_phrase_gets_bonus() {
        let verses = sample_verses();
        let results = rank(&verses, "God so loved", 10);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].verse.reference, "John 3:16");
        assert!(results[0].relevance_score >= 10.0);
    }

    #[test]
    fn test_case_insensitive_phrase_match() {
        let verses = sample_verses();
        let results = rank(&verses, "gOd So LoVeD", 10);
        assert_eq!(results.len(), 1);
        assert!(results[0].relevance_score >= 10.0);
    }

    #[test]
    fn test_unmatched_query_yields_empty_not_error() {
        let verses = sample_verses();
        assert!(rank(&verses, "xylophone quartz", 10).is_empty());
    }

    #[test]
    fn test_results_sorted_descending() {
        let verses = sample_verses();
        let results = rank(&verses, "God", 10);
        assert!(results.len() >= 2);
        for pair in results.windows(2) {
            assert!(pair[0].relevance_score >= pair[1].relevance_score);
        }
    }

    #[test]
    fn test_truncation() {
        let verses = sample_verses();
        let results = rank(&verses, "the", 2);
        assert!(results.len() <= 2);
    }

    #[test]
    fn test_tied_scores_retain_store_order() {
        let verses = vec![
            Verse::new("Mark", 1, 1, "alpha beta"),
            Verse::new("Luke", 2, 2, "alpha beta"),
        ];
        let results = rank(&verses, "alpha", 10);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].relevance_score, results[1].relevance_score);
        assert_eq!(results[0].verse.book, "Mark");
        assert_eq!(results[1].verse.book, "Luke");
    }

    #[test]
    fn test_deterministic_scoring() {
        let verses = sample_verses();
        let a = rank(&verses, "God so loved the world", 10);
        let b = rank(&verses, "God so loved the world", 10);
        assert_eq!(a, b);
    }

    #[test]
    fn test_exact_score_components() {
        // text: "alpha beta gamma" (16 chars), query: "alpha beta"
        // phrase: +10, 1 occurrence: +2
        // terms: alpha x1 -> 1.5, beta x1 -> 1.5
        // coverage: 2/2 -> +5
        // position 0: +3
        // length penalty: 16/500 = 0.032
        // total: 22.968 -> 22.97
        let verses = vec![Verse::new("Mark", 1, 1, "alpha beta gamma")];
        let results = rank(&verses, "alpha beta", 10);
        assert!((results[0].relevance_score - 22.97).abs() < 1e-9);
    }

    #[test]
    fn test_position_bonus_decays() {
        // Phrase at index 0 earns the full 3.0; a late phrase (>= 50 chars in)
        // earns nothing
        let early = Verse::new("A", 1, 1, "shepherd leads the flock");
        let late = Verse::new(
            "B",
            1,
            1,
            "and it came to pass after many days in the wilderness a shepherd appeared",
        );
        let results = rank(&[late, early], "shepherd", 10);
        assert_eq!(results[0].verse.book, "A");
    }

    #[test]
    fn test_repeated_term_coverage_recounted() {
        // query "love love" has terms [love, love]; both match, so coverage
        // is 2/2, and term frequency counts love twice
        let verses = vec![Verse::new("A", 1, 1, "love one another")];
        let results = rank(&verses, "love love", 10);
        // phrase "love love" absent; terms: 2 * (1 occurrence * 1.5) = 3.0
        // coverage 2/2 * 5 = 5.0; penalty 16/500 = 0.032 -> 7.97
        assert!((results[0].relevance_score - 7.97).abs() < 1e-9);
    }

    #[test]
    fn test_search_by_reference_chapter() {
        let verses = sample_verses();
        let found = search_by_reference(&verses, "john", 3, None);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].reference, "John 3:16");
    }

    #[test]
    fn test_search_by_reference_specific_verse() {
        let verses = sample_verses();
        let found = search_by_reference(&verses, "JOHN", 11, Some(35));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, "Jesus wept.");
    }

    #[test]
    fn test_search_by_reference_missing_is_empty() {
        let verses = sample_verses();
        assert!(search_by_reference(&verses, "Revelation", 22, None).is_empty());
        assert!(search_by_reference(&verses, "John", 3, Some(99)).is_empty());
    }
}
