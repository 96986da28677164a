//! Natural language explanation synthesis from search results
//!
//! Pure functions over already-ranked results; no I/O. The keyword variant
//! reports scores, the semantic variant adds qualitative similarity labels
//! and a common-themes line.

use std::collections::HashSet;

use crate::models::ScoredVerse;
use crate::search::keyword::query_terms;

/// Fixed stop words excluded from theme extraction (KJV-flavored)
const STOP_WORDS: &[&str] = &[
    "the", "and", "of", "to", "a", "in", "that", "is", "was", "for", "with", "as", "his", "he",
    "be", "not", "by", "but", "from", "they", "which", "this", "or", "an", "had", "on", "are",
    "were", "their", "have", "you", "shall", "it", "at", "unto", "thy", "thee", "him", "said",
    "all", "will", "them", "there", "when", "so", "what",
];

const MIN_THEME_WORD_LEN: usize = 4;
const MIN_THEME_FREQUENCY: usize = 2;
const MAX_THEMES: usize = 10;

/// Generate a natural language explanation for keyword search results
pub fn explain_results(results: &[ScoredVerse], query: &str, max_verses: usize) -> String {
    if results.is_empty() {
        return format!("No verses were found matching '{query}'.");
    }

    let shown = &results[..results.len().min(max_verses)];
    let mut parts = Vec::new();

    if results.len() == 1 {
        parts.push(format!("I found 1 verse related to '{query}':"));
    } else {
        parts.push(format!(
            "I found {} verses related to '{query}'. Here are the top {} most relevant:",
            results.len(),
            shown.len()
        ));
    }
    parts.push(String::new());

    for (i, result) in shown.iter().enumerate() {
        parts.push(format!(
            "{}. **{}** (score: {:.2})\n   \"{}\"",
            i + 1,
            result.verse.reference,
            result.relevance_score,
            result.verse.text
        ));
        parts.push(String::new());
    }

    if shown.len() > 1 {
        parts.push(book_summary(shown));
    }

    parts.join("\n")
}

/// Generate an explanation for semantic search results with similarity labels
pub fn explain_semantic_results(results: &[ScoredVerse], query: &str, max_verses: usize) -> String {
    if results.is_empty() {
        return format!("No verses were found semantically similar to: '{query}'.");
    }

    let shown = &results[..results.len().min(max_verses)];
    let mut parts = Vec::new();

    parts.push(format!(
        "Based on semantic similarity to '{query}', I found {} relevant verses. Here are the top {}:",
        results.len(),
        shown.len()
    ));
    parts.push(String::new());

    for (i, result) in shown.iter().enumerate() {
        parts.push(format!(
            "{}. **{}** ({}, similarity: {:.3})\n   \"{}\"",
            i + 1,
            result.verse.reference,
            similarity_label(result.relevance_score),
            result.relevance_score,
            result.verse.text
        ));
        parts.push(String::new());
    }

    if shown.len() >= 3 {
        let themes = extract_common_themes(shown, query);
        if !themes.is_empty() {
            let top: Vec<&str> = themes.iter().take(5).map(String::as_str).collect();
            parts.push(format!("Common themes: {}.", top.join(", ")));
        }
    }

    parts.join("\n")
}

/// Bucket a cosine similarity into a qualitative label
fn similarity_label(similarity: f64) -> &'static str {
    if similarity > 0.7 {
        "highly relevant"
    } else if similarity > 0.5 {
        "very relevant"
    } else if similarity > 0.3 {
        "relevant"
    } else {
        "somewhat relevant"
    }
}

/// One-line aggregate note about the books the shown results come from
fn book_summary(shown: &[ScoredVerse]) -> String {
    let books: HashSet<&str> = shown.iter().map(|r| r.verse.book.as_str()).collect();
    if books.len() == 1 {
        format!("All results are from {}.", shown[0].verse.book)
    } else {
        let mut sorted: Vec<&str> = books.into_iter().collect();
        sorted.sort_unstable();
        format!("Results span {} books: {}.", sorted.len(), sorted.join(", "))
    }
}

/// Extract common words across the shown verse texts, excluding stop words
/// and the query's own words. Tokens shorter than 4 characters or occurring
/// fewer than 2 times are dropped; ties keep first-encountered order.
fn extract_common_themes(shown: &[ScoredVerse], query: &str) -> Vec<String> {
    let mut excluded: HashSet<String> = STOP_WORDS.iter().map(|s| (*s).to_string()).collect();
    for term in query_terms(&query.to_lowercase()) {
        excluded.insert(term);
    }

    // Counts in first-encountered order so the later stable sort keeps ties
    // deterministic
    let mut counts: Vec<(String, usize)> = Vec::new();
    for result in shown {
        for token in query_terms(&result.verse.text.to_lowercase()) {
            if token.chars().count() < MIN_THEME_WORD_LEN || excluded.contains(&token) {
                continue;
            }
            match counts.iter_mut().find(|(word, _)| *word == token) {
                Some((_, count)) => *count += 1,
                None => counts.push((token, 1)),
            }
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .filter(|(_, count)| *count >= MIN_THEME_FREQUENCY)
        .map(|(word, _)| word)
        .take(MAX_THEMES)
        .collect()
}
