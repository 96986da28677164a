//! Prompt construction for the commentary model
//!
//! Queries pass through a pluggable classifier first: obvious gibberish gets
//! a canned redirect without spending an LLM call. Real queries get either a
//! factual-question or thematic template with the top verses as evidence.

use crate::config::ClassifierConfig;
use crate::models::ScoredVerse;

/// Substrings that mark a query as off-topic or keyboard mashing
const NONSENSE_INDICATORS: &[&str] = &[
    "asdf", "qwerty", "recipe", "workout", "crypto", "bitcoin", "lmnop", "hjkl", "fdsa",
];

const QUESTION_WORDS: &[&str] = &["who", "what", "when", "where", "which", "name"];

/// Maximum verses quoted in a prompt
const MAX_PROMPT_VERSES: usize = 5;

/// Average score below which a gibberish query's matches are considered
/// spurious
const SPURIOUS_SCORE_FLOOR: f64 = 0.6;

/// Classifies whether a query is worth sending to the model at all
pub trait QueryClassifier: Send + Sync {
    fn is_nonsense(&self, query: &str) -> bool;
}

/// String-heuristic classifier: consonant runs, vowel absence, character
/// repetition, indicator substrings. Thresholds are configured, not
/// hard-coded; they were tuned by trial and do not necessarily generalize.
pub struct HeuristicClassifier {
    config: ClassifierConfig,
}

impl HeuristicClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }
}

impl QueryClassifier for HeuristicClassifier {
    fn is_nonsense(&self, query: &str) -> bool {
        let query_lower = query.trim().to_lowercase();
        let chars: Vec<char> = query_lower.chars().collect();
        let len = chars.len();

        if len < 2 {
            return true;
        }
        if !chars.iter().any(|c| c.is_alphabetic()) {
            return true;
        }
        if NONSENSE_INDICATORS.iter().any(|i| query_lower.contains(i)) {
            return true;
        }

        let has_vowels = chars.iter().any(|c| "aeiou".contains(*c));
        if !has_vowels && len > 3 {
            return true;
        }

        // "aaaaaaa" style repetition
        let repetition_limit = len as f64 * self.config.repetition_ratio;
        let repeating = chars
            .iter()
            .filter(|c| c.is_alphabetic())
            .any(|c| chars.iter().filter(|x| *x == c).count() as f64 > repetition_limit);
        if repeating {
            return true;
        }

        // "sdfghjkl" style keyboard mashing
        let consonants = "bcdfghjklmnpqrstvwxyz";
        let mut run = 0usize;
        let mut max_run = 0usize;
        for c in &chars {
            if consonants.contains(*c) {
                run += 1;
                max_run = max_run.max(run);
            } else {
                run = 0;
            }
        }
        max_run >= self.config.max_consonant_run
    }
}

/// Classifier that never rejects; selected when `[classifier] enabled` is off
pub struct AcceptAllClassifier;

impl QueryClassifier for AcceptAllClassifier {
    fn is_nonsense(&self, _query: &str) -> bool {
        false
    }
}

/// Either a prompt to send to the model or a canned response that makes the
/// LLM call unnecessary
#[derive(Debug, PartialEq, Eq)]
pub enum PromptOutcome {
    Prompt(String),
    Canned(String),
}

/// Build the generation prompt for a query over ranked verses
pub fn build_prompt(
    classifier: &dyn QueryClassifier,
    query: &str,
    verses: &[ScoredVerse],
) -> PromptOutcome {
    let query_lower = query.trim().to_lowercase();

    if classifier.is_nonsense(query) {
        if verses.is_empty() {
            return PromptOutcome::Canned(format!(
                "The query \"{query}\" doesn't appear to be a biblical topic. \
                 This is a Bible search tool. Please ask about biblical concepts, \
                 themes, or passages."
            ));
        }

        // Even moderate matches for gibberish are likely spurious
        let top = &verses[..verses.len().min(MAX_PROMPT_VERSES)];
        let avg_score: f64 =
            top.iter().map(|v| v.relevance_score).sum::<f64>() / top.len() as f64;
        if avg_score < SPURIOUS_SCORE_FLOOR || verses.len() < 3 {
            return PromptOutcome::Canned(format!(
                "The query \"{query}\" doesn't appear to be a biblical topic. \
                 This is a Bible search tool. Please try reformulating the \
                 question in biblical terms."
            ));
        }
    }

    let verse_context = verses
        .iter()
        .take(MAX_PROMPT_VERSES)
        .map(|v| format!("{}: \"{}\"", v.verse.reference, v.verse.text))
        .collect::<Vec<_>>()
        .join("\n");

    let is_simple_question = QUESTION_WORDS.iter().any(|w| query_lower.contains(w));

    let prompt = if is_simple_question {
        format!(
            "Question: {query}\n\n\
             Biblical Evidence:\n{verse_context}\n\n\
             Task: Answer the question in 2-3 sentences using ONLY what these Bible \
             verses say. You MUST cite specific verses (e.g., \"According to John 3:16\" \
             or \"In Matthew 5:9\"). Base your answer strictly on the verses provided.\n\n\
             Biblical Answer:"
        )
    } else {
        format!(
            "Topic: {query}\n\n\
             Biblical Evidence:\n{verse_context}\n\n\
             Task: Explain what these specific Bible verses teach about this topic in \
             2-4 sentences. You MUST reference the specific verses (e.g., \"Romans 12:1 \
             teaches...\" or \"As stated in Psalm 23:1\"). Only use what is directly \
             stated in the verses provided.\n\n\
             Biblical Summary:"
        )
    };

    PromptOutcome::Prompt(prompt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Verse;

    fn classifier() -> HeuristicClassifier {
        HeuristicClassifier::new(ClassifierConfig::default())
    }

    fn scored(reference_verse: u32, text: &str, score: f64) -> ScoredVerse {
        ScoredVerse {
            verse: Verse::new("John", 3, reference_verse, text),
            relevance_score: score,
        }
    }

    #[test]
    fn test_normal_query_accepted() {
        let c = classifier();
        assert!(!c.is_nonsense("what does the bible say about forgiveness"));
        assert!(!c.is_nonsense("love"));
    }

    #[test]
    fn test_consonant_run_rejected() {
        let c = classifier();
        assert!(c.is_nonsense("sdfghjkl"));
    }

    #[test]
    fn test_no_vowels_rejected() {
        let c = classifier();
        assert!(c.is_nonsense("bcdfg"));
    }

    #[test]
    fn test_repetition_rejected() {
        let c = classifier();
        assert!(c.is_nonsense("aaaaaaa"));
    }

    #[test]
    fn test_indicator_rejected() {
        let c = classifier();
        assert!(c.is_nonsense("best bitcoin strategy"));
    }

    #[test]
    fn test_too_short_rejected() {
        let c = classifier();
        assert!(c.is_nonsense("a"));
        assert!(c.is_nonsense("123"));
    }

    #[test]
    fn test_accept_all_classifier_accepts_everything() {
        assert!(!AcceptAllClassifier.is_nonsense("sdfghjkl"));
        assert!(!AcceptAllClassifier.is_nonsense("aaaaaaa"));
    }

    #[test]
    fn test_nonsense_without_verses_gets_canned_response() {
        let outcome = build_prompt(&classifier(), "sdfghjkl", &[]);
        assert!(matches!(outcome, PromptOutcome::Canned(_)));
    }

    #[test]
    fn test_nonsense_with_weak_matches_gets_canned_response() {
        let verses = vec![scored(16, "For God so loved the world.", 0.31)];
        let outcome = build_prompt(&classifier(), "sdfghjkl", &verses);
        assert!(matches!(outcome, PromptOutcome::Canned(_)));
    }

    #[test]
    fn test_factual_question_template() {
        let verses = vec![scored(16, "For God so loved the world.", 0.8)];
        match build_prompt(&classifier(), "who loved the world", &verses) {
            PromptOutcome::Prompt(p) => {
                assert!(p.starts_with("Question: who loved the world"));
                assert!(p.contains("John 3:16: \"For God so loved the world.\""));
                assert!(p.ends_with("Biblical Answer:"));
            }
            PromptOutcome::Canned(_) => panic!("expected a prompt"),
        }
    }

    #[test]
    fn test_thematic_template() {
        let verses = vec![scored(16, "For God so loved the world.", 0.8)];
        match build_prompt(&classifier(), "divine love", &verses) {
            PromptOutcome::Prompt(p) => {
                assert!(p.starts_with("Topic: divine love"));
                assert!(p.ends_with("Biblical Summary:"));
            }
            PromptOutcome::Canned(_) => panic!("expected a prompt"),
        }
    }

    #[test]
    fn test_prompt_limits_to_five_verses() {
        let verses: Vec<ScoredVerse> = (1..=8)
            .map(|i| scored(i, "For God so loved the world.", 0.9))
            .collect();
        match build_prompt(&classifier(), "divine love", &verses) {
            PromptOutcome::Prompt(p) => {
                assert!(p.contains("John 3:5"));
                assert!(!p.contains("John 3:6"));
            }
            PromptOutcome::Canned(_) => panic!("expected a prompt"),
        }
    }
}
