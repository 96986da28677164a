//! LLM-backed commentary over ranked verses
//!
//! The service wraps a text-generation provider with a content-addressed
//! cache, a gibberish classifier, and a deterministic fallback. A provider
//! failure degrades to the fallback text; it never surfaces as an error to
//! the caller.

pub mod cache;
pub mod prompt;

use std::sync::Arc;

use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::config::AppConfig;
use crate::errors::Result;
use crate::errors::VerseRagError;
use crate::models::ScoredVerse;
use cache::cache_key;
use cache::CommentaryCache;
use prompt::build_prompt;
use prompt::AcceptAllClassifier;
use prompt::HeuristicClassifier;
use prompt::PromptOutcome;
use prompt::QueryClassifier;

/// References hashed into the cache key; more would make near-identical
/// result sets miss
const CACHE_KEY_REFS: usize = 10;

/// Responses shorter than this are treated as generation failures
const MIN_COMMENTARY_LEN: usize = 20;

/// How the commentary text was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentaryMode {
    /// Generated by the model (or served from cache)
    Full,
    /// Deterministic text after a provider failure
    Fallback,
    /// No verses to comment on
    Missing,
}

/// Commentary for a query, with provenance
#[derive(Debug, Clone, Serialize)]
pub struct Commentary {
    pub text: String,
    pub mode: CommentaryMode,
    pub verses_used: Vec<String>,
}

/// Minimal text-generation seam so the service can be exercised without a
/// live provider
pub trait TextGenerator: Send + Sync {
    fn complete(&self, prompt: &str) -> impl std::future::Future<Output = Result<String>> + Send;
}

/// Supported generation providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LlmProvider {
    OpenAI,
    Ollama,
}

/// Client for the configured completion endpoint
pub struct LlmClient {
    provider: LlmProvider,
    model: String,
    endpoint: String,
    api_key: String,
    temperature: f32,
    client: Client,
}

impl LlmClient {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let endpoint = config.llm_endpoint().to_string();
        let provider = if endpoint.contains("api.openai.com") {
            LlmProvider::OpenAI
        } else {
            LlmProvider::Ollama
        };

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .map_err(|e| VerseRagError::Http(e.to_string()))?;

        Ok(Self {
            provider,
            model: config.llm_model().to_string(),
            endpoint,
            api_key: config.llm_key().to_string(),
            temperature: config.llm.temperature,
            client,
        })
    }

    async fn complete_ollama(&self, prompt: &str) -> Result<String> {
        #[derive(Serialize)]
        struct Options {
            temperature: f32,
        }

        #[derive(Serialize)]
        struct OllamaRequest<'a> {
            model: &'a str,
            prompt: &'a str,
            stream: bool,
            options: Options,
        }

        #[derive(Deserialize)]
        struct OllamaResponse {
            response: String,
        }

        let url = format!("{}/api/generate", self.endpoint);
        debug!("Calling Ollama generate API: {}", url);

        let request = OllamaRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: Options {
                temperature: self.temperature,
            },
        };

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| VerseRagError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(VerseRagError::Llm(format!(
                "Ollama API error ({status}): {error_text}"
            )));
        }

        let result: OllamaResponse = response
            .json()
            .await
            .map_err(|e| VerseRagError::Llm(format!("Failed to parse response: {e}")))?;

        Ok(result.response)
    }

    async fn complete_openai(&self, prompt: &str) -> Result<String> {
        #[derive(Serialize)]
        struct Message<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Serialize)]
        struct ChatRequest<'a> {
            model: &'a str,
            messages: Vec<Message<'a>>,
            temperature: f32,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMessage,
        }

        #[derive(Deserialize)]
        struct ChoiceMessage {
            content: String,
        }

        #[derive(Deserialize)]
        struct ChatResponse {
            choices: Vec<Choice>,
        }

        let url = format!("{}/chat/completions", self.endpoint);
        debug!("Calling OpenAI chat API: {}", url);

        let request = ChatRequest {
            model: &self.model,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| VerseRagError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(VerseRagError::Llm(format!(
                "OpenAI API error ({status}): {error_text}"
            )));
        }

        let result: ChatResponse = response
            .json()
            .await
            .map_err(|e| VerseRagError::Llm(format!("Failed to parse response: {e}")))?;

        result
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| VerseRagError::Llm("No completion in response".to_string()))
    }
}

impl TextGenerator for LlmClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        match self.provider {
            LlmProvider::OpenAI => self.complete_openai(prompt).await,
            LlmProvider::Ollama => self.complete_ollama(prompt).await,
        }
    }
}

/// Commentary generation pipeline: classifier gate, cache, model, fallback
pub struct CommentaryService<G: TextGenerator = LlmClient> {
    generator: G,
    cache: CommentaryCache,
    classifier: Arc<dyn QueryClassifier>,
}

impl CommentaryService<LlmClient> {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let classifier: Arc<dyn QueryClassifier> = if config.classifier.enabled {
            Arc::new(HeuristicClassifier::new(config.classifier.clone()))
        } else {
            Arc::new(AcceptAllClassifier)
        };

        Ok(Self {
            generator: LlmClient::from_config(config)?,
            cache: CommentaryCache::new(config.commentary_cache_dir()),
            classifier,
        })
    }
}

impl<G: TextGenerator> CommentaryService<G> {
    /// Build a service around an arbitrary generator and classifier
    pub fn with_parts(
        generator: G,
        cache: CommentaryCache,
        classifier: Arc<dyn QueryClassifier>,
    ) -> Self {
        Self {
            generator,
            cache,
            classifier,
        }
    }

    /// Generate commentary for a query over its ranked verses.
    ///
    /// Never returns an error for a provider failure; that path degrades to
    /// deterministic fallback text so the caller always has something to
    /// show alongside the verses.
    pub async fn generate(&self, query: &str, verses: &[ScoredVerse]) -> Commentary {
        if verses.is_empty() {
            return Commentary {
                text: "No verses found to generate commentary.".to_string(),
                mode: CommentaryMode::Missing,
                verses_used: Vec::new(),
            };
        }

        let verses_used: Vec<String> = verses
            .iter()
            .take(CACHE_KEY_REFS)
            .map(|v| v.verse.reference.clone())
            .collect();
        let refs: Vec<&str> = verses_used.iter().map(String::as_str).collect();
        let key = cache_key(query, &refs);

        if let Some(cached) = self.cache.get(&key) {
            return Commentary {
                text: cached,
                mode: CommentaryMode::Full,
                verses_used,
            };
        }

        let prompt = match build_prompt(self.classifier.as_ref(), query, verses) {
            PromptOutcome::Prompt(prompt) => prompt,
            // Canned redirects are cheap to recompute; not worth caching
            PromptOutcome::Canned(text) => {
                info!("Classifier rejected query: {}", query);
                return Commentary {
                    text,
                    mode: CommentaryMode::Full,
                    verses_used,
                };
            }
        };

        match self.generator.complete(&prompt).await {
            Ok(raw) => {
                let text = raw.trim().to_string();
                if is_plausible_commentary(&text) {
                    self.cache.put(&key, query, &text);
                    Commentary {
                        text,
                        mode: CommentaryMode::Full,
                        verses_used,
                    }
                } else {
                    warn!("Implausible commentary response, using fallback");
                    Commentary {
                        text: fallback_text(&refs),
                        mode: CommentaryMode::Fallback,
                        verses_used,
                    }
                }
            }
            Err(e) => {
                warn!("Commentary generation failed: {e}");
                Commentary {
                    text: fallback_text(&refs),
                    mode: CommentaryMode::Fallback,
                    verses_used,
                }
            }
        }
    }
}

/// Reject degenerate completions: too short, or the model echoing the
/// prompt's scaffolding back
fn is_plausible_commentary(text: &str) -> bool {
    text.len() >= MIN_COMMENTARY_LEN
        && !text.contains("Biblical Evidence:")
        && !text.starts_with("Question:")
        && !text.starts_with("Topic:")
}

/// Deterministic text shown when generation fails, naming up to three of the
/// top references
fn fallback_text(refs: &[&str]) -> String {
    let named = match refs {
        [] => String::new(),
        [a] => (*a).to_string(),
        [a, b] => format!("{a} and {b}"),
        [a, b, c, ..] => format!("{a}, {b}, and {c}"),
    };
    format!(
        "Commentary is unavailable right now; showing the verses directly instead. \
         See {named} below for relevant passages."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClassifierConfig;
    use crate::models::Verse;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    struct StubGenerator {
        response: Result<String>,
        calls: AtomicUsize,
    }

    impl StubGenerator {
        fn ok(text: &str) -> Self {
            Self {
                response: Ok(text.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                response: Err(VerseRagError::Llm("connection refused".to_string())),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl TextGenerator for StubGenerator {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.response {
                Ok(s) => Ok(s.clone()),
                Err(_) => Err(VerseRagError::Llm("connection refused".to_string())),
            }
        }
    }

    fn service(generator: StubGenerator, dir: &std::path::Path) -> CommentaryService<StubGenerator> {
        CommentaryService::with_parts(
            generator,
            CommentaryCache::new(dir),
            Arc::new(HeuristicClassifier::new(ClassifierConfig::default())),
        )
    }

    fn verses() -> Vec<ScoredVerse> {
        vec![
            ScoredVerse {
                verse: Verse::new("John", 3, 16, "For God so loved the world."),
                relevance_score: 12.5,
            },
            ScoredVerse {
                verse: Verse::new("Romans", 5, 8, "But God commendeth his love toward us."),
                relevance_score: 9.0,
            },
        ]
    }

    #[tokio::test]
    async fn test_no_verses_yields_missing_mode() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(StubGenerator::ok("unused"), dir.path());
        let commentary = svc.generate("love", &[]).await;
        assert_eq!(commentary.mode, CommentaryMode::Missing);
        assert_eq!(commentary.text, "No verses found to generate commentary.");
        assert!(commentary.verses_used.is_empty());
    }

    #[tokio::test]
    async fn test_successful_generation_is_cached() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(
            StubGenerator::ok("According to John 3:16, God's love extends to the world."),
            dir.path(),
        );

        let first = svc.generate("love", &verses()).await;
        assert_eq!(first.mode, CommentaryMode::Full);
        assert_eq!(first.verses_used, vec!["John 3:16", "Romans 5:8"]);
        assert_eq!(svc.generator.calls.load(Ordering::SeqCst), 1);

        let second = svc.generate("love", &verses()).await;
        assert_eq!(second.mode, CommentaryMode::Full);
        assert_eq!(second.text, first.text);
        // Second call served from cache
        assert_eq!(svc.generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_provider_failure_degrades_to_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(StubGenerator::failing(), dir.path());
        let commentary = svc.generate("love", &verses()).await;
        assert_eq!(commentary.mode, CommentaryMode::Fallback);
        assert_eq!(
            commentary.text,
            "Commentary is unavailable right now; showing the verses directly instead. \
             See John 3:16 and Romans 5:8 below for relevant passages."
        );
    }

    #[tokio::test]
    async fn test_fallback_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(StubGenerator::failing(), dir.path());
        svc.generate("love", &verses()).await;
        svc.generate("love", &verses()).await;
        assert_eq!(svc.generator.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_nonsense_query_skips_generator() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(StubGenerator::ok("unused"), dir.path());
        let single = vec![ScoredVerse {
            verse: Verse::new("John", 3, 16, "For God so loved the world."),
            relevance_score: 0.4,
        }];
        let commentary = svc.generate("sdfghjkl", &single).await;
        assert_eq!(commentary.mode, CommentaryMode::Full);
        assert!(commentary.text.contains("doesn't appear to be a biblical topic"));
        assert_eq!(svc.generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_accept_all_classifier_sends_everything_to_generator() {
        let dir = tempfile::tempdir().unwrap();
        let svc = CommentaryService::with_parts(
            StubGenerator::ok("These verses describe God's love toward the world."),
            CommentaryCache::new(dir.path()),
            Arc::new(AcceptAllClassifier),
        );
        let commentary = svc.generate("sdfghjkl", &verses()).await;
        assert_eq!(commentary.mode, CommentaryMode::Full);
        assert_eq!(svc.generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_prompt_echo_triggers_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(
            StubGenerator::ok("Question: love\n\nBiblical Evidence:\nJohn 3:16"),
            dir.path(),
        );
        let commentary = svc.generate("love", &verses()).await;
        assert_eq!(commentary.mode, CommentaryMode::Fallback);
    }

    #[test]
    fn test_fallback_text_shapes() {
        assert_eq!(
            fallback_text(&["John 3:16"]),
            "Commentary is unavailable right now; showing the verses directly instead. \
             See John 3:16 below for relevant passages."
        );
        assert!(fallback_text(&["A 1:1", "B 2:2", "C 3:3", "D 4:4"])
            .contains("See A 1:1, B 2:2, and C 3:3 below"));
    }
}
