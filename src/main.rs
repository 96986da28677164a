use std::sync::Arc;

use clap::Parser;
use clap::Subcommand;
use tracing::info;
use verserag::commentary::CommentaryService;
use verserag::config::AppConfig;
use verserag::explain;
use verserag::search;
use verserag::search::BuildOutcome;
use verserag::search::SemanticSearcher;
use verserag::store::VerseStore;
use verserag::Result;

#[derive(Parser)]
#[command(name = "verserag")]
#[command(about = "Verse search, explanation and commentary over the KJV corpus")]
#[command(version)]
struct Cli {
    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Host to bind (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind (overrides config)
        #[arg(long)]
        port: Option<u16>,
        /// Enable permissive CORS
        #[arg(long)]
        cors: bool,
    },
    /// Keyword search over the corpus
    Search {
        /// Search term
        query: String,
        /// Maximum number of results
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
    /// Semantic search over the embedding index
    Semantic {
        /// Search term
        query: String,
        /// Maximum number of results
        #[arg(short, long, default_value = "10")]
        limit: usize,
        /// Minimum cosine similarity (overrides config)
        #[arg(short, long)]
        threshold: Option<f64>,
    },
    /// Search and print a natural language explanation
    Explain {
        /// Search term
        query: String,
        /// Use the semantic ranker instead of keyword scoring
        #[arg(long)]
        semantic: bool,
        /// Maximum number of results to rank
        #[arg(short, long, default_value = "10")]
        limit: usize,
        /// Maximum number of verses quoted in the explanation
        #[arg(long, default_value = "5")]
        max_verses: usize,
    },
    /// Generate LLM commentary for a query
    Commentary {
        /// Search term
        query: String,
        /// Maximum number of results to rank
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
    /// Build the embedding index
    Index {
        /// Rebuild even if the index already exists
        #[arg(short, long)]
        force: bool,
    },
    /// Show corpus and index statistics
    Stats,
    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration, then log at the level it configures
    let config = AppConfig::load()?;
    verserag::logging::init_from_config(&config.logging, cli.verbose)?;
    info!("Configuration loaded successfully");

    match cli.command {
        Commands::Serve { host, port, cors } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            verserag::api::serve_api(config, host, port, cors).await?;
        }
        Commands::Search { query, limit } => {
            let store = VerseStore::from_config(&config)?;
            let results = search::rank(store.verses(), &query, limit);
            print_results(&query, &results);
        }
        Commands::Semantic {
            query,
            limit,
            threshold,
        } => {
            let store = Arc::new(VerseStore::from_config(&config)?);
            let searcher = SemanticSearcher::new(store, &config)?;
            let results = searcher.search(&query, limit, threshold).await?;
            print_results(&query, &results);
        }
        Commands::Explain {
            query,
            semantic,
            limit,
            max_verses,
        } => {
            let store = Arc::new(VerseStore::from_config(&config)?);
            let explanation = if semantic {
                let searcher = SemanticSearcher::new(store.clone(), &config)?;
                let results = searcher.search(&query, limit, None).await?;
                explain::explain_semantic_results(&results, &query, max_verses)
            } else {
                let results = search::rank(store.verses(), &query, limit);
                explain::explain_results(&results, &query, max_verses)
            };
            println!("{explanation}");
        }
        Commands::Commentary { query, limit } => {
            let store = Arc::new(VerseStore::from_config(&config)?);
            let searcher = SemanticSearcher::new(store.clone(), &config)?;
            let service = CommentaryService::new(&config)?;
            let results = searcher.search(&query, limit, None).await?;
            let commentary = service.generate(&query, &results).await;
            println!("{}", commentary.text);
            if !commentary.verses_used.is_empty() {
                println!();
                println!("Based on: {}", commentary.verses_used.join(", "));
            }
        }
        Commands::Index { force } => {
            let store = Arc::new(VerseStore::from_config(&config)?);
            let searcher = SemanticSearcher::new(store, &config)?;
            match searcher.build_index(force).await? {
                BuildOutcome::Skipped => {
                    println!("Index already exists. Use --force to rebuild.");
                }
                BuildOutcome::Built(count) => {
                    println!("Indexed {count} verses.");
                }
            }
        }
        Commands::Stats => {
            let store = Arc::new(VerseStore::from_config(&config)?);
            let searcher = SemanticSearcher::new(store.clone(), &config)?;
            let corpus = store.stats();
            let embeddings = searcher.stats();

            println!("Corpus:");
            println!("  Verses:   {}", corpus.total_verses);
            println!("  Books:    {}", corpus.total_books);
            println!("  Chapters: {}", corpus.total_chapters);
            println!("  Complete: {}", corpus.is_complete);
            println!("Embedding index:");
            println!("  Model:     {}", embeddings.model_name);
            println!("  Dimension: {}", embeddings.embedding_dim);
            match embeddings.total_vectors {
                Some(count) => println!("  Vectors:   {count}"),
                None => println!("  Vectors:   not built"),
            }
        }
        Commands::Config => {
            println!("Corpus file:      {}", config.corpus_file().display());
            println!("Cache dir:        {}", config.cache.dir.display());
            println!("Embedding model:  {}", config.embedding_model());
            println!("Embedding dim:    {}", config.embedding_dimension());
            println!("LLM endpoint:     {}", config.llm_endpoint());
            println!("LLM model:        {}", config.llm_model());
            println!(
                "Server:           {}:{}",
                config.server.host, config.server.port
            );
        }
    }

    Ok(())
}

fn print_results(query: &str, results: &[verserag::models::ScoredVerse]) {
    if results.is_empty() {
        println!("No verses found matching '{query}'.");
        return;
    }

    println!("Found {} verses for '{query}':", results.len());
    for (i, result) in results.iter().enumerate() {
        println!(
            "  {}. {} ({:.4})",
            i + 1,
            result.verse.reference,
            result.relevance_score
        );
        println!("     {}", result.verse.text);
    }
}
