//! HTTP server implementation

use std::sync::Arc;

use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::handlers::AppState;
use crate::api::routes;
use crate::commentary::CommentaryService;
use crate::config::AppConfig;
use crate::search::SemanticSearcher;
use crate::store::VerseStore;
use crate::Result;

/// Build the application state from configuration
pub fn build_state(config: AppConfig) -> Result<AppState> {
    let store = Arc::new(VerseStore::from_config(&config)?);
    let semantic = Arc::new(SemanticSearcher::new(store.clone(), &config)?);
    let commentary = Arc::new(CommentaryService::new(&config)?);

    Ok(AppState {
        store,
        semantic,
        commentary,
        config: Arc::new(config),
    })
}

/// Build the full application router, API nested under /api
pub fn build_app(state: AppState, enable_cors: bool) -> Router {
    let mut app = Router::new()
        .nest("/api", routes::api_routes(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new());

    if enable_cors {
        info!("CORS enabled");
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app
}

/// Start the API server
pub async fn serve_api(
    config: AppConfig,
    host: String,
    port: u16,
    enable_cors: bool,
) -> Result<()> {
    info!("Starting verserag API server...");

    let state = build_state(config)?;
    if !state.semantic.is_available() {
        info!("Semantic index not built; /api/search/semantic will return 503");
    }

    let app = build_app(state, enable_cors);

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("API server listening on http://{}", addr);
    info!("Available endpoints:");
    info!("  GET  /api/health                 - Health check");
    info!("  POST /api/search                 - Keyword search");
    info!("  POST /api/search/semantic        - Semantic search");
    info!("  POST /api/explain                - Explained search results");
    info!("  POST /api/commentary             - LLM commentary");
    info!("  GET  /api/chapter/:book/:chapter - Chapter lookup");
    info!("  GET  /api/stats                  - Statistics");

    axum::serve(listener, app).await?;

    Ok(())
}
