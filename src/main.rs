//! Folio - A multi-weblog publishing platform with built-in full-text search

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio::{
    api::{self, AppState},
    cache::create_cache,
    config::Config,
    db::{
        self,
        repositories::{
            SqlxCategoryRepository, SqlxEntryRepository, SqlxUserRepository, SqlxWeblogRepository,
        },
    },
    search::IndexManager,
    services::{
        entry::EntryService, indexing::RepositoryDocumentSource, markdown::MarkdownRenderer,
        user::UserService, weblog::WeblogService,
    },
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "folio=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Folio weblog system...");

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {:?}", config.database.driver);

    // Run migrations
    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    // Initialize cache
    let cache = create_cache(&config.cache);
    tracing::info!("Cache initialized");

    // Create repositories
    let user_repo = SqlxUserRepository::boxed(pool.clone());
    let weblog_repo = SqlxWeblogRepository::boxed(pool.clone());
    let category_repo = SqlxCategoryRepository::boxed(pool.clone());
    let entry_repo = SqlxEntryRepository::boxed(pool.clone());

    // Open the search index; rebuilds from the store when missing or stale
    let document_source = Arc::new(RepositoryDocumentSource::new(
        entry_repo.clone(),
        weblog_repo.clone(),
        category_repo.clone(),
        user_repo.clone(),
    ));
    let index_manager = IndexManager::open(&config.search, document_source).await?;
    tracing::info!("Search index ready at {}", config.search.index_path.display());

    // Initialize services
    let user_service = Arc::new(UserService::new(user_repo.clone()));
    let weblog_service = Arc::new(WeblogService::new(
        weblog_repo.clone(),
        category_repo.clone(),
        cache.clone(),
        index_manager.clone(),
    ));
    let entry_service = Arc::new(EntryService::new(
        entry_repo.clone(),
        weblog_repo,
        category_repo,
        user_repo,
        cache,
        MarkdownRenderer::new(),
        index_manager.clone(),
    ));

    // Build application state
    let state = AppState {
        pool: pool.clone(),
        user_service,
        weblog_service,
        entry_service,
        entry_repo,
        index_manager,
    };

    // Build router
    let app = api::build_router(state, &config.server.cors_origin);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
