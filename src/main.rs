use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use advisor_api::{
    api::{create_router, AppState},
    config::Config,
    db::{
        create_pool, create_redis_client, init_schema, Cache, CatalogStore, FileStore,
        PgCatalogStore, PgProfileStore, ProfileStore,
    },
    ingest::ProgramScraper,
    services::{
        build_scorer,
        providers::{EmbeddingClient, QdrantBackend, SimilarityBackend},
        IntakeSessions, RecommendationEngine,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let (catalog, profiles): (Arc<dyn CatalogStore>, Arc<dyn ProfileStore>) =
        match &config.data_dir {
            Some(dir) => {
                let store = Arc::new(FileStore::open(dir).await?);
                let catalog: Arc<dyn CatalogStore> = store.clone();
                let profiles: Arc<dyn ProfileStore> = store;
                (catalog, profiles)
            }
            None => {
                let pool = create_pool(&config.database_url).await?;
                init_schema(&pool).await?;
                (
                    Arc::new(PgCatalogStore::new(pool.clone())),
                    Arc::new(PgProfileStore::new(pool)),
                )
            }
        };

    let backend: Option<Arc<dyn SimilarityBackend>> = if config.use_vector_search {
        let cache = match create_redis_client(&config.redis_url) {
            Ok(client) => Some(Cache::new(client)),
            Err(e) => {
                tracing::warn!(error = %e, "Redis unavailable, embedding cache disabled");
                None
            }
        };

        let embedder = EmbeddingClient::new(config.embedding_url.clone(), cache);
        let qdrant = QdrantBackend::new(
            config.qdrant_url.clone(),
            config.qdrant_api_key.clone(),
            embedder,
            config.embedding_dim,
        );

        // Recommendation calls recover from a missing backend on their own,
        // so startup only warns when the collections cannot be verified yet.
        if let Err(e) = qdrant.ensure_collections().await {
            tracing::warn!(error = %e, "Could not verify vector collections at startup");
        }

        Some(Arc::new(qdrant))
    } else {
        None
    };

    let scorer = build_scorer(config.use_vector_search, backend)?;
    let engine = Arc::new(RecommendationEngine::new(
        catalog.clone(),
        profiles,
        scorer,
    ));

    let state = AppState {
        engine,
        catalog,
        intake: IntakeSessions::new(),
        scraper: Arc::new(ProgramScraper::new()),
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
