use std::sync::Arc;

use crate::{
    db::CatalogStore, ingest::ProgramScraper, services::IntakeSessions,
    services::RecommendationEngine,
};

/// Shared application state
///
/// Everything is behind an `Arc` so handler clones stay cheap; the engine
/// owns the stores and scoring strategy, while the catalog handle serves the
/// read-only presentation endpoints directly.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RecommendationEngine>,
    pub catalog: Arc<dyn CatalogStore>,
    pub intake: IntakeSessions,
    pub scraper: Arc<ProgramScraper>,
}
