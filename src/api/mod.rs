use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod handlers;
pub mod state;

pub use state::AppState;

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/programs",
            get(handlers::list_programs).post(handlers::upsert_program),
        )
        .route("/programs/compare", get(handlers::compare_programs))
        .route(
            "/programs/:id",
            get(handlers::get_program).delete(handlers::delete_program),
        )
        .route("/programs/:id/summary", get(handlers::program_summary))
        .route(
            "/programs/:id/recommendations",
            get(handlers::recommend_courses),
        )
        .route("/programs/:id/plan", get(handlers::study_plan))
        .route("/recommendations/programs", get(handlers::recommend_programs))
        .route(
            "/profiles/:user_id",
            get(handlers::get_profile)
                .put(handlers::put_profile)
                .delete(handlers::delete_profile),
        )
        .route("/profiles/:user_id/intake", post(handlers::begin_intake))
        .route(
            "/profiles/:user_id/intake/answers",
            post(handlers::intake_answer),
        )
        .route("/ingest", post(handlers::ingest))
        .route("/index", post(handlers::index_catalog))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
