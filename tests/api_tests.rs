use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};
use tempfile::TempDir;

use advisor_api::api::{create_router, AppState};
use advisor_api::db::{CatalogStore, FileStore, ProfileStore};
use advisor_api::ingest::ProgramScraper;
use advisor_api::services::{build_scorer, IntakeSessions, RecommendationEngine};

/// In-process server over a flat-file store and the lexical strategy
async fn create_test_server() -> (TestServer, TempDir) {
    let dir = tempfile::tempdir().unwrap();

    let store = Arc::new(FileStore::open(dir.path()).await.unwrap());
    let catalog: Arc<dyn CatalogStore> = store.clone();
    let profiles: Arc<dyn ProfileStore> = store;

    let scorer = build_scorer(false, None).unwrap();
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

    (TestServer::new(create_router(state)).unwrap(), dir)
}

fn ai_program() -> Value {
    json!({
        "id": "ai",
        "title": "Artificial Intelligence",
        "url": "https://example.edu/program/master/ai",
        "description": "Applied deep learning program",
        "courses": [
            { "name": "Math Foundations", "kind": "mandatory", "credits": "5", "semester": "1" },
            { "name": "ML Basics", "kind": "elective", "credits": "3", "semester": "2",
              "description": "intro to machine learning" },
            { "name": "Compilers", "kind": "elective", "credits": "3", "semester": "2",
              "description": "parsing and code generation" }
        ],
        "requirements": ["Bachelor's degree in computer science"],
        "skills": ["python", "deep learning"],
        "career": ["ML Engineer"]
    })
}

#[tokio::test]
async fn test_health_check() {
    let (server, _dir) = create_test_server().await;
    let response = server.get("/health").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_create_and_get_program() {
    let (server, _dir) = create_test_server().await;

    let response = server.post("/api/v1/programs").json(&ai_program()).await;
    response.assert_status(StatusCode::CREATED);

    let response = server.get("/api/v1/programs/ai").await;
    response.assert_status_ok();
    let program: Value = response.json();
    assert_eq!(program["title"], "Artificial Intelligence");
    assert_eq!(program["courses"].as_array().unwrap().len(), 3);

    let response = server.get("/api/v1/programs").await;
    response.assert_status_ok();
    let listing: Vec<Value> = response.json();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0]["id"], "ai");
    assert_eq!(listing[0]["course_count"], 3);
}

#[tokio::test]
async fn test_get_missing_program_is_404() {
    let (server, _dir) = create_test_server().await;
    let response = server.get("/api/v1/programs/missing").await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_program_without_id_is_rejected() {
    let (server, _dir) = create_test_server().await;

    let response = server
        .post("/api/v1/programs")
        .json(&json!({ "id": "  ", "title": "Nameless" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_program() {
    let (server, _dir) = create_test_server().await;

    server.post("/api/v1/programs").json(&ai_program()).await;

    let response = server.delete("/api/v1/programs/ai").await;
    response.assert_status(StatusCode::NO_CONTENT);

    let response = server.delete("/api/v1/programs/ai").await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_program_summary() {
    let (server, _dir) = create_test_server().await;

    server.post("/api/v1/programs").json(&ai_program()).await;

    let response = server.get("/api/v1/programs/ai/summary").await;
    response.assert_status_ok();
    let summary: Value = response.json();
    assert_eq!(summary["course_count"], 3);
    assert_eq!(summary["skills"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_compare_programs_with_disjoint_skills() {
    let (server, _dir) = create_test_server().await;

    server.post("/api/v1/programs").json(&ai_program()).await;

    let mut other = ai_program();
    other["id"] = json!("law");
    other["title"] = json!("Legal Studies");
    other["skills"] = json!(["contracts", "torts"]);
    server.post("/api/v1/programs").json(&other).await;

    let response = server
        .get("/api/v1/programs/compare")
        .add_query_param("first", "ai")
        .add_query_param("second", "law")
        .await;
    response.assert_status_ok();

    let comparison: Value = response.json();
    assert!(comparison["common_skills"].as_array().unwrap().is_empty());
    assert_eq!(comparison["only_first"].as_array().unwrap().len(), 2);
    assert_eq!(comparison["only_second"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_recommendations_without_profile_are_empty() {
    let (server, _dir) = create_test_server().await;

    server.post("/api/v1/programs").json(&ai_program()).await;

    let response = server
        .get("/api/v1/programs/ai/recommendations")
        .add_query_param("user_id", 1)
        .await;
    response.assert_status_ok();

    let recommendations: Vec<Value> = response.json();
    assert!(recommendations.is_empty());
}

#[tokio::test]
async fn test_intake_flow_then_recommendations() {
    let (server, _dir) = create_test_server().await;

    server.post("/api/v1/programs").json(&ai_program()).await;

    let response = server.post("/api/v1/profiles/1/intake").await;
    response.assert_status_ok();
    let begin: Value = response.json();
    assert_eq!(begin["step"], "background");

    for (answer, expected_next) in [
        ("BSc computer science", Some("interests")),
        ("machine learning, nlp", Some("skills")),
        ("python, sql", Some("goals")),
        ("data scientist", None),
    ] {
        let response = server
            .post("/api/v1/profiles/1/intake/answers")
            .json(&json!({ "text": answer }))
            .await;
        response.assert_status_ok();
        let progress: Value = response.json();
        match expected_next {
            Some(step) => {
                assert_eq!(progress["status"], "in_progress");
                assert_eq!(progress["step"], step);
            }
            None => {
                assert_eq!(progress["status"], "completed");
                assert_eq!(progress["profile"]["user_id"], 1);
            }
        }
    }

    let response = server
        .get("/api/v1/programs/ai/recommendations")
        .add_query_param("user_id", 1)
        .await;
    response.assert_status_ok();

    let recommendations: Vec<Value> = response.json();
    assert_eq!(recommendations.len(), 2);
    // "ML Basics" matches the machine learning interest; "Compilers" matches
    // nothing and ranks below it.
    assert_eq!(recommendations[0]["name"], "ML Basics");
    assert!(
        recommendations[0]["score"].as_f64().unwrap()
            > recommendations[1]["score"].as_f64().unwrap()
    );
}

#[tokio::test]
async fn test_intake_answer_without_session_is_rejected() {
    let (server, _dir) = create_test_server().await;

    let response = server
        .post("/api/v1/profiles/9/intake/answers")
        .json(&json!({ "text": "anything" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_put_get_delete_profile() {
    let (server, _dir) = create_test_server().await;

    let response = server
        .put("/api/v1/profiles/7")
        .json(&json!({
            "background": ["BSc math"],
            "interests": ["statistics"],
            "skills": ["r"],
            "goals": ["analyst"]
        }))
        .await;
    response.assert_status_ok();

    let response = server.get("/api/v1/profiles/7").await;
    response.assert_status_ok();
    let profile: Value = response.json();
    assert_eq!(profile["interests"][0], "statistics");

    let response = server.delete("/api/v1/profiles/7").await;
    response.assert_status(StatusCode::NO_CONTENT);

    let response = server.get("/api/v1/profiles/7").await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_study_plan_for_unknown_program_is_404() {
    let (server, _dir) = create_test_server().await;

    let response = server
        .get("/api/v1/programs/missing/plan")
        .add_query_param("user_id", 1)
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_study_plan_contents() {
    let (server, _dir) = create_test_server().await;

    server.post("/api/v1/programs").json(&ai_program()).await;
    server
        .put("/api/v1/profiles/3")
        .json(&json!({
            "interests": ["machine learning"],
            "goals": ["data scientist"]
        }))
        .await;

    let response = server
        .get("/api/v1/programs/ai/plan")
        .add_query_param("user_id", 3)
        .await;
    response.assert_status_ok();

    let plan: Value = response.json();
    assert_eq!(plan["program_id"], "ai");
    assert_eq!(plan["mandatory"][0]["name"], "Math Foundations");
    assert_eq!(plan["electives"][0]["course"]["name"], "ML Basics");
    assert_eq!(plan["hints"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_program_recommendations_ranked() {
    let (server, _dir) = create_test_server().await;

    server.post("/api/v1/programs").json(&ai_program()).await;

    let mut other = ai_program();
    other["id"] = json!("law");
    other["title"] = json!("Legal Studies");
    other["description"] = json!("Contract law and litigation practice");
    other["skills"] = json!(["contracts"]);
    other["career"] = json!(["Lawyer"]);
    server.post("/api/v1/programs").json(&other).await;

    server
        .put("/api/v1/profiles/5")
        .json(&json!({
            "interests": ["deep learning"],
            "goals": ["ml engineer"]
        }))
        .await;

    let response = server
        .get("/api/v1/recommendations/programs")
        .add_query_param("user_id", 5)
        .await;
    response.assert_status_ok();

    let ranked: Vec<Value> = response.json();
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0]["id"], "ai");
    assert!(ranked[0]["score"].as_f64().unwrap() > ranked[1]["score"].as_f64().unwrap());
}

#[tokio::test]
async fn test_index_catalog_under_lexical_strategy_reports_skips() {
    let (server, _dir) = create_test_server().await;

    server.post("/api/v1/programs").json(&ai_program()).await;

    let response = server.post("/api/v1/index").json(&json!({})).await;
    response.assert_status_ok();

    let report: Value = response.json();
    assert_eq!(report["courses"], 0);
    assert_eq!(report["programs"], 0);
    // Three courses plus the program itself, all skipped without an index.
    assert_eq!(report["skipped"], 4);
}
