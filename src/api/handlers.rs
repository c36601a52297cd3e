use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    ingest::IngestSummary,
    models::{
        IndexReport, Program, ProgramBrief, ProgramComparison, ProgramSummary, StudyPlan,
        UserProfile,
    },
    services::{catalog, IntakeOutcome, IntakeStep},
};

use super::AppState;

const DEFAULT_COURSE_LIMIT: usize = 5;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct RecommendQuery {
    pub user_id: i64,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct CompareQuery {
    pub first: String,
    pub second: String,
}

#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub urls: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct IndexRequest {
    #[serde(default)]
    pub program_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    #[serde(default)]
    pub background: Vec<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub preferred_program: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub text: String,
}

/// Course recommendation entry as exposed on the wire
#[derive(Debug, Serialize)]
pub struct CourseScoreResponse {
    pub name: String,
    pub score: f32,
}

/// Program recommendation entry as exposed on the wire
#[derive(Debug, Serialize)]
pub struct ProgramScoreResponse {
    pub id: String,
    pub title: String,
    pub score: f32,
}

#[derive(Debug, Serialize)]
pub struct IntakeStepResponse {
    pub step: IntakeStep,
    pub prompt: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IntakeProgressResponse {
    InProgress {
        step: IntakeStep,
        prompt: &'static str,
    },
    Completed {
        profile: UserProfile,
    },
}

// Catalog handlers

pub async fn list_programs(State(state): State<AppState>) -> AppResult<Json<Vec<ProgramBrief>>> {
    let programs = state.catalog.all_programs().await?;
    Ok(Json(programs.iter().map(ProgramBrief::from).collect()))
}

pub async fn get_program(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Program>> {
    let program = state
        .catalog
        .get_program(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Program {} not found", id)))?;

    Ok(Json(program))
}

/// Creates or replaces a program wholesale
pub async fn upsert_program(
    State(state): State<AppState>,
    Json(program): Json<Program>,
) -> AppResult<(StatusCode, Json<Program>)> {
    if program.id.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Program id must not be empty".to_string(),
        ));
    }

    state.catalog.upsert_program(&program).await?;
    Ok((StatusCode::CREATED, Json(program)))
}

pub async fn delete_program(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    if state.catalog.delete_program(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Program {} not found", id)))
    }
}

pub async fn program_summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ProgramSummary>> {
    let program = state
        .catalog
        .get_program(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Program {} not found", id)))?;

    Ok(Json(catalog::summarize(&program)))
}

pub async fn compare_programs(
    State(state): State<AppState>,
    Query(query): Query<CompareQuery>,
) -> AppResult<Json<ProgramComparison>> {
    let first = state
        .catalog
        .get_program(&query.first)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Program {} not found", query.first)))?;
    let second = state
        .catalog
        .get_program(&query.second)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Program {} not found", query.second)))?;

    Ok(Json(catalog::compare(&first, &second)))
}

// Ingestion and indexing handlers

pub async fn ingest(
    State(state): State<AppState>,
    Json(request): Json<IngestRequest>,
) -> AppResult<Json<IngestSummary>> {
    if request.urls.is_empty() {
        return Err(AppError::InvalidInput(
            "Must provide at least one URL".to_string(),
        ));
    }

    let summary = state
        .scraper
        .ingest_all(state.catalog.as_ref(), &request.urls)
        .await?;

    Ok(Json(summary))
}

pub async fn index_catalog(
    State(state): State<AppState>,
    Json(request): Json<IndexRequest>,
) -> AppResult<Json<IndexReport>> {
    let report = state
        .engine
        .index_catalog(request.program_id.as_deref())
        .await?;

    Ok(Json(report))
}

// Profile handlers

pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> AppResult<Json<UserProfile>> {
    let profile = state
        .engine
        .profile(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile for user {} not found", user_id)))?;

    Ok(Json(profile))
}

/// Stores a profile wholesale, replacing any existing one
pub async fn put_profile(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(request): Json<ProfileRequest>,
) -> AppResult<Json<UserProfile>> {
    let mut profile = UserProfile::new(user_id);
    profile.background = request.background;
    profile.interests = request.interests;
    profile.skills = request.skills;
    profile.goals = request.goals;
    profile.preferred_program = request.preferred_program;

    state.engine.save_profile(&profile).await?;
    Ok(Json(profile))
}

pub async fn delete_profile(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> AppResult<StatusCode> {
    state.intake.clear(user_id).await;
    state.engine.clear_profile(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Intake flow handlers

pub async fn begin_intake(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Json<IntakeStepResponse> {
    let step = state.intake.begin(user_id).await;
    Json(IntakeStepResponse {
        step,
        prompt: step.prompt(),
    })
}

pub async fn intake_answer(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(request): Json<AnswerRequest>,
) -> AppResult<Json<IntakeProgressResponse>> {
    match state.intake.answer(user_id, &request.text).await? {
        IntakeOutcome::InProgress { next } => Ok(Json(IntakeProgressResponse::InProgress {
            step: next,
            prompt: next.prompt(),
        })),
        IntakeOutcome::Completed(profile) => {
            state.engine.save_profile(&profile).await?;
            Ok(Json(IntakeProgressResponse::Completed { profile }))
        }
    }
}

// Recommendation handlers

pub async fn recommend_courses(
    State(state): State<AppState>,
    Path(program_id): Path<String>,
    Query(query): Query<RecommendQuery>,
) -> AppResult<Json<Vec<CourseScoreResponse>>> {
    let limit = query.limit.unwrap_or(DEFAULT_COURSE_LIMIT);
    let ranked = state
        .engine
        .recommend_courses(query.user_id, &program_id, limit)
        .await?;

    Ok(Json(
        ranked
            .into_iter()
            .map(|r| CourseScoreResponse {
                name: r.course.name,
                score: r.score,
            })
            .collect(),
    ))
}

pub async fn recommend_programs(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<Vec<ProgramScoreResponse>>> {
    let ranked = state.engine.recommend_programs(query.user_id).await?;

    Ok(Json(
        ranked
            .into_iter()
            .map(|r| ProgramScoreResponse {
                id: r.program.id,
                title: r.program.title,
                score: r.score,
            })
            .collect(),
    ))
}

pub async fn study_plan(
    State(state): State<AppState>,
    Path(program_id): Path<String>,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<StudyPlan>> {
    let plan = state
        .engine
        .build_study_plan(query.user_id, &program_id)
        .await?;

    Ok(Json(plan))
}
