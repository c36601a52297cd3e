use std::sync::Arc;

use serde_json::{json, Value};

use crate::{
    error::AppResult,
    models::{Course, Program, ScoredCourse, ScoredProgram, UserProfile},
    services::{
        providers::{
            course_point_id, profile_point_id, program_point_id, Collection, FieldMatch,
            SimilarityBackend,
        },
        scoring::{Scorer, PROGRAM_RECOMMENDATION_LIMIT},
    },
};

/// Embedding-similarity scoring delegating to a `SimilarityBackend`
///
/// A profile with no stored embedding yields an empty result set rather than
/// silently falling back to lexical matching; the caller decides whether to
/// retry with the other strategy. Backend failures degrade to empty results
/// and are logged, never retried here.
pub struct VectorScorer {
    backend: Arc<dyn SimilarityBackend>,
}

fn clamp_unit(score: f32) -> f32 {
    score.clamp(0.0, 1.0)
}

impl VectorScorer {
    pub fn new(backend: Arc<dyn SimilarityBackend>) -> Self {
        Self { backend }
    }

    /// Fetches the profile's stored embedding, treating failures as absent
    async fn profile_vector(&self, user_id: i64) -> Option<Vec<f32>> {
        match self
            .backend
            .retrieve_vector(Collection::Profiles, profile_point_id(user_id))
            .await
        {
            Ok(Some(vector)) => Some(vector),
            Ok(None) => {
                tracing::debug!(user_id, "No stored profile embedding");
                None
            }
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Profile embedding lookup failed");
                None
            }
        }
    }
}

#[async_trait::async_trait]
impl Scorer for VectorScorer {
    async fn rank_courses(
        &self,
        profile: &UserProfile,
        program: &Program,
        candidates: &[Course],
        limit: usize,
    ) -> AppResult<Vec<ScoredCourse>> {
        let Some(vector) = self.profile_vector(profile.user_id).await else {
            return Ok(Vec::new());
        };

        // The index carries course kind in the payload, so the elective-only
        // rule applies here exactly as it does for lexical scoring.
        let filter = vec![
            FieldMatch::new("program_id", program.id.as_str()),
            FieldMatch::new("kind", "elective"),
        ];

        let hits = match self
            .backend
            .search(Collection::Courses, vector, Some(filter), limit, None)
            .await
        {
            Ok(hits) => hits,
            Err(e) => {
                tracing::warn!(
                    user_id = profile.user_id,
                    program_id = %program.id,
                    error = %e,
                    "Course similarity search failed"
                );
                return Ok(Vec::new());
            }
        };

        let mut ranked = Vec::new();
        for hit in hits {
            let Some(name) = hit.payload.get("name").and_then(Value::as_str) else {
                tracing::warn!(id = %hit.id, "Search hit has no course name payload");
                continue;
            };

            if let Some(course) = candidates.iter().find(|c| c.name == name) {
                ranked.push(ScoredCourse {
                    course: course.clone(),
                    score: clamp_unit(hit.score),
                });
            }
        }

        Ok(ranked)
    }

    async fn rank_programs(
        &self,
        profile: &UserProfile,
        catalog: &[Program],
    ) -> AppResult<Vec<ScoredProgram>> {
        let Some(vector) = self.profile_vector(profile.user_id).await else {
            return Ok(Vec::new());
        };

        let hits = match self
            .backend
            .search(
                Collection::Programs,
                vector,
                None,
                PROGRAM_RECOMMENDATION_LIMIT,
                None,
            )
            .await
        {
            Ok(hits) => hits,
            Err(e) => {
                tracing::warn!(
                    user_id = profile.user_id,
                    error = %e,
                    "Program similarity search failed"
                );
                return Ok(Vec::new());
            }
        };

        let mut ranked = Vec::new();
        for hit in hits {
            let Some(program_id) = hit.payload.get("program_id").and_then(Value::as_str) else {
                tracing::warn!(id = %hit.id, "Search hit has no program id payload");
                continue;
            };

            if let Some(program) = catalog.iter().find(|p| p.id == program_id) {
                ranked.push(ScoredProgram {
                    program: program.clone(),
                    score: clamp_unit(hit.score),
                });
            }
        }

        Ok(ranked)
    }

    async fn index_course(&self, program: &Program, course: &Course) -> AppResult<bool> {
        let vector = self.backend.embed(&course.embedding_text()).await?;

        self.backend
            .upsert(
                Collection::Courses,
                course_point_id(&program.id, &course.name),
                vector,
                json!({
                    "program_id": program.id,
                    "name": course.name,
                    "kind": course.kind,
                    "semester": course.semester,
                }),
            )
            .await?;

        Ok(true)
    }

    async fn index_program(&self, program: &Program) -> AppResult<bool> {
        let vector = self.backend.embed(&program.embedding_text()).await?;

        self.backend
            .upsert(
                Collection::Programs,
                program_point_id(&program.id),
                vector,
                json!({
                    "program_id": program.id,
                    "title": program.title,
                    "skills": program.skills,
                    "career": program.career,
                }),
            )
            .await?;

        Ok(true)
    }

    async fn index_profile(&self, profile: &UserProfile) -> AppResult<bool> {
        if profile.is_empty() {
            return Ok(false);
        }

        let vector = self.backend.embed(&profile.embedding_text()).await?;

        self.backend
            .upsert(
                Collection::Profiles,
                profile_point_id(profile.user_id),
                vector,
                json!({
                    "user_id": profile.user_id,
                    "background": profile.background,
                    "interests": profile.interests,
                    "skills": profile.skills,
                    "goals": profile.goals,
                }),
            )
            .await?;

        Ok(true)
    }

    fn name(&self) -> &'static str {
        "vector"
    }
}
