use std::sync::Arc;
use std::time::Instant;

use crate::{
    db::{CatalogStore, ProfileStore},
    error::{AppError, AppResult},
    models::{
        IndexReport, PlanEntry, Program, ScoredCourse, ScoredProgram, StudyPlan, UserProfile,
    },
    services::scoring::Scorer,
};

const PLAN_MANDATORY_LIMIT: usize = 10;
const PLAN_ELECTIVE_LIMIT: usize = 5;
const HINT_INTERESTS: usize = 3;
const HINT_GOALS: usize = 2;

/// Orchestrates scoring across the catalog and assembles study plans
///
/// A pure request/response orchestrator over the injected stores and scoring
/// strategy; it keeps no internal state. Ranking calls recover from missing
/// data by returning empty sequences, never by surfacing an error to the
/// end user.
pub struct RecommendationEngine {
    catalog: Arc<dyn CatalogStore>,
    profiles: Arc<dyn ProfileStore>,
    scorer: Arc<dyn Scorer>,
}

impl RecommendationEngine {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        profiles: Arc<dyn ProfileStore>,
        scorer: Arc<dyn Scorer>,
    ) -> Self {
        tracing::info!(strategy = scorer.name(), "Recommendation engine ready");
        Self {
            catalog,
            profiles,
            scorer,
        }
    }

    /// Persists a profile (full overwrite) and refreshes its embedding
    ///
    /// The store write is authoritative; an indexing failure is logged and
    /// does not fail the call, so a profile never gets lost because the
    /// similarity backend was down.
    pub async fn save_profile(&self, profile: &UserProfile) -> AppResult<()> {
        self.profiles.set_profile(profile).await?;

        match self.scorer.index_profile(profile).await {
            Ok(indexed) => {
                tracing::debug!(user_id = profile.user_id, indexed, "Profile saved");
            }
            Err(e) => {
                tracing::warn!(
                    user_id = profile.user_id,
                    error = %e,
                    "Profile saved but embedding indexing failed"
                );
            }
        }

        Ok(())
    }

    pub async fn profile(&self, user_id: i64) -> AppResult<Option<UserProfile>> {
        self.profiles.get_profile(user_id).await
    }

    /// Removes the stored profile; returns true when one existed
    pub async fn clear_profile(&self, user_id: i64) -> AppResult<bool> {
        self.profiles.clear_profile(user_id).await
    }

    /// Recommends elective courses of one program for a user
    ///
    /// Output is strictly descending by score with ties in catalog order and
    /// at most `limit` entries. An unknown program, an absent or empty
    /// profile, or a program without electives all yield an empty sequence.
    pub async fn recommend_courses(
        &self,
        user_id: i64,
        program_id: &str,
        limit: usize,
    ) -> AppResult<Vec<ScoredCourse>> {
        let Some(profile) = self.profiles.get_profile(user_id).await? else {
            tracing::debug!(user_id, "No profile stored, skipping recommendations");
            return Ok(Vec::new());
        };

        if profile.is_empty() {
            return Ok(Vec::new());
        }

        let Some(program) = self.catalog.get_program(program_id).await? else {
            tracing::debug!(program_id, "Unknown program requested");
            return Ok(Vec::new());
        };

        let candidates = self.catalog.elective_courses(program_id).await?;
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let ranked = self
            .scorer
            .rank_courses(&profile, &program, &candidates, limit)
            .await?;

        tracing::info!(
            user_id,
            program_id,
            candidates = candidates.len(),
            recommended = ranked.len(),
            "Course recommendations computed"
        );

        Ok(ranked)
    }

    /// Recommends programs across the whole catalog for a user
    pub async fn recommend_programs(&self, user_id: i64) -> AppResult<Vec<ScoredProgram>> {
        let Some(profile) = self.profiles.get_profile(user_id).await? else {
            return Ok(Vec::new());
        };

        if profile.is_empty() {
            return Ok(Vec::new());
        }

        let catalog = self.catalog.all_programs().await?;
        let ranked = self.scorer.rank_programs(&profile, &catalog).await?;

        tracing::info!(
            user_id,
            programs = catalog.len(),
            recommended = ranked.len(),
            "Program recommendations computed"
        );

        Ok(ranked)
    }

    /// Assembles a study plan for one program
    ///
    /// Mandatory courses come first in catalog order, followed by the top
    /// recommended electives and hints derived from the profile fields. An
    /// unknown program is a NotFound error the transport maps to 404.
    pub async fn build_study_plan(&self, user_id: i64, program_id: &str) -> AppResult<StudyPlan> {
        let Some(program) = self.catalog.get_program(program_id).await? else {
            return Err(AppError::NotFound(format!(
                "Program {} not found",
                program_id
            )));
        };

        let mandatory: Vec<PlanEntry> = program
            .mandatory_courses()
            .take(PLAN_MANDATORY_LIMIT)
            .map(|course| PlanEntry {
                name: course.name.clone(),
                semester: course.semester.clone(),
            })
            .collect();

        let electives = self
            .recommend_courses(user_id, program_id, PLAN_ELECTIVE_LIMIT)
            .await?;

        let profile = self.profiles.get_profile(user_id).await?;
        let hints = profile.map(|p| Self::plan_hints(&p)).unwrap_or_default();

        Ok(StudyPlan {
            program_id: program.id,
            title: program.title,
            mandatory,
            electives,
            hints,
        })
    }

    /// Free-text study hints derived directly from profile fields
    fn plan_hints(profile: &UserProfile) -> Vec<String> {
        let mut hints = Vec::new();

        if !profile.interests.is_empty() {
            let interests: Vec<&str> = profile
                .interests
                .iter()
                .take(HINT_INTERESTS)
                .map(String::as_str)
                .collect();
            hints.push(format!(
                "Focus on courses related to: {}",
                interests.join(", ")
            ));
        }

        if !profile.goals.is_empty() {
            let goals: Vec<&str> = profile
                .goals
                .iter()
                .take(HINT_GOALS)
                .map(String::as_str)
                .collect();
            hints.push(format!(
                "To reach your goals ({}), pick matching electives",
                goals.join(", ")
            ));
        }

        hints
    }

    /// Indexes catalog embeddings through the similarity backend
    ///
    /// With a program id, indexes that program's courses; without one, every
    /// course and every program. Per-item failures are logged and counted as
    /// skipped, never aborting the batch. Point ids are deterministic, so
    /// re-running on an unchanged catalog upserts in place.
    pub async fn index_catalog(&self, program_id: Option<&str>) -> AppResult<IndexReport> {
        let start = Instant::now();

        let programs: Vec<Program> = match program_id {
            Some(id) => self.catalog.get_program(id).await?.into_iter().collect(),
            None => self.catalog.all_programs().await?,
        };

        let mut report = IndexReport::default();

        for program in &programs {
            for course in &program.courses {
                match self.scorer.index_course(program, course).await {
                    Ok(true) => report.courses += 1,
                    Ok(false) => report.skipped += 1,
                    Err(e) => {
                        tracing::warn!(
                            program_id = %program.id,
                            course = %course.name,
                            error = %e,
                            "Failed to index course"
                        );
                        report.skipped += 1;
                    }
                }
            }

            if program_id.is_none() {
                match self.scorer.index_program(program).await {
                    Ok(true) => report.programs += 1,
                    Ok(false) => report.skipped += 1,
                    Err(e) => {
                        tracing::warn!(
                            program_id = %program.id,
                            error = %e,
                            "Failed to index program"
                        );
                        report.skipped += 1;
                    }
                }
            }
        }

        tracing::info!(
            courses = report.courses,
            programs = report.programs,
            skipped = report.skipped,
            elapsed_ms = start.elapsed().as_millis(),
            "Catalog indexing finished"
        );

        Ok(report)
    }
}
