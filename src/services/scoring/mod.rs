/// Relevance scoring strategies
///
/// Scoring is selected once, at construction time, by resolving the
/// `use_vector_search` toggle into one of two `Scorer` implementations; the
/// engine never branches on strategy afterwards. All scores are in [0, 1].
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{Course, Program, ScoredCourse, ScoredProgram, UserProfile},
    services::providers::SimilarityBackend,
};

pub mod lexical;
pub mod vector;

pub use lexical::LexicalScorer;
pub use vector::VectorScorer;

/// Upper bound on program recommendations under either strategy
pub const PROGRAM_RECOMMENDATION_LIMIT: usize = 10;

/// A scoring strategy over profile/catalog snapshots
///
/// Ranking output is strictly descending by score with ties resolved by
/// catalog insertion order. Indexing is a no-op for strategies without a
/// vector index; the default implementations report items as skipped.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Scorer: Send + Sync {
    /// Ranks candidate courses of one program for a profile
    async fn rank_courses(
        &self,
        profile: &UserProfile,
        program: &Program,
        candidates: &[Course],
        limit: usize,
    ) -> AppResult<Vec<ScoredCourse>>;

    /// Ranks programs across the catalog for a profile
    async fn rank_programs(
        &self,
        profile: &UserProfile,
        catalog: &[Program],
    ) -> AppResult<Vec<ScoredProgram>>;

    /// Writes a course embedding to the index; returns false when skipped
    async fn index_course(&self, program: &Program, course: &Course) -> AppResult<bool> {
        let _ = (program, course);
        Ok(false)
    }

    /// Writes a program embedding to the index; returns false when skipped
    async fn index_program(&self, program: &Program) -> AppResult<bool> {
        let _ = program;
        Ok(false)
    }

    /// Writes a profile embedding to the index; returns false when skipped
    async fn index_profile(&self, profile: &UserProfile) -> AppResult<bool> {
        let _ = profile;
        Ok(false)
    }

    /// Strategy name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Resolves the configuration toggle into a concrete scoring strategy
///
/// Selecting vector search without a backend is a construction-time error;
/// the engine refuses to be built rather than failing lazily mid-call.
pub fn build_scorer(
    use_vector_search: bool,
    backend: Option<Arc<dyn SimilarityBackend>>,
) -> AppResult<Arc<dyn Scorer>> {
    match (use_vector_search, backend) {
        (true, Some(backend)) => Ok(Arc::new(VectorScorer::new(backend))),
        (true, None) => Err(AppError::InvalidConfiguration(
            "Vector search enabled but no similarity backend supplied".to_string(),
        )),
        (false, _) => Ok(Arc::new(LexicalScorer::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_scorer_lexical() {
        let scorer = build_scorer(false, None).unwrap();
        assert_eq!(scorer.name(), "lexical");
    }

    #[test]
    fn test_build_scorer_vector_without_backend_fails() {
        let err = build_scorer(true, None).err().unwrap();
        assert!(matches!(err, AppError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_build_scorer_vector_with_backend() {
        let backend: Arc<dyn SimilarityBackend> =
            Arc::new(crate::services::providers::MockSimilarityBackend::new());
        let scorer = build_scorer(true, Some(backend)).unwrap();
        assert_eq!(scorer.name(), "vector");
    }
}
