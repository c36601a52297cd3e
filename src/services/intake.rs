use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;

use crate::{
    error::{AppError, AppResult},
    models::UserProfile,
};

/// Steps of the guided profile collection flow
///
/// One linear forward path: background → interests → skills → goals. There
/// are no backward transitions; the only way out is completing the last step
/// or an explicit clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakeStep {
    Background,
    Interests,
    Skills,
    Goals,
}

impl IntakeStep {
    /// Question shown to the user for this step
    pub fn prompt(&self) -> &'static str {
        match self {
            IntakeStep::Background => {
                "Question 1/4: What is your educational background and experience?"
            }
            IntakeStep::Interests => "Question 2/4: What topics are you interested in?",
            IntakeStep::Skills => "Question 3/4: What skills do you already have?",
            IntakeStep::Goals => "Question 4/4: What are your career goals?",
        }
    }
}

#[derive(Debug)]
struct IntakeState {
    step: IntakeStep,
    background: Vec<String>,
    interests: Vec<String>,
    skills: Vec<String>,
}

impl IntakeState {
    fn new() -> Self {
        Self {
            step: IntakeStep::Background,
            background: Vec::new(),
            interests: Vec::new(),
            skills: Vec::new(),
        }
    }
}

/// Result of submitting one intake answer
#[derive(Debug)]
pub enum IntakeOutcome {
    /// More questions remain; ask the next one
    InProgress { next: IntakeStep },
    /// All four fields collected; the assembled profile is ready to persist
    Completed(UserProfile),
}

/// Splits a free-text answer into comma-separated fragments
fn split_fragments(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// In-memory intake sessions, one per user
///
/// Session state lives only for the duration of the flow; the finished
/// profile is what gets persisted. Restarting the flow resets any
/// half-collected answers.
#[derive(Clone, Default)]
pub struct IntakeSessions {
    inner: Arc<RwLock<HashMap<i64, IntakeState>>>,
}

impl IntakeSessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts (or restarts) the flow for a user, returning the first step
    pub async fn begin(&self, user_id: i64) -> IntakeStep {
        let mut sessions = self.inner.write().await;
        sessions.insert(user_id, IntakeState::new());
        IntakeStep::Background
    }

    /// Applies one answer and advances the flow
    ///
    /// Errors when no session is active for the user; the flow must be
    /// explicitly started first.
    pub async fn answer(&self, user_id: i64, text: &str) -> AppResult<IntakeOutcome> {
        let mut sessions = self.inner.write().await;

        let state = sessions.get_mut(&user_id).ok_or_else(|| {
            AppError::InvalidInput(format!("No active intake session for user {}", user_id))
        })?;

        let fragments = split_fragments(text);

        let next = match state.step {
            IntakeStep::Background => {
                state.background = fragments;
                IntakeStep::Interests
            }
            IntakeStep::Interests => {
                state.interests = fragments;
                IntakeStep::Skills
            }
            IntakeStep::Skills => {
                state.skills = fragments;
                IntakeStep::Goals
            }
            IntakeStep::Goals => {
                let mut profile = UserProfile::new(user_id);
                profile.background = std::mem::take(&mut state.background);
                profile.interests = std::mem::take(&mut state.interests);
                profile.skills = std::mem::take(&mut state.skills);
                profile.goals = fragments;
                sessions.remove(&user_id);

                tracing::info!(user_id, "Profile intake completed");
                return Ok(IntakeOutcome::Completed(profile));
            }
        };

        state.step = next;

        Ok(IntakeOutcome::InProgress { next })
    }

    /// Drops any in-flight session; returns true when one existed
    pub async fn clear(&self, user_id: i64) -> bool {
        self.inner.write().await.remove(&user_id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_full_flow_builds_profile() {
        let sessions = IntakeSessions::new();
        assert_eq!(sessions.begin(1).await, IntakeStep::Background);

        let step = sessions.answer(1, "BSc computer science").await.unwrap();
        assert!(matches!(
            step,
            IntakeOutcome::InProgress {
                next: IntakeStep::Interests
            }
        ));

        sessions.answer(1, "machine learning, nlp").await.unwrap();
        sessions.answer(1, "python, sql").await.unwrap();

        let outcome = sessions.answer(1, "data scientist").await.unwrap();
        let IntakeOutcome::Completed(profile) = outcome else {
            panic!("expected completed profile");
        };

        assert_eq!(profile.user_id, 1);
        assert_eq!(profile.background, vec!["BSc computer science"]);
        assert_eq!(profile.interests, vec!["machine learning", "nlp"]);
        assert_eq!(profile.skills, vec!["python", "sql"]);
        assert_eq!(profile.goals, vec!["data scientist"]);
    }

    #[tokio::test]
    async fn test_answer_without_session_fails() {
        let sessions = IntakeSessions::new();
        let err = sessions.answer(2, "anything").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_begin_restarts_from_scratch() {
        let sessions = IntakeSessions::new();
        sessions.begin(3).await;
        sessions.answer(3, "old background").await.unwrap();

        // Restart: the flow is forward-only, so going back means resetting.
        assert_eq!(sessions.begin(3).await, IntakeStep::Background);

        sessions.answer(3, "new background").await.unwrap();
        sessions.answer(3, "ai").await.unwrap();
        sessions.answer(3, "rust").await.unwrap();
        let outcome = sessions.answer(3, "engineer").await.unwrap();

        let IntakeOutcome::Completed(profile) = outcome else {
            panic!("expected completed profile");
        };
        assert_eq!(profile.background, vec!["new background"]);
    }

    #[tokio::test]
    async fn test_session_is_gone_after_completion() {
        let sessions = IntakeSessions::new();
        sessions.begin(4).await;
        sessions.answer(4, "a").await.unwrap();
        sessions.answer(4, "b").await.unwrap();
        sessions.answer(4, "c").await.unwrap();
        sessions.answer(4, "d").await.unwrap();

        assert!(sessions.answer(4, "extra").await.is_err());
        assert!(!sessions.clear(4).await);
    }

    #[test]
    fn test_split_fragments_trims_and_drops_empties() {
        assert_eq!(
            split_fragments(" machine learning ,  nlp ,, "),
            vec!["machine learning".to_string(), "nlp".to_string()]
        );
        assert!(split_fragments("  ").is_empty());
    }
}
