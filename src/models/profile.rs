use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user's collected profile, the query side of all scoring
///
/// Built up by the guided intake flow (background → interests → skills →
/// goals) and stored as a whole; writes overwrite fields rather than merging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: i64,
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
    /// Timestamp of the last full overwrite (writes are last-write-wins)
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            background: Vec::new(),
            interests: Vec::new(),
            skills: Vec::new(),
            goals: Vec::new(),
            preferred_program: None,
            updated_at: Utc::now(),
        }
    }

    /// True when no scoring signal has been collected at all
    pub fn is_empty(&self) -> bool {
        self.background.is_empty()
            && self.interests.is_empty()
            && self.skills.is_empty()
            && self.goals.is_empty()
    }

    /// Text handed to the embedding model
    pub fn embedding_text(&self) -> String {
        self.background
            .iter()
            .chain(self.interests.iter())
            .chain(self.skills.iter())
            .chain(self.goals.iter())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}
