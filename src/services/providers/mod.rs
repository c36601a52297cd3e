/// Similarity backend abstraction
///
/// This module provides a pluggable architecture for vector search backends.
/// The backend owns embedding generation and vector storage; scoring code
/// talks to it only through the `SimilarityBackend` trait so that strategies
/// never depend on a concrete engine.
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::AppResult;

pub mod embedding;
pub mod qdrant;

pub use embedding::EmbeddingClient;
pub use qdrant::QdrantBackend;

/// Vector collections managed by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Courses,
    Programs,
    Profiles,
}

impl Collection {
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Courses => "courses",
            Collection::Programs => "programs",
            Collection::Profiles => "user_profiles",
        }
    }

    pub const ALL: [Collection; 3] = [
        Collection::Courses,
        Collection::Programs,
        Collection::Profiles,
    ];
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Identifier of a stored vector point
///
/// Profiles use their numeric user id directly; courses and programs use a
/// UUID derived deterministically from their natural keys, so re-indexing is
/// an upsert rather than a duplicate insert.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointId {
    Num(u64),
    Uuid(Uuid),
}

impl std::fmt::Display for PointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PointId::Num(n) => write!(f, "{}", n),
            PointId::Uuid(u) => write!(f, "{}", u),
        }
    }
}

/// Point id for a course, derived from the owning program id and course name
pub fn course_point_id(program_id: &str, course_name: &str) -> PointId {
    let key = format!("{}/{}", program_id, course_name);
    PointId::Uuid(Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes()))
}

/// Point id for a program, derived from its id
pub fn program_point_id(program_id: &str) -> PointId {
    PointId::Uuid(Uuid::new_v5(&Uuid::NAMESPACE_OID, program_id.as_bytes()))
}

/// Point id for a user profile
pub fn profile_point_id(user_id: i64) -> PointId {
    PointId::Num(user_id as u64)
}

/// One exact-match condition on a payload field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMatch {
    pub key: String,
    pub value: Value,
}

impl FieldMatch {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// One search result returned by the backend
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchHit {
    pub id: PointId,
    pub score: f32,
    #[serde(default)]
    pub payload: Value,
}

/// Trait for vector search backends
///
/// All calls may suspend on network I/O; callers treat them as suspension
/// points and supply their own deadline policy. The backend enforces its own
/// result limit on `search`.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SimilarityBackend: Send + Sync {
    /// Creates any missing collections; safe to call repeatedly
    async fn ensure_collections(&self) -> AppResult<()>;

    /// Produces a fixed-length embedding vector for arbitrary text
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>>;

    /// Writes or replaces a point; identical ids overwrite, never duplicate
    async fn upsert(
        &self,
        collection: Collection,
        id: PointId,
        vector: Vec<f32>,
        payload: Value,
    ) -> AppResult<()>;

    /// Similarity search, optionally restricted by payload field matches
    async fn search(
        &self,
        collection: Collection,
        vector: Vec<f32>,
        filter: Option<Vec<FieldMatch>>,
        limit: usize,
        score_threshold: Option<f32>,
    ) -> AppResult<Vec<SearchHit>>;

    /// Fetches the stored vector for a point, if any
    async fn retrieve_vector(
        &self,
        collection: Collection,
        id: PointId,
    ) -> AppResult<Option<Vec<f32>>>;

    /// Backend name for logging and debugging
    fn name(&self) -> &'static str;
}
