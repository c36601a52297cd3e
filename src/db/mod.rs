pub mod file;
pub mod postgres;
pub mod redis;

pub use file::FileStore;
pub use postgres::{create_pool, init_schema, PgCatalogStore, PgProfileStore};
pub use redis::{create_redis_client, Cache, CacheKey};

use crate::error::AppResult;
use crate::models::{Course, Program, UserProfile};

/// Catalog of programs and their courses
///
/// Reads are idempotent point lookups; writes replace a program wholesale.
/// Deletion is an administrative operation, not part of the recommendation
/// flow.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    async fn get_program(&self, id: &str) -> AppResult<Option<Program>>;

    async fn all_programs(&self) -> AppResult<Vec<Program>>;

    /// Elective courses of one program, in catalog order
    ///
    /// Returns an empty list when the program does not exist.
    async fn elective_courses(&self, program_id: &str) -> AppResult<Vec<Course>>;

    async fn upsert_program(&self, program: &Program) -> AppResult<()>;

    /// Returns true when a program was actually removed
    async fn delete_program(&self, id: &str) -> AppResult<bool>;
}

/// Per-user profile records
///
/// `set_profile` is a full overwrite; the store does not merge fields.
/// Concurrent writes to the same user are last-write-wins.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile(&self, user_id: i64) -> AppResult<Option<UserProfile>>;

    async fn set_profile(&self, profile: &UserProfile) -> AppResult<()>;

    /// Returns true when a profile was actually removed
    async fn clear_profile(&self, user_id: i64) -> AppResult<bool>;
}
