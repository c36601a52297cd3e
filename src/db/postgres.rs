use sqlx::{postgres::PgPoolOptions, types::Json, PgPool};

use crate::{
    db::{CatalogStore, ProfileStore},
    error::AppResult,
    models::{Course, Program, UserProfile},
};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Creates the document tables if they do not exist yet
///
/// Programs and profiles are stored as one JSONB document per row, keyed by
/// their natural id; the catalog is replaced wholesale on update, so no
/// relational decomposition is needed.
pub async fn init_schema(pool: &PgPool) -> AppResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS programs (
            id   TEXT PRIMARY KEY,
            data JSONB NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_profiles (
            user_id BIGINT PRIMARY KEY,
            data    JSONB NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Program catalog backed by PostgreSQL JSONB documents
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl CatalogStore for PgCatalogStore {
    async fn get_program(&self, id: &str) -> AppResult<Option<Program>> {
        let row: Option<(Json<Program>,)> =
            sqlx::query_as("SELECT data FROM programs WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(Json(program),)| program))
    }

    async fn all_programs(&self) -> AppResult<Vec<Program>> {
        let rows: Vec<(Json<Program>,)> =
            sqlx::query_as("SELECT data FROM programs ORDER BY id")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(|(Json(program),)| program).collect())
    }

    async fn elective_courses(&self, program_id: &str) -> AppResult<Vec<Course>> {
        let program = self.get_program(program_id).await?;

        Ok(program
            .map(|p| p.elective_courses().cloned().collect())
            .unwrap_or_default())
    }

    async fn upsert_program(&self, program: &Program) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO programs (id, data) VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE SET data = EXCLUDED.data
            "#,
        )
        .bind(&program.id)
        .bind(Json(program))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_program(&self, id: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM programs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Profile store backed by PostgreSQL JSONB documents
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ProfileStore for PgProfileStore {
    async fn get_profile(&self, user_id: i64) -> AppResult<Option<UserProfile>> {
        let row: Option<(Json<UserProfile>,)> =
            sqlx::query_as("SELECT data FROM user_profiles WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(Json(profile),)| profile))
    }

    async fn set_profile(&self, profile: &UserProfile) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_profiles (user_id, data) VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE SET data = EXCLUDED.data
            "#,
        )
        .bind(profile.user_id)
        .bind(Json(profile))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn clear_profile(&self, user_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM user_profiles WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
