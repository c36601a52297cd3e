use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tokio::sync::RwLock;

use crate::{
    db::{CatalogStore, ProfileStore},
    error::{AppError, AppResult},
    models::{Course, Program, UserProfile},
};

const PROGRAMS_FILE: &str = "programs.json";
const PROFILES_FILE: &str = "profiles.json";

#[derive(Default)]
struct FileData {
    programs: BTreeMap<String, Program>,
    profiles: BTreeMap<i64, UserProfile>,
}

/// Flat-file store holding the whole catalog and all profiles in memory,
/// persisted as two JSON files in a data directory
///
/// Suited to development and small catalogs; every write rewrites the
/// affected file. Implements both store contracts.
pub struct FileStore {
    dir: PathBuf,
    inner: RwLock<FileData>,
}

impl FileStore {
    /// Opens the store, loading any existing JSON files
    ///
    /// Missing files start the store empty; a present but unreadable file is
    /// an error so corrupt data never silently disappears.
    pub async fn open(dir: impl AsRef<Path>) -> AppResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create data dir: {}", e)))?;

        let programs = Self::load(&dir.join(PROGRAMS_FILE)).await?;
        let profiles = Self::load(&dir.join(PROFILES_FILE)).await?;

        tracing::info!(
            dir = %dir.display(),
            programs = programs.len(),
            profiles = profiles.len(),
            "Opened flat-file store"
        );

        Ok(Self {
            dir,
            inner: RwLock::new(FileData { programs, profiles }),
        })
    }

    async fn load<K, V>(path: &Path) -> AppResult<BTreeMap<K, V>>
    where
        K: Ord + serde::de::DeserializeOwned,
        V: serde::de::DeserializeOwned,
    {
        match tokio::fs::read(path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| AppError::Internal(format!("Corrupt store file {:?}: {}", path, e))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(AppError::Internal(format!(
                "Failed to read store file {:?}: {}",
                path, e
            ))),
        }
    }

    async fn persist<K, V>(&self, file: &str, data: &BTreeMap<K, V>) -> AppResult<()>
    where
        K: Ord + serde::Serialize,
        V: serde::Serialize,
    {
        let json = serde_json::to_vec_pretty(data)
            .map_err(|e| AppError::Internal(format!("Store serialization error: {}", e)))?;

        tokio::fs::write(self.dir.join(file), json)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to write store file: {}", e)))
    }
}

#[async_trait::async_trait]
impl CatalogStore for FileStore {
    async fn get_program(&self, id: &str) -> AppResult<Option<Program>> {
        Ok(self.inner.read().await.programs.get(id).cloned())
    }

    async fn all_programs(&self) -> AppResult<Vec<Program>> {
        Ok(self.inner.read().await.programs.values().cloned().collect())
    }

    async fn elective_courses(&self, program_id: &str) -> AppResult<Vec<Course>> {
        let data = self.inner.read().await;

        Ok(data
            .programs
            .get(program_id)
            .map(|p| p.elective_courses().cloned().collect())
            .unwrap_or_default())
    }

    async fn upsert_program(&self, program: &Program) -> AppResult<()> {
        let mut data = self.inner.write().await;
        data.programs.insert(program.id.clone(), program.clone());
        self.persist(PROGRAMS_FILE, &data.programs).await
    }

    async fn delete_program(&self, id: &str) -> AppResult<bool> {
        let mut data = self.inner.write().await;
        let removed = data.programs.remove(id).is_some();
        if removed {
            self.persist(PROGRAMS_FILE, &data.programs).await?;
        }
        Ok(removed)
    }
}

#[async_trait::async_trait]
impl ProfileStore for FileStore {
    async fn get_profile(&self, user_id: i64) -> AppResult<Option<UserProfile>> {
        Ok(self.inner.read().await.profiles.get(&user_id).cloned())
    }

    async fn set_profile(&self, profile: &UserProfile) -> AppResult<()> {
        let mut data = self.inner.write().await;
        data.profiles.insert(profile.user_id, profile.clone());
        self.persist(PROFILES_FILE, &data.profiles).await
    }

    async fn clear_profile(&self, user_id: i64) -> AppResult<bool> {
        let mut data = self.inner.write().await;
        let removed = data.profiles.remove(&user_id).is_some();
        if removed {
            self.persist(PROFILES_FILE, &data.profiles).await?;
        }
        Ok(removed)
    }
}
