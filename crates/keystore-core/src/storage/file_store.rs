//! File-backed key-value store
//!
//! Keeps a flat JSON object (`{"key": "value"}`) on disk and an in-memory
//! copy of it. Writes are atomic via a temp file and only happen when the
//! cache is dirty.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use super::KeyValueStore;
use crate::error::{Result, StoreError};

/// File-backed key-value store
pub struct FileStore {
    /// Path of the backing file
    path: PathBuf,
    /// In-memory cache of the file contents
    cache: Arc<RwLock<StoreCache>>,
}

#[derive(Debug, Default)]
struct StoreCache {
    entries: BTreeMap<String, String>,
    /// Whether the cache has been modified since last save
    dirty: bool,
}

impl FileStore {
    /// Open the store at `path`, reading existing entries if the file exists.
    ///
    /// A missing file yields an empty store; the file is created on the first
    /// save that has something to write. A file that is not a JSON object of
    /// strings is an error.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let entries = if tokio::fs::try_exists(&path).await? {
            let contents = tokio::fs::read_to_string(&path).await?;
            Self::parse(&path, &contents)?
        } else {
            debug!("No existing store file at {:?}", path);
            BTreeMap::new()
        };

        debug!("Loaded {} entries from {:?}", entries.len(), path);

        Ok(Self {
            path,
            cache: Arc::new(RwLock::new(StoreCache {
                entries,
                dirty: false,
            })),
        })
    }

    fn parse(path: &Path, contents: &str) -> Result<BTreeMap<String, String>> {
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(contents).map_err(|e| StoreError::InvalidStoreFile {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Get the path to the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let cache = self.cache.read().await;
        Ok(cache.entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut cache = self.cache.write().await;
        cache.entries.insert(key.to_string(), value.to_string());
        cache.dirty = true;

        debug!("Set key: {}", key);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut cache = self.cache.write().await;

        if cache.entries.remove(key).is_some() {
            cache.dirty = true;
            debug!("Deleted key: {}", key);
        }

        Ok(())
    }

    async fn has(&self, key: &str) -> Result<bool> {
        let cache = self.cache.read().await;
        Ok(cache.entries.contains_key(key))
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let cache = self.cache.read().await;
        Ok(cache.entries.keys().cloned().collect())
    }

    async fn save(&self) -> Result<()> {
        // Held for the whole write so concurrent saves don't race on the temp file
        let mut cache = self.cache.write().await;

        if !cache.dirty {
            return Ok(());
        }

        let contents = serde_json::to_string_pretty(&cache.entries)?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Write atomically using a temp file
        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents).await?;
        tokio::fs::rename(&temp_path, &self.path).await?;

        cache.dirty = false;

        debug!("Saved {} entries to {:?}", cache.entries.len(), self.path);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "File Store"
    }
}
