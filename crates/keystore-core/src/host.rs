//! Host environment abstraction
//!
//! A host decides whether a UI context exists, how the persistent store is
//! opened, and which local storage (if any) is reachable right now.

use async_trait::async_trait;
use directories::ProjectDirs;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::storage::{FileStore, KeyValueStore, KeychainStorage, LocalStorage, DEFAULT_SERVICE_NAME};

/// Environment the keystore runs in
#[async_trait]
pub trait Host: Send + Sync {
    /// Whether a window/UI context exists. Without one no backend is used.
    fn has_window(&self) -> bool;

    /// Open the named persistent store
    async fn load_store(&self, file: &str) -> Result<Arc<dyn KeyValueStore>>;

    /// Get the host-local storage, if it can be accessed
    fn local_storage(&self) -> Result<Arc<dyn LocalStorage>>;
}

/// Host configuration
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Directory holding the persistent store file
    pub data_dir: PathBuf,
    /// Keychain service name used for the local fallback
    pub keychain_service: String,
}

impl HostConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            keychain_service: DEFAULT_SERVICE_NAME.to_string(),
        }
    }

    /// Configuration rooted at the platform data directory
    pub fn from_default_dirs() -> Result<Self> {
        Ok(Self::new(Self::default_data_dir()?))
    }

    /// Get the default data directory
    pub fn default_data_dir() -> Result<PathBuf> {
        ProjectDirs::from("com", "symbia-labs", "autokeystore")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or(StoreError::NoDataDir)
    }

    pub fn with_keychain_service(mut self, service: impl Into<String>) -> Self {
        self.keychain_service = service.into();
        self
    }
}

/// Desktop host: file-backed persistent store with an OS keychain fallback
pub struct DesktopHost {
    config: HostConfig,
    local: OnceLock<Arc<dyn LocalStorage>>,
}

impl DesktopHost {
    pub fn new(config: HostConfig) -> Self {
        Self {
            config,
            local: OnceLock::new(),
        }
    }

    /// Use `storage` instead of the OS keychain for the local fallback
    pub fn with_local_storage(config: HostConfig, storage: Arc<dyn LocalStorage>) -> Self {
        Self {
            config,
            local: OnceLock::from(storage),
        }
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }
}

#[async_trait]
impl Host for DesktopHost {
    fn has_window(&self) -> bool {
        true
    }

    async fn load_store(&self, file: &str) -> Result<Arc<dyn KeyValueStore>> {
        let path = self.config.data_dir.join(file);
        debug!("Loading persistent store from {:?}", path);

        let store = FileStore::load(path).await?;
        Ok(Arc::new(store))
    }

    fn local_storage(&self) -> Result<Arc<dyn LocalStorage>> {
        let storage = self.local.get_or_init(|| -> Arc<dyn LocalStorage> {
            Arc::new(KeychainStorage::new(&self.config.keychain_service))
        });

        if !storage.is_available() {
            return Err(StoreError::Unavailable(format!(
                "{} not available",
                storage.backend_name()
            )));
        }

        Ok(Arc::clone(storage))
    }
}

/// Host without any UI context; every backend is unavailable
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessHost;

#[async_trait]
impl Host for HeadlessHost {
    fn has_window(&self) -> bool {
        false
    }

    async fn load_store(&self, _file: &str) -> Result<Arc<dyn KeyValueStore>> {
        Err(StoreError::Unavailable("no window context".to_string()))
    }

    fn local_storage(&self) -> Result<Arc<dyn LocalStorage>> {
        Err(StoreError::Unavailable("no window context".to_string()))
    }
}
