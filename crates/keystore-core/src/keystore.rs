//! Auto-unlock keystore cache
//!
//! Remembers the keystore password and address between runs so the wallet can
//! unlock itself. Persistence is best-effort: every backend failure is logged
//! and turned into "absent" or a no-op, and nothing is ever returned to the
//! caller as an error.
//!
//! The persistent backend is resolved once per [`AutoKeystore`] and memoized,
//! including a failed resolution. Host-local storage is looked up again on
//! every call.

use std::sync::{Arc, OnceLock};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::host::{DesktopHost, HeadlessHost, Host, HostConfig};
use crate::secret::SecretString;
use crate::storage::{KeyValueStore, LocalStorage};

/// File identifier of the persistent store
pub const STORE_FILE: &str = ".keystore.dat";

/// The values the keystore cache holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoredKey {
    Password,
    Address,
}

impl StoredKey {
    /// Key name used in every backend
    pub const fn as_str(&self) -> &'static str {
        match self {
            StoredKey::Password => "auto.keystore.password",
            StoredKey::Address => "auto.keystore.address",
        }
    }
}

impl std::fmt::Display for StoredKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of persistent backend resolution
#[derive(Clone)]
pub enum Backend {
    Persistent(Arc<dyn KeyValueStore>),
    Unavailable,
}

impl Backend {
    fn store(&self) -> Option<&Arc<dyn KeyValueStore>> {
        match self {
            Backend::Persistent(store) => Some(store),
            Backend::Unavailable => None,
        }
    }
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Persistent(store) => write!(f, "Persistent({})", store.backend_name()),
            Backend::Unavailable => f.write_str("Unavailable"),
        }
    }
}

/// One backend an operation may run against
enum Candidate {
    Persistent(Arc<dyn KeyValueStore>),
    Local(Arc<dyn LocalStorage>),
}

impl Candidate {
    fn name(&self) -> &'static str {
        match self {
            Candidate::Persistent(store) => store.backend_name(),
            Candidate::Local(storage) => storage.backend_name(),
        }
    }

    async fn read(&self, key: StoredKey) -> Result<Option<String>> {
        match self {
            Candidate::Persistent(store) => store.get(key.as_str()).await,
            Candidate::Local(storage) => storage.get_item(key.as_str()),
        }
    }

    /// Persistent writes are flushed immediately
    async fn write(&self, key: StoredKey, value: &str) -> Result<()> {
        match self {
            Candidate::Persistent(store) => {
                store.set(key.as_str(), value).await?;
                store.save().await
            }
            Candidate::Local(storage) => storage.set_item(key.as_str(), value),
        }
    }

    async fn remove(&self, key: StoredKey) -> Result<()> {
        match self {
            Candidate::Persistent(store) => {
                store.delete(key.as_str()).await?;
                store.save().await
            }
            Candidate::Local(storage) => storage.remove_item(key.as_str()),
        }
    }
}

static SHARED: OnceLock<AutoKeystore> = OnceLock::new();

/// Best-effort store for the keystore password and address
pub struct AutoKeystore {
    host: Arc<dyn Host>,
    backend: OnceCell<Backend>,
}

impl AutoKeystore {
    pub fn new(host: Arc<dyn Host>) -> Self {
        Self {
            host,
            backend: OnceCell::new(),
        }
    }

    /// Process-wide keystore.
    ///
    /// Uses the host passed to [`install_shared`](Self::install_shared) if one
    /// was installed first; otherwise a [`DesktopHost`] rooted at the platform
    /// data directory, or a [`HeadlessHost`] when there is none.
    pub fn shared() -> &'static AutoKeystore {
        SHARED.get_or_init(|| {
            let host: Arc<dyn Host> = match HostConfig::from_default_dirs() {
                Ok(config) => Arc::new(DesktopHost::new(config)),
                Err(e) => {
                    warn!("No data directory for keystore cache: {}", e);
                    Arc::new(HeadlessHost)
                }
            };
            AutoKeystore::new(host)
        })
    }

    /// Install the host behind [`shared`](Self::shared).
    ///
    /// Returns `false` if the shared keystore already exists, in which case
    /// `host` is dropped and the existing one is kept.
    pub fn install_shared(host: Arc<dyn Host>) -> bool {
        let mut installed = false;
        SHARED.get_or_init(|| {
            installed = true;
            AutoKeystore::new(host)
        });
        installed
    }

    /// Resolve the persistent backend, once.
    ///
    /// Concurrent first callers all wait on the same resolution.
    pub async fn backend(&self) -> &Backend {
        self.backend.get_or_init(|| self.resolve()).await
    }

    async fn resolve(&self) -> Backend {
        if !self.host.has_window() {
            debug!("No window context, persistent keystore cache disabled");
            return Backend::Unavailable;
        }

        match self.host.load_store(STORE_FILE).await {
            Ok(store) => {
                info!("Keystore cache using {}", store.backend_name());
                Backend::Persistent(store)
            }
            Err(e) => {
                warn!("Failed to load keystore cache {}: {}", STORE_FILE, e);
                Backend::Unavailable
            }
        }
    }

    /// Whether the persistent backend resolved successfully
    pub async fn is_persistent(&self) -> bool {
        matches!(self.backend().await, Backend::Persistent(_))
    }

    fn local(&self) -> Option<Arc<dyn LocalStorage>> {
        if !self.host.has_window() {
            return None;
        }

        match self.host.local_storage() {
            Ok(storage) => Some(storage),
            Err(e) => {
                debug!("Local storage unavailable: {}", e);
                None
            }
        }
    }

    /// Ordered candidates: the persistent store if resolved, then local
    /// storage. Local storage is only looked up once it is reached.
    async fn candidates(&self) -> impl Iterator<Item = Candidate> + '_ {
        let persistent = self.backend().await.store().cloned().map(Candidate::Persistent);

        persistent
            .into_iter()
            .chain(std::iter::once_with(move || self.local().map(Candidate::Local)).flatten())
    }

    /// Read `key` from the first backend that answers
    pub async fn get(&self, key: StoredKey) -> Option<String> {
        for candidate in self.candidates().await {
            match candidate.read(key).await {
                Ok(value) => return value,
                Err(e) => warn!("Failed to read {} from {}: {}", key, candidate.name(), e),
            }
        }

        None
    }

    /// Write `key` to the first backend that accepts it
    pub async fn set(&self, key: StoredKey, value: &str) {
        for candidate in self.candidates().await {
            match candidate.write(key, value).await {
                Ok(()) => {
                    debug!("Stored {} in {}", key, candidate.name());
                    return;
                }
                Err(e) => warn!("Failed to store {} in {}: {}", key, candidate.name(), e),
            }
        }

        debug!("No backend available, {} not persisted", key);
    }

    /// Remove `key` from every reachable backend
    pub async fn clear(&self, key: StoredKey) {
        for candidate in self.candidates().await {
            match candidate.remove(key).await {
                Ok(()) => debug!("Cleared {} from {}", key, candidate.name()),
                Err(e) => warn!("Failed to clear {} from {}: {}", key, candidate.name(), e),
            }
        }
    }

    pub async fn get_password(&self) -> Option<SecretString> {
        self.get(StoredKey::Password).await.map(SecretString::new)
    }

    pub async fn set_password(&self, password: &str) {
        self.set(StoredKey::Password, password).await
    }

    pub async fn clear_password(&self) {
        self.clear(StoredKey::Password).await
    }

    pub async fn get_address(&self) -> Option<String> {
        self.get(StoredKey::Address).await
    }

    pub async fn set_address(&self, address: &str) {
        self.set(StoredKey::Address, address).await
    }

    pub async fn clear_address(&self) {
        self.clear(StoredKey::Address).await
    }
}
