//! Storage trait definitions

use crate::error::Result;
use async_trait::async_trait;

/// Persistent string key-value store with an explicit flush.
///
/// Mutations only touch the in-memory view until [`save`](Self::save) is
/// called.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Retrieve a value by key
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a value with the given key
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a value by key. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Check if a key exists
    async fn has(&self, key: &str) -> Result<bool>;

    /// List all stored keys
    async fn keys(&self) -> Result<Vec<String>>;

    /// Flush pending mutations to durable storage
    async fn save(&self) -> Result<()>;

    /// Get a human-readable name for this storage backend
    fn backend_name(&self) -> &'static str;
}

/// Host-local string storage, modeled on the browser `localStorage` contract.
pub trait LocalStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    fn remove_item(&self, key: &str) -> Result<()>;

    /// Whether the storage can currently be used at all
    fn is_available(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str;
}
