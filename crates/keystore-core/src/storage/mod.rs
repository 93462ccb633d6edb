//! Storage backends for keystore credential persistence
//!
//! Two kinds of backend:
//! 1. Persistent key-value store with explicit flush ([`FileStore`])
//! 2. Host-local item storage ([`KeychainStorage`], [`MemoryLocalStorage`])

mod traits;
mod file_store;
mod keychain;
mod memory;

pub use traits::{KeyValueStore, LocalStorage};
pub use file_store::FileStore;
pub use keychain::{KeychainStorage, DEFAULT_SERVICE_NAME};
pub use memory::MemoryLocalStorage;
