//! # keystore-core
//!
//! Local conveniences for the wallet keystore:
//! - Best-effort persistence of the keystore password and address, backed by
//!   a file store with a host-local (OS keychain) fallback
//! - Relay and NAT-traversal defaults for network settings

pub mod error;
pub mod host;
pub mod keystore;
pub mod network;
pub mod secret;
pub mod settings;
pub mod storage;

pub use error::{Result, StoreError};
pub use host::{DesktopHost, HeadlessHost, Host, HostConfig};
pub use keystore::{AutoKeystore, Backend, StoredKey, STORE_FILE};
pub use network::DEFAULT_RELAY_LIST;
pub use secret::SecretString;
pub use settings::{ensure_relay_defaults, ensure_relay_defaults_in_place, NetworkSettings, RelayConfig, SettingsManager};
pub use storage::{FileStore, KeyValueStore, KeychainStorage, LocalStorage, MemoryLocalStorage};
