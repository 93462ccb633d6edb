//! Error types for keystore-core

use thiserror::Error;

/// Result type alias for keystore operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors raised by storage backends and the settings file.
///
/// The [`AutoKeystore`](crate::AutoKeystore) surface never returns these;
/// they are logged and degraded to "absent" there.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Keychain error: {0}")]
    Keychain(String),

    #[error("Could not determine data directory")]
    NoDataDir,

    #[error("Invalid store file {path}: {reason}")]
    InvalidStoreFile { path: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
