//! OS Keychain local storage
//!
//! Uses the system keychain as the host-local fallback:
//! - macOS: Keychain
//! - Windows: Credential Manager (DPAPI)
//! - Linux: Secret Service (GNOME Keyring, KWallet)

use keyring::Entry;
use tracing::{debug, warn};

use super::LocalStorage;
use crate::error::{Result, StoreError};

/// Default service name used for keychain entries
pub const DEFAULT_SERVICE_NAME: &str = "autokeystore";

/// Local storage backed by the OS keychain
pub struct KeychainStorage {
    service: String,
    /// Whether keychain is available
    available: bool,
}

impl KeychainStorage {
    /// Create a keychain storage for `service`, probing availability once
    pub fn new(service: &str) -> Self {
        let available = Self::test_availability(service);

        if available {
            debug!("Keychain storage is available");
        } else {
            warn!("Keychain storage is not available");
        }

        Self {
            service: service.to_string(),
            available,
        }
    }

    /// Test if the keychain is available by writing and removing a probe entry
    fn test_availability(service: &str) -> bool {
        match Entry::new(service, "__test_availability__") {
            Ok(entry) => {
                if entry.set_password("test").is_ok() {
                    let _ = entry.delete_password();
                    true
                } else {
                    false
                }
            }
            Err(_) => false,
        }
    }

    fn entry(&self, key: &str) -> Result<Entry> {
        if !self.available {
            return Err(StoreError::Keychain("Keychain not available".to_string()));
        }

        Entry::new(&self.service, key).map_err(|e| StoreError::Keychain(e.to_string()))
    }
}

impl LocalStorage for KeychainStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(StoreError::Keychain(e.to_string())),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.entry(key)?
            .set_password(value)
            .map_err(|e| StoreError::Keychain(e.to_string()))?;

        debug!("Stored key in keychain: {}", key);
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        match self.entry(key)?.delete_password() {
            Ok(()) => {
                debug!("Deleted key from keychain: {}", key);
                Ok(())
            }
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(StoreError::Keychain(e.to_string())),
        }
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn backend_name(&self) -> &'static str {
        #[cfg(target_os = "macos")]
        return "macOS Keychain";

        #[cfg(target_os = "windows")]
        return "Windows Credential Manager";

        #[cfg(target_os = "linux")]
        return "Linux Secret Service";

        #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
        return "System Keychain";
    }
}
