//! In-process local storage

use std::collections::HashMap;
use std::sync::RwLock;

use super::LocalStorage;
use crate::error::{Result, StoreError};

/// Local storage backed by a process-local map.
///
/// Used by headless embedders and tests; contents do not outlive the process.
#[derive(Debug, Default)]
pub struct MemoryLocalStorage {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryLocalStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        match self.items.read() {
            Ok(items) => items.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("local storage lock poisoned".to_string())
}

impl LocalStorage for MemoryLocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let items = self.items.read().map_err(|_| poisoned())?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.items.write().map_err(|_| poisoned())?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut items = self.items.write().map_err(|_| poisoned())?;
        items.remove(key);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "Memory Local Storage"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_lifecycle() {
        let storage = MemoryLocalStorage::new();
        assert!(storage.is_empty());

        storage.set_item("key", "value").unwrap();
        assert_eq!(storage.get_item("key").unwrap(), Some("value".to_string()));

        storage.set_item("key", "other").unwrap();
        assert_eq!(storage.get_item("key").unwrap(), Some("other".to_string()));
        assert_eq!(storage.len(), 1);

        storage.remove_item("key").unwrap();
        assert_eq!(storage.get_item("key").unwrap(), None);
    }

    #[test]
    fn test_len_survives_poisoned_lock() {
        let storage = std::sync::Arc::new(MemoryLocalStorage::new());
        storage.set_item("key", "value").unwrap();

        let poisoner = storage.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.items.write().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(storage.items.is_poisoned());
        assert_eq!(storage.len(), 1);
        assert!(!storage.is_empty());
    }

    #[test]
    fn test_remove_missing_item() {
        let storage = MemoryLocalStorage::new();
        storage.remove_item("missing").unwrap();
    }
}
