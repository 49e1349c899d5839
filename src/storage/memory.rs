use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::ClientStorage;
use crate::{Result, StoreError};

/// In-process storage. Contents die with the value.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self { Self::default() }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, String>>> {
        self.entries.lock().map_err(|_| StoreError::LockPoisoned)
    }
}

impl ClientStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}
