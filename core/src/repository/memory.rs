use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use anyhow::{anyhow, Result};

use crate::repository::traits::KeyValueStorage;

/// In-process storage. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<HashMap<String, String>>,
    read_only: Cell<bool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let storage = Self::new();
        storage.entries.borrow_mut().insert(key.to_string(), value.to_string());
        storage
    }

    /// When set, every `set` fails as if the storage quota were exhausted.
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.set(read_only);
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        if self.read_only.get() {
            return Err(anyhow!("Storage is read-only, cannot write '{}'", key));
        }
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }
}
