//! In-process content store

use crate::storage::traits::{ContentStore, StoreError, StoreKey, StoreOutcome, StoreResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Content store backed by a map; contents vanish with the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    prefix: String,
    objects: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            objects: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, HashMap<String, String>>> {
        self.objects
            .lock()
            .map_err(|e| StoreError::Database(format!("memory store lock poisoned: {}", e)))
    }

    /// Returns the payload stored under `key`, if any
    pub fn get(&self, key: &StoreKey) -> Option<String> {
        self.lock()
            .ok()
            .and_then(|objects| objects.get(&key.object_key(&self.prefix)).cloned())
    }

    /// Number of stored objects
    pub fn len(&self) -> usize {
        self.lock().map(|objects| objects.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn store_if_absent(&self, key: &StoreKey, payload: &str) -> StoreResult<StoreOutcome> {
        let mut objects = self.lock()?;
        let object_key = key.object_key(&self.prefix);
        if objects.contains_key(&object_key) {
            return Ok(StoreOutcome::already_present());
        }
        objects.insert(object_key, payload.to_string());
        Ok(StoreOutcome::written())
    }

    async fn contains(&self, key: &StoreKey) -> StoreResult<bool> {
        Ok(self.lock()?.contains_key(&key.object_key(&self.prefix)))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
