//! In-memory store for tests and short-lived processes.

use std::collections::BTreeMap;
use std::sync::RwLock;

use riverdata_core::{RiverDataResult, StoreError};
use serde_json::Value;

use super::KeyValueStore;

/// A [`KeyValueStore`] backed by a locked map.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    values: RwLock<BTreeMap<String, Value>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.values.read().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> RiverDataResult<Option<Value>> {
        let values = self.values.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &Value) -> RiverDataResult<()> {
        let mut values = self.values.write().map_err(|_| StoreError::LockPoisoned)?;
        values.insert(key.to_string(), value.clone());
        Ok(())
    }

    fn keys(&self) -> RiverDataResult<Vec<String>> {
        let values = self.values.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(values.keys().cloned().collect())
    }

    fn has(&self, key: &str) -> RiverDataResult<bool> {
        let values = self.values.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(values.contains_key(key))
    }

    fn unset(&self, key: &str) -> RiverDataResult<bool> {
        let mut values = self.values.write().map_err(|_| StoreError::LockPoisoned)?;
        Ok(values.remove(key).is_some())
    }

    fn clear(&self) -> RiverDataResult<()> {
        let mut values = self.values.write().map_err(|_| StoreError::LockPoisoned)?;
        values.clear();
        Ok(())
    }
}
