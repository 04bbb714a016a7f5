//! Key-value store abstraction for persisted JSON values.
//!
//! The store is a plain string-keyed map of JSON documents with no
//! transactional guarantees across calls. Key namespacing is the caller's
//! job; the reading cache only touches `readings|*` keys.

pub mod lmdb;
pub mod memory;

pub use lmdb::{LmdbStore, LmdbStoreError, DEFAULT_NAMESPACE, MAX_STORE_SIZE_MB};
pub use memory::InMemoryStore;

use riverdata_core::{RiverDataResult, StoreError};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

/// Durable string-keyed JSON storage.
///
/// Implementations must be safe to share between threads. Each call stands
/// alone; there is no isolation between a `get` and a later `set`.
pub trait KeyValueStore: Send + Sync {
    /// Get the value stored under `key`.
    fn get(&self, key: &str) -> RiverDataResult<Option<Value>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &Value) -> RiverDataResult<()>;

    /// All keys currently stored.
    fn keys(&self) -> RiverDataResult<Vec<String>>;

    /// True if `key` has a value.
    fn has(&self, key: &str) -> RiverDataResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Remove `key`. Returns false if it did not exist.
    fn unset(&self, key: &str) -> RiverDataResult<bool>;

    /// Remove every key.
    fn clear(&self) -> RiverDataResult<()>;
}

/// Typed access on top of [`KeyValueStore`].
pub trait KeyValueStoreExt: KeyValueStore {
    /// Get and deserialize the value under `key`.
    fn get_as<T: DeserializeOwned>(&self, key: &str) -> RiverDataResult<Option<T>> {
        match self.get(key)? {
            Some(value) => serde_json::from_value(value).map(Some).map_err(|e| {
                StoreError::Deserialization {
                    key: key.to_string(),
                    reason: e.to_string(),
                }
                .into()
            }),
            None => Ok(None),
        }
    }

    /// Serialize and store `value` under `key`.
    fn set_as<T: Serialize>(&self, key: &str, value: &T) -> RiverDataResult<()> {
        let value = serde_json::to_value(value).map_err(|e| StoreError::Serialization {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        self.set(key, &value)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStoreExt for S {}
