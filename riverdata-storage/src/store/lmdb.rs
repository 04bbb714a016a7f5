//! LMDB-backed key-value store.
//!
//! Uses the heed crate (Rust bindings for LMDB) for a durable, memory-mapped
//! store that survives process restarts.
//!
//! # Key Layout
//!
//! Every key is stored as `<namespace>|<key>` in a single unnamed database,
//! so several applications can share one environment without seeing each
//! other's keys. `keys()` and `clear()` only touch the store's namespace.
//!
//! # Value Format
//!
//! Values are stored as JSON bytes.

use std::path::Path;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};
use riverdata_core::{RiverDataError, RiverDataResult, StoreError};
use serde_json::Value;

use super::KeyValueStore;

/// Namespace used when none is given.
pub const DEFAULT_NAMESPACE: &str = "riverDataWidget";

/// Largest accepted map size, 1 TiB.
pub const MAX_STORE_SIZE_MB: usize = 1 << 20;

const SEPARATOR: u8 = b'|';

/// Error type for LMDB store operations.
#[derive(Debug, thiserror::Error)]
pub enum LmdbStoreError {
    /// Failed to open or create the LMDB environment.
    #[error("Failed to open LMDB environment: {0}")]
    EnvOpen(String),

    /// Failed to open the database within the environment.
    #[error("Failed to open database: {0}")]
    DbOpen(String),

    /// Transaction error.
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// Map size is zero or above [`MAX_STORE_SIZE_MB`].
    #[error("Invalid map size: {0} MB (must be between 1 and {MAX_STORE_SIZE_MB})")]
    InvalidMapSize(usize),

    /// A stored key is not valid UTF-8.
    #[error("Invalid key bytes: {0}")]
    InvalidKey(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<LmdbStoreError> for RiverDataError {
    fn from(e: LmdbStoreError) -> Self {
        RiverDataError::Store(StoreError::Backend {
            reason: e.to_string(),
        })
    }
}

/// LMDB-backed [`KeyValueStore`].
///
/// # Example
///
/// ```ignore
/// use riverdata_storage::{KeyValueStore, LmdbStore};
///
/// let store = LmdbStore::open("/tmp/riverdata", 64)?;
/// store.set("readings|3400TH-flow--i-15_min-m3_s", &serde_json::json!({}))?;
/// ```
pub struct LmdbStore {
    /// The LMDB environment.
    env: Env,
    /// The main database (single unnamed database).
    db: Database<Bytes, Bytes>,
    /// Key prefix including the trailing separator.
    prefix: Vec<u8>,
}

impl LmdbStore {
    /// Open (or create) a store in `path` using [`DEFAULT_NAMESPACE`].
    ///
    /// # Arguments
    ///
    /// * `path` - Directory where LMDB files will be stored
    /// * `max_size_mb` - Maximum size of the database in megabytes
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `max_size_mb` is zero or above [`MAX_STORE_SIZE_MB`]
    /// - The directory cannot be created
    /// - LMDB environment cannot be opened
    /// - Database cannot be created
    pub fn open<P: AsRef<Path>>(path: P, max_size_mb: usize) -> Result<Self, LmdbStoreError> {
        Self::open_with_namespace(path, max_size_mb, DEFAULT_NAMESPACE)
    }

    /// Open a store whose keys live under `namespace`.
    pub fn open_with_namespace<P: AsRef<Path>>(
        path: P,
        max_size_mb: usize,
        namespace: &str,
    ) -> Result<Self, LmdbStoreError> {
        let map_size = map_size_bytes(max_size_mb)?;
        std::fs::create_dir_all(&path)?;

        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(1)
                .open(path.as_ref())
        }
        .map_err(|e| LmdbStoreError::EnvOpen(e.to_string()))?;

        let mut wtxn = env
            .write_txn()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        let db: Database<Bytes, Bytes> = env
            .create_database(&mut wtxn, None)
            .map_err(|e| LmdbStoreError::DbOpen(e.to_string()))?;

        wtxn.commit()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        let mut prefix = namespace.as_bytes().to_vec();
        prefix.push(SEPARATOR);

        Ok(Self { env, db, prefix })
    }

    fn encode_key(&self, key: &str) -> Vec<u8> {
        let mut encoded = Vec::with_capacity(self.prefix.len() + key.len());
        encoded.extend_from_slice(&self.prefix);
        encoded.extend_from_slice(key.as_bytes());
        encoded
    }

    /// Iterate over keys in this store's namespace and collect them.
    fn collect_namespace_keys(&self) -> Result<Vec<Vec<u8>>, LmdbStoreError> {
        let rtxn = self
            .env
            .read_txn()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        let mut keys = Vec::new();
        let iter = self
            .db
            .iter(&rtxn)
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        for result in iter {
            let (key, _) = result.map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;
            if key.starts_with(&self.prefix) {
                keys.push(key.to_vec());
            }
        }

        Ok(keys)
    }
}

impl KeyValueStore for LmdbStore {
    fn get(&self, key: &str) -> RiverDataResult<Option<Value>> {
        let rtxn = self
            .env
            .read_txn()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        let bytes = self
            .db
            .get(&rtxn, &self.encode_key(key))
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        match bytes {
            Some(bytes) => {
                let value = serde_json::from_slice(bytes).map_err(|e| StoreError::Deserialization {
                    key: key.to_string(),
                    reason: e.to_string(),
                })?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &Value) -> RiverDataResult<()> {
        let bytes = serde_json::to_vec(value).map_err(|e| StoreError::Serialization {
            key: key.to_string(),
            reason: e.to_string(),
        })?;

        let mut wtxn = self
            .env
            .write_txn()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        self.db
            .put(&mut wtxn, &self.encode_key(key), &bytes)
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        wtxn.commit()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        Ok(())
    }

    fn keys(&self) -> RiverDataResult<Vec<String>> {
        let prefix_len = self.prefix.len();
        self.collect_namespace_keys()?
            .into_iter()
            .map(|key| {
                String::from_utf8(key[prefix_len..].to_vec())
                    .map_err(|e| LmdbStoreError::InvalidKey(e.to_string()).into())
            })
            .collect()
    }

    fn unset(&self, key: &str) -> RiverDataResult<bool> {
        let mut wtxn = self
            .env
            .write_txn()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        let deleted = self
            .db
            .delete(&mut wtxn, &self.encode_key(key))
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        wtxn.commit()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        Ok(deleted)
    }

    fn clear(&self) -> RiverDataResult<()> {
        let keys_to_delete = self.collect_namespace_keys()?;

        let mut wtxn = self
            .env
            .write_txn()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        for key in &keys_to_delete {
            self.db
                .delete(&mut wtxn, key)
                .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;
        }

        wtxn.commit()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        tracing::debug!(removed = keys_to_delete.len(), "Cleared LMDB namespace");
        Ok(())
    }
}

fn map_size_bytes(max_size_mb: usize) -> Result<usize, LmdbStoreError> {
    if max_size_mb == 0 || max_size_mb > MAX_STORE_SIZE_MB {
        return Err(LmdbStoreError::InvalidMapSize(max_size_mb));
    }
    max_size_mb
        .checked_mul(1024 * 1024)
        .ok_or(LmdbStoreError::InvalidMapSize(max_size_mb))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn open_store(dir: &TempDir) -> LmdbStore {
        LmdbStore::open(dir.path(), 10).unwrap()
    }

    #[test]
    fn test_set_get_unset() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        store.set("readings|a", &json!({"lastCheckedAt": 5})).unwrap();
        assert_eq!(store.get("readings|a").unwrap(), Some(json!({"lastCheckedAt": 5})));
        assert!(store.has("readings|a").unwrap());

        assert!(store.unset("readings|a").unwrap());
        assert!(!store.unset("readings|a").unwrap());
        assert_eq!(store.get("readings|a").unwrap(), None);
    }

    #[test]
    fn test_map_size_is_bounded() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            LmdbStore::open(dir.path(), 0),
            Err(LmdbStoreError::InvalidMapSize(0))
        ));
        assert!(matches!(
            LmdbStore::open(dir.path(), usize::MAX),
            Err(LmdbStoreError::InvalidMapSize(usize::MAX))
        ));
        assert_eq!(map_size_bytes(64).unwrap(), 64 * 1024 * 1024);
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let store = open_store(&dir);
            store.set("k", &json!([1, 2, 3])).unwrap();
        }
        let store = open_store(&dir);
        assert_eq!(store.get("k").unwrap(), Some(json!([1, 2, 3])));
    }

    #[test]
    fn test_namespaces_are_separate() {
        let dir = TempDir::new().unwrap();
        let widget = LmdbStore::open_with_namespace(dir.path(), 10, "widget").unwrap();
        widget.set("readings|a", &json!(1)).unwrap();
        drop(widget);

        let other = LmdbStore::open_with_namespace(dir.path(), 10, "other").unwrap();
        other.set("readings|b", &json!(2)).unwrap();
        assert_eq!(other.keys().unwrap(), vec!["readings|b".to_string()]);
        assert_eq!(other.get("readings|a").unwrap(), None);

        other.clear().unwrap();
        drop(other);

        let widget = LmdbStore::open_with_namespace(dir.path(), 10, "widget").unwrap();
        assert_eq!(widget.keys().unwrap(), vec!["readings|a".to_string()]);
    }
}
