use std::collections::HashMap;
use std::sync::RwLock;

use super::{BlobStore, StorageError};

/// In-memory blob store for tests/dev.
///
/// An optional byte quota mimics browser storage limits so that failing
/// writes can be exercised.
#[derive(Debug, Default)]
pub struct InMemoryBlobStore {
    inner: RwLock<HashMap<String, String>>,
    quota: Option<usize>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(limit: usize) -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
            quota: Some(limit),
        }
    }

    fn poisoned() -> StorageError {
        StorageError::Unavailable("in-memory store lock poisoned".to_string())
    }
}

impl BlobStore for InMemoryBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let map = self.inner.read().map_err(|_| Self::poisoned())?;
        Ok(map.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut map = self.inner.write().map_err(|_| Self::poisoned())?;
        if let Some(limit) = self.quota {
            let others: usize = map
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + value.len();
            if needed > limit {
                return Err(StorageError::QuotaExceeded { needed, limit });
            }
        }
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut map = self.inner.write().map_err(|_| Self::poisoned())?;
        map.remove(key);
        Ok(())
    }
}
