//! Key/value blob storage backing the invoice repository.

pub mod file;
pub mod memory;

pub use file::FileBlobStore;
pub use memory::InMemoryBlobStore;

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage quota exceeded ({needed} bytes needed, {limit} allowed)")]
    QuotaExceeded { needed: usize, limit: usize },
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),
    #[error("io error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to (de)serialize stored invoices: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Single-key blob storage (one serialized document per key).
pub trait BlobStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    /// Overwrites any previous value.
    fn put(&self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<S> BlobStore for Arc<S>
where
    S: BlobStore + ?Sized,
{
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).put(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}
