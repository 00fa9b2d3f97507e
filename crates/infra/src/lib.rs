//! Infrastructure layer: storage adapters, the persistence gateway and config.

pub mod config;
pub mod repository;
pub mod storage;

pub use config::DashboardConfig;
pub use repository::{DEFAULT_STORAGE_KEY, InvoiceRepository, PersistenceGateway};
pub use storage::{BlobStore, FileBlobStore, InMemoryBlobStore, StorageError};
