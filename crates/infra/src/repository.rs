//! Persistence gateway for the invoice collection.
//!
//! The whole collection is serialized as one JSON array under a fixed key.
//! Dates are written as ISO-8601 strings (`YYYY-MM-DD` for calendar days,
//! RFC 3339 for the payment timestamp) and come back as real dates.
//!
//! Failures never reach the caller: loads degrade to "nothing stored" and saves
//! report `false`. Both are logged.

use invoicedesk_invoicing::Invoice;

use crate::storage::{BlobStore, StorageError};

/// Storage key used when none is configured.
pub const DEFAULT_STORAGE_KEY: &str = "invoice-dashboard-data";

/// Load/save contract consumed by the dashboard.
pub trait PersistenceGateway {
    /// Previously saved invoices, or `None` if nothing is stored or the stored
    /// state is unreadable.
    fn load(&self) -> Option<Vec<Invoice>>;

    /// Overwrite the stored collection. Returns whether the write succeeded.
    fn save(&self, invoices: &[Invoice]) -> bool;

    /// Remove all stored state.
    fn clear(&self);
}

#[derive(Debug, Clone)]
pub struct InvoiceRepository<S> {
    store: S,
    key: String,
}

impl<S> InvoiceRepository<S>
where
    S: BlobStore,
{
    pub fn new(store: S) -> Self {
        Self::with_key(store, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Like `load`, but surfaces the failure instead of logging it.
    pub fn try_load(&self) -> Result<Option<Vec<Invoice>>, StorageError> {
        match self.store.get(&self.key)? {
            None => Ok(None),
            Some(data) if data.trim().is_empty() => Ok(None),
            Some(data) => Ok(Some(serde_json::from_str(&data)?)),
        }
    }

    /// Like `save`, but surfaces the failure instead of logging it.
    pub fn try_save(&self, invoices: &[Invoice]) -> Result<(), StorageError> {
        let data = serde_json::to_string(invoices)?;
        self.store.put(&self.key, &data)
    }
}

impl<S> PersistenceGateway for InvoiceRepository<S>
where
    S: BlobStore,
{
    fn load(&self) -> Option<Vec<Invoice>> {
        match self.try_load() {
            Ok(Some(invoices)) => {
                tracing::debug!(key = %self.key, count = invoices.len(), "loaded invoices");
                Some(invoices)
            }
            Ok(None) => {
                tracing::debug!(key = %self.key, "no stored invoices");
                None
            }
            Err(err) => {
                tracing::error!(key = %self.key, error = %err, "failed to load invoices; treating as empty");
                None
            }
        }
    }

    fn save(&self, invoices: &[Invoice]) -> bool {
        match self.try_save(invoices) {
            Ok(()) => {
                tracing::debug!(key = %self.key, count = invoices.len(), "saved invoices");
                true
            }
            Err(err) => {
                tracing::error!(key = %self.key, error = %err, "failed to save invoices");
                false
            }
        }
    }

    fn clear(&self) {
        if let Err(err) = self.store.remove(&self.key) {
            tracing::error!(key = %self.key, error = %err, "failed to clear stored invoices");
        }
    }
}
