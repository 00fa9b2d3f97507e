//! Configuration loading and representation.
//!
//! Values come from environment variables with defaults; an unparseable value
//! is logged and replaced by its default rather than aborting startup.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;

use crate::repository::{DEFAULT_STORAGE_KEY, InvoiceRepository};
use crate::storage::FileBlobStore;

pub const ENV_STORAGE_DIR: &str = "INVOICEDESK_STORAGE_DIR";
pub const ENV_STORAGE_KEY: &str = "INVOICEDESK_STORAGE_KEY";
pub const ENV_SEED_SAMPLES: &str = "INVOICEDESK_SEED_SAMPLES";
pub const ENV_SAMPLE_COUNT: &str = "INVOICEDESK_SAMPLE_COUNT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    /// Directory holding the file-backed blob store.
    pub storage_dir: PathBuf,
    /// Key of the single persisted blob.
    pub storage_key: String,
    /// Seed sample invoices when nothing is stored.
    pub seed_samples: bool,
    pub sample_count: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(".invoicedesk"),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            seed_samples: true,
            sample_count: 5,
        }
    }
}

impl DashboardConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source (tests pass a map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            storage_dir: lookup(ENV_STORAGE_DIR)
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_dir),
            storage_key: lookup(ENV_STORAGE_KEY)
                .filter(|key| !key.trim().is_empty())
                .unwrap_or(defaults.storage_key),
            seed_samples: parse_or(&lookup, ENV_SEED_SAMPLES, defaults.seed_samples),
            sample_count: parse_or(&lookup, ENV_SAMPLE_COUNT, defaults.sample_count),
        }
    }

    /// Repository over the configured directory and key.
    pub fn file_repository(&self) -> InvoiceRepository<FileBlobStore> {
        InvoiceRepository::with_key(FileBlobStore::new(&self.storage_dir), &self.storage_key)
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(name)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("{name} has invalid value {raw:?}"))
        })
        .transpose()
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> T
where
    T: FromStr + core::fmt::Debug,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match parse_var(lookup, name) {
        Ok(value) => value.unwrap_or(default),
        Err(err) => {
            tracing::warn!(error = %format!("{err:#}"), default = ?default, "using default configuration value");
            default
        }
    }
}
