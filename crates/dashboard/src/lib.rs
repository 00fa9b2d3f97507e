//! `invoicedesk-dashboard` — the state a presentation layer drives.
//!
//! [`InvoiceDashboard`] owns the invoice collection and the current filter
//! settings. Every mutation goes through it, is mirrored to the persistence
//! gateway, and is announced to subscribers as a [`DashboardEvent`]. Derived
//! views (visible list, metrics) are recomputed from the collection on demand
//! and are never stored.

pub mod dashboard;
pub mod error;
pub mod event;

pub use dashboard::InvoiceDashboard;
pub use error::{DashboardError, DashboardResult};
pub use event::DashboardEvent;
