//! Change notifications emitted after each state change.

use serde::{Deserialize, Serialize};

use invoicedesk_core::InvoiceId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DashboardEvent {
    InvoiceAdded { invoice_id: InvoiceId },
    InvoiceUpdated { invoice_id: InvoiceId },
    InvoicePaid { invoice_id: InvoiceId },
    InvoiceDeleted { invoice_id: InvoiceId },
    FiltersChanged,
    /// Statuses were re-derived against a new "today".
    StatusesRefreshed { changed: usize },
    /// The collection was replaced from storage.
    Reloaded { count: usize },
}

impl DashboardEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            DashboardEvent::InvoiceAdded { .. } => "dashboard.invoice.added",
            DashboardEvent::InvoiceUpdated { .. } => "dashboard.invoice.updated",
            DashboardEvent::InvoicePaid { .. } => "dashboard.invoice.paid",
            DashboardEvent::InvoiceDeleted { .. } => "dashboard.invoice.deleted",
            DashboardEvent::FiltersChanged => "dashboard.filters.changed",
            DashboardEvent::StatusesRefreshed { .. } => "dashboard.statuses.refreshed",
            DashboardEvent::Reloaded { .. } => "dashboard.collection.reloaded",
        }
    }

    /// Whether the invoice collection (and therefore metrics) changed.
    pub fn touches_collection(&self) -> bool {
        !matches!(self, DashboardEvent::FiltersChanged)
    }

    pub fn invoice_id(&self) -> Option<InvoiceId> {
        match self {
            DashboardEvent::InvoiceAdded { invoice_id }
            | DashboardEvent::InvoiceUpdated { invoice_id }
            | DashboardEvent::InvoicePaid { invoice_id }
            | DashboardEvent::InvoiceDeleted { invoice_id } => Some(*invoice_id),
            _ => None,
        }
    }
}
