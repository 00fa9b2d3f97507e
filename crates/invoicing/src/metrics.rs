//! Summary figures for the dashboard cards.

use serde::{Deserialize, Serialize};

use invoicedesk_core::ValueObject;

use crate::invoice::{Invoice, InvoiceStatus};
use crate::query::StatusFilter;

/// Count and summed amount (cents) of one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatusMetrics {
    pub count: usize,
    pub amount: i64,
}

impl StatusMetrics {
    fn add(&mut self, amount: i64) {
        self.count += 1;
        self.amount = self.amount.saturating_add(amount);
    }
}

impl ValueObject for StatusMetrics {}

/// Per-status totals over the whole (unfiltered) collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InvoiceMetrics {
    pub all: StatusMetrics,
    pub paid: StatusMetrics,
    pub pending: StatusMetrics,
    pub overdue: StatusMetrics,
}

impl InvoiceMetrics {
    pub fn bucket(&self, filter: StatusFilter) -> &StatusMetrics {
        match filter {
            StatusFilter::All => &self.all,
            StatusFilter::Paid => &self.paid,
            StatusFilter::Pending => &self.pending,
            StatusFilter::Overdue => &self.overdue,
        }
    }

    fn bucket_mut(&mut self, status: InvoiceStatus) -> &mut StatusMetrics {
        match status {
            InvoiceStatus::Paid => &mut self.paid,
            InvoiceStatus::Pending => &mut self.pending,
            InvoiceStatus::Overdue => &mut self.overdue,
        }
    }
}

impl ValueObject for InvoiceMetrics {}

/// Single pass over the collection.
pub fn aggregate_metrics<'a, I>(invoices: I) -> InvoiceMetrics
where
    I: IntoIterator<Item = &'a Invoice>,
{
    invoices
        .into_iter()
        .fold(InvoiceMetrics::default(), |mut metrics, invoice| {
            metrics.all.add(invoice.amount());
            metrics.bucket_mut(invoice.status()).add(invoice.amount());
            metrics
        })
}
