//! Filtering and sorting of the invoice collection.
//!
//! Pure projections: the source slice is never mutated, and the result borrows
//! from it.

use core::cmp::Ordering;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use invoicedesk_core::{DomainError, ValueObject};

use crate::invoice::{Invoice, InvoiceStatus};

/// Status bucket to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StatusFilter {
    #[default]
    All,
    Paid,
    Pending,
    Overdue,
}

impl StatusFilter {
    pub fn matches(self, status: InvoiceStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Paid => status == InvoiceStatus::Paid,
            StatusFilter::Pending => status == InvoiceStatus::Pending,
            StatusFilter::Overdue => status == InvoiceStatus::Overdue,
        }
    }
}

impl From<InvoiceStatus> for StatusFilter {
    fn from(status: InvoiceStatus) -> Self {
        match status {
            InvoiceStatus::Paid => StatusFilter::Paid,
            InvoiceStatus::Pending => StatusFilter::Pending,
            InvoiceStatus::Overdue => StatusFilter::Overdue,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "All" => Ok(StatusFilter::All),
            "Paid" => Ok(StatusFilter::Paid),
            "Pending" => Ok(StatusFilter::Pending),
            "Overdue" => Ok(StatusFilter::Overdue),
            other => Err(DomainError::validation(format!("unknown status filter: {other}"))),
        }
    }
}

/// Column the list is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    InvoiceNumber,
    CustomerName,
    Amount,
    #[default]
    InvoiceDate,
    DueDate,
    PaymentDate,
    Status,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::InvoiceNumber => "invoiceNumber",
            SortField::CustomerName => "customerName",
            SortField::Amount => "amount",
            SortField::InvoiceDate => "invoiceDate",
            SortField::DueDate => "dueDate",
            SortField::PaymentDate => "paymentDate",
            SortField::Status => "status",
        }
    }

    /// Natural ordering of the field's values.
    ///
    /// Strings compare lexicographically (case-sensitive), amounts numerically,
    /// dates chronologically, and an absent payment date sorts before any
    /// present one.
    pub fn compare(self, a: &Invoice, b: &Invoice) -> Ordering {
        match self {
            SortField::InvoiceNumber => a.invoice_number().cmp(b.invoice_number()),
            SortField::CustomerName => a.customer_name().cmp(b.customer_name()),
            SortField::Amount => a.amount().cmp(&b.amount()),
            SortField::InvoiceDate => a.invoice_date().cmp(&b.invoice_date()),
            SortField::DueDate => a.due_date().cmp(&b.due_date()),
            SortField::PaymentDate => a.payment_date().cmp(&b.payment_date()),
            SortField::Status => a.status().cmp(&b.status()),
        }
    }
}

impl FromStr for SortField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            SortField::InvoiceNumber,
            SortField::CustomerName,
            SortField::Amount,
            SortField::InvoiceDate,
            SortField::DueDate,
            SortField::PaymentDate,
            SortField::Status,
        ]
        .into_iter()
        .find(|field| field.as_str() == s)
        .ok_or_else(|| DomainError::validation(format!("unknown sort field: {s}")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// What the invoice list currently shows. Not persisted.
///
/// Defaults to every status, no search text, newest invoice date first.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    pub status_filter: StatusFilter,
    pub search_text: String,
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
}

impl ValueObject for FilterState {}

/// Partial change to a `FilterState`; `None` leaves a setting untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterUpdate {
    pub status_filter: Option<StatusFilter>,
    pub search_text: Option<String>,
    pub sort_field: Option<SortField>,
    pub sort_direction: Option<SortDirection>,
}

impl FilterUpdate {
    pub fn status(status_filter: StatusFilter) -> Self {
        Self {
            status_filter: Some(status_filter),
            ..Self::default()
        }
    }

    pub fn search(text: impl Into<String>) -> Self {
        Self {
            search_text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn sort(field: SortField, direction: SortDirection) -> Self {
        Self {
            sort_field: Some(field),
            sort_direction: Some(direction),
            ..Self::default()
        }
    }
}

impl FilterState {
    /// Merge a partial update. Returns whether anything changed.
    pub fn apply(&mut self, update: FilterUpdate) -> bool {
        let before = self.clone();
        if let Some(status_filter) = update.status_filter {
            self.status_filter = status_filter;
        }
        if let Some(search_text) = update.search_text {
            self.search_text = search_text;
        }
        if let Some(sort_field) = update.sort_field {
            self.sort_field = sort_field;
        }
        if let Some(sort_direction) = update.sort_direction {
            self.sort_direction = sort_direction;
        }
        *self != before
    }

    /// Update for a click on a column header: ascending on a new column,
    /// flipping direction on the current one.
    pub fn toggle_sort(&self, field: SortField) -> FilterUpdate {
        let direction = if self.sort_field == field && self.sort_direction == SortDirection::Asc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        FilterUpdate::sort(field, direction)
    }

    /// Status and search predicate.
    pub fn matches(&self, invoice: &Invoice) -> bool {
        self.status_filter.matches(invoice.status()) && matches_search(invoice, &self.search_text)
    }
}

fn matches_search(invoice: &Invoice, search_text: &str) -> bool {
    if search_text.is_empty() {
        return true;
    }
    let needle = search_text.to_lowercase();
    invoice.customer_name().to_lowercase().contains(&needle)
        || invoice.invoice_number().to_lowercase().contains(&needle)
}

pub fn filter_invoices<'a>(invoices: &'a [Invoice], state: &FilterState) -> Vec<&'a Invoice> {
    invoices.iter().filter(|invoice| state.matches(invoice)).collect()
}

/// Stable sort: equal keys keep their relative order in either direction.
pub fn sort_invoices(invoices: &mut [&Invoice], field: SortField, direction: SortDirection) {
    invoices.sort_by(|a, b| direction.apply(field.compare(a, b)));
}

/// The visible list: filtered, then sorted.
pub fn apply_filters<'a>(invoices: &'a [Invoice], state: &FilterState) -> Vec<&'a Invoice> {
    let mut visible = filter_invoices(invoices, state);
    sort_invoices(&mut visible, state.sort_field, state.sort_direction);
    visible
}
