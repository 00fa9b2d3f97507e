//! Invoicing domain module.
//!
//! Business rules for tracked invoices: date arithmetic, derived payment status,
//! validation, filtering/sorting and aggregate metrics. Everything here is
//! deterministic domain logic (no IO, no storage); "today" is always supplied
//! by the caller.

pub mod dates;
pub mod display;
pub mod invoice;
pub mod metrics;
pub mod query;
pub mod sample;
pub mod validation;

pub use display::{DaysInfo, days_info, format_currency, format_date};
pub use invoice::{
    Invoice, InvoiceDraft, InvoiceStatus, PaymentTerms, calculate_due_date, calculate_status,
    create_invoice, generate_invoice_number, parse_amount,
};
pub use metrics::{InvoiceMetrics, StatusMetrics, aggregate_metrics};
pub use query::{FilterState, FilterUpdate, SortDirection, SortField, StatusFilter, apply_filters};
pub use sample::generate_sample_invoices;
pub use validation::{ValidationReport, validate_invoice};
