use thiserror::Error;

use invoicedesk_core::DomainError;
use invoicedesk_invoicing::ValidationReport;

pub type DashboardResult<T> = Result<T, DashboardError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DashboardError {
    /// User input failed validation; nothing was changed.
    #[error("invalid invoice: {0}")]
    Invalid(ValidationReport),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl DashboardError {
    /// Validation messages to show next to the form, if this is an input error.
    pub fn validation_errors(&self) -> Option<&[String]> {
        match self {
            DashboardError::Invalid(report) => Some(report.errors()),
            DashboardError::Domain(_) => None,
        }
    }
}
