//! Explicit validation of invoice drafts.
//!
//! Kept apart from `create_invoice` so that an edited draft can be checked
//! before anything in the collection changes.

use serde::{Deserialize, Serialize};

use invoicedesk_core::ValueObject;

use crate::invoice::{InvoiceDraft, PaymentTerms};

pub const CUSTOMER_NAME_REQUIRED: &str = "Customer name is required";
pub const AMOUNT_NOT_POSITIVE: &str = "Amount must be a positive number";
pub const INVOICE_DATE_INVALID: &str = "Valid invoice date is required";
pub const PAYMENT_TERMS_UNSUPPORTED: &str = "Payment terms must be 7, 15, 30, 45, or 60 days";

/// Outcome of validating a draft: every failing rule, in rule order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    errors: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<String> {
        self.errors
    }

    fn check(&mut self, ok: bool, message: &str) {
        if !ok {
            self.errors.push(message.to_string());
        }
    }
}

impl ValueObject for ValidationReport {}

impl core::fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.errors.join("; "))
    }
}

/// Check a draft against all rules without short-circuiting.
pub fn validate_invoice(draft: &InvoiceDraft) -> ValidationReport {
    let mut report = ValidationReport::default();
    report.check(!draft.customer_name.trim().is_empty(), CUSTOMER_NAME_REQUIRED);
    report.check(draft.amount.is_some_and(|cents| cents > 0), AMOUNT_NOT_POSITIVE);
    report.check(draft.invoice_date.is_some(), INVOICE_DATE_INVALID);
    report.check(
        PaymentTerms::try_from(draft.payment_terms).is_ok(),
        PAYMENT_TERMS_UNSUPPORTED,
    );
    report
}
