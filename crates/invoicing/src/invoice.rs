use core::cmp::Ordering;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use invoicedesk_core::{Clock, DomainError, DomainResult, Entity, InvoiceId};

use crate::dates::{self, CalendarDay};

/// Payment status, always derived from payment date and due date.
///
/// Ordering follows the textual form ("Overdue" < "Paid" < "Pending"); there is
/// no business rank between statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvoiceStatus {
    Pending,
    Overdue,
    Paid,
}

impl InvoiceStatus {
    pub const ALL: [InvoiceStatus; 3] = [
        InvoiceStatus::Pending,
        InvoiceStatus::Overdue,
        InvoiceStatus::Paid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "Pending",
            InvoiceStatus::Overdue => "Overdue",
            InvoiceStatus::Paid => "Paid",
        }
    }
}

impl core::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialOrd for InvoiceStatus {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for InvoiceStatus {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

/// Accepted payment terms, in days after the invoice date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum PaymentTerms {
    Net7,
    Net15,
    #[default]
    Net30,
    Net45,
    Net60,
}

impl PaymentTerms {
    pub const ALL: [PaymentTerms; 5] = [
        PaymentTerms::Net7,
        PaymentTerms::Net15,
        PaymentTerms::Net30,
        PaymentTerms::Net45,
        PaymentTerms::Net60,
    ];

    pub fn days(self) -> u32 {
        match self {
            PaymentTerms::Net7 => 7,
            PaymentTerms::Net15 => 15,
            PaymentTerms::Net30 => 30,
            PaymentTerms::Net45 => 45,
            PaymentTerms::Net60 => 60,
        }
    }
}

impl TryFrom<u32> for PaymentTerms {
    type Error = DomainError;

    fn try_from(days: u32) -> Result<Self, Self::Error> {
        PaymentTerms::ALL
            .into_iter()
            .find(|terms| terms.days() == days)
            .ok_or_else(|| DomainError::validation(format!("unsupported payment terms: {days} days")))
    }
}

impl From<PaymentTerms> for u32 {
    fn from(value: PaymentTerms) -> Self {
        value.days()
    }
}

/// Candidate invoice as entered by a user, before validation.
///
/// Fields are kept raw so that malformed input can be reported rather than
/// rejected at parse time: a non-numeric amount or an unparseable date is
/// `None`, and unsupported terms stay as their integer.
///
/// Amounts are in the smallest currency unit (cents).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDraft {
    #[serde(default)]
    pub id: Option<InvoiceId>,
    #[serde(default)]
    pub invoice_number: Option<String>,
    pub customer_name: String,
    pub amount: Option<i64>,
    pub invoice_date: Option<NaiveDate>,
    pub payment_terms: u32,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub payment_date: Option<DateTime<Utc>>,
}

impl InvoiceDraft {
    pub fn new(
        customer_name: impl Into<String>,
        amount: i64,
        invoice_date: NaiveDate,
        payment_terms: u32,
    ) -> Self {
        Self {
            customer_name: customer_name.into(),
            amount: Some(amount),
            invoice_date: Some(invoice_date),
            payment_terms,
            ..Self::default()
        }
    }

    /// Build a draft from the four text fields of the invoice form.
    ///
    /// The amount is read in currency units (`"12.50"`) and rounded to cents.
    pub fn from_form(customer_name: &str, amount: &str, invoice_date: &str, payment_terms: &str) -> Self {
        Self {
            customer_name: customer_name.to_string(),
            amount: parse_amount(amount),
            invoice_date: dates::parse_date(invoice_date),
            payment_terms: payment_terms.trim().parse().unwrap_or(0),
            ..Self::default()
        }
    }

    /// Candidate for editing an existing invoice.
    pub fn from_invoice(invoice: &Invoice) -> Self {
        Self {
            id: Some(invoice.id),
            invoice_number: Some(invoice.invoice_number.clone()),
            customer_name: invoice.customer_name.clone(),
            amount: Some(invoice.amount),
            invoice_date: Some(invoice.invoice_date),
            payment_terms: invoice.payment_terms,
            due_date: Some(invoice.due_date),
            payment_date: invoice.payment_date,
        }
    }

    pub fn with_payment_date(mut self, paid_at: DateTime<Utc>) -> Self {
        self.payment_date = Some(paid_at);
        self
    }
}

/// Entity: a tracked invoice.
///
/// `id` and `invoice_number` never change after construction. `due_date` and
/// `status` are derived and only change through the mutators below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    id: InvoiceId,
    invoice_number: String,
    customer_name: String,
    /// Cents.
    amount: i64,
    invoice_date: NaiveDate,
    payment_terms: u32,
    due_date: NaiveDate,
    payment_date: Option<DateTime<Utc>>,
    status: InvoiceStatus,
}

impl Invoice {
    pub fn id_typed(&self) -> InvoiceId {
        self.id
    }

    pub fn invoice_number(&self) -> &str {
        &self.invoice_number
    }

    pub fn customer_name(&self) -> &str {
        &self.customer_name
    }

    /// Amount in cents.
    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn invoice_date(&self) -> NaiveDate {
        self.invoice_date
    }

    /// Payment terms in days.
    pub fn payment_terms(&self) -> u32 {
        self.payment_terms
    }

    pub fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    pub fn payment_date(&self) -> Option<DateTime<Utc>> {
        self.payment_date
    }

    pub fn status(&self) -> InvoiceStatus {
        self.status
    }

    pub fn is_paid(&self) -> bool {
        self.payment_date.is_some()
    }

    /// Record a payment and re-derive status.
    pub fn mark_paid(&mut self, paid_at: DateTime<Utc>, today: NaiveDate) {
        self.payment_date = Some(paid_at);
        self.refresh_status(today);
    }

    pub fn set_invoice_date(&mut self, invoice_date: NaiveDate, today: NaiveDate) {
        self.invoice_date = invoice_date;
        self.recompute_due_date(today);
    }

    pub fn set_payment_terms(&mut self, payment_terms: u32, today: NaiveDate) {
        self.payment_terms = payment_terms;
        self.recompute_due_date(today);
    }

    /// Apply an edited draft.
    ///
    /// Identity fields of the draft are ignored; a draft with a different `id`
    /// is rejected. Due date and status are always recomputed.
    pub fn apply_draft(&mut self, draft: &InvoiceDraft, today: NaiveDate) -> DomainResult<()> {
        if draft.id.is_some_and(|id| id != self.id) {
            return Err(DomainError::invariant("invoice id mismatch"));
        }
        let invoice_date = draft
            .invoice_date
            .ok_or_else(|| DomainError::validation("invoice date is required"))?;

        self.customer_name = draft.customer_name.clone();
        self.amount = draft.amount.unwrap_or_default();
        self.invoice_date = invoice_date;
        self.payment_terms = draft.payment_terms;
        self.payment_date = draft.payment_date;
        self.recompute_due_date(today);
        Ok(())
    }

    /// Re-derive status against `today`. Returns whether it changed.
    pub fn refresh_status(&mut self, today: NaiveDate) -> bool {
        let status = calculate_status(self, today);
        let changed = status != self.status;
        self.status = status;
        changed
    }

    fn recompute_due_date(&mut self, today: NaiveDate) {
        self.due_date = calculate_due_date(self.invoice_date, self.payment_terms);
        self.refresh_status(today);
    }
}

impl Entity for Invoice {
    type Id = InvoiceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Derive status from payment date and due date.
///
/// Paid if a payment date is recorded (however late), otherwise Overdue once the
/// due day is strictly before `today`, otherwise Pending.
pub fn calculate_status(invoice: &Invoice, today: NaiveDate) -> InvoiceStatus {
    derive_status(invoice.payment_date.is_some(), &invoice.due_date, today)
}

fn derive_status(paid: bool, due_date: &impl CalendarDay, today: NaiveDate) -> InvoiceStatus {
    if paid {
        InvoiceStatus::Paid
    } else if due_date.calendar_day() < today {
        InvoiceStatus::Overdue
    } else {
        InvoiceStatus::Pending
    }
}

/// Invoice date advanced by the payment terms, in calendar days.
pub fn calculate_due_date(invoice_date: NaiveDate, payment_terms: u32) -> NaiveDate {
    dates::add_days(invoice_date, i64::from(payment_terms))
}

/// Parse an amount typed in currency units into cents.
///
/// Half-cents round away from zero. Returns `None` for anything that is not a
/// plain decimal number or does not fit in cents.
pub fn parse_amount(input: &str) -> Option<i64> {
    let value: Decimal = input.trim().parse().ok()?;
    value
        .checked_mul(Decimal::ONE_HUNDRED)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

/// Human-facing invoice number: `INV-` plus the last six digits of the
/// millisecond timestamp. Not guaranteed unique.
pub fn generate_invoice_number(now: DateTime<Utc>) -> String {
    format!("INV-{:06}", now.timestamp_millis().rem_euclid(1_000_000))
}

/// Build an invoice from a draft.
///
/// Does not validate: callers run `validate_invoice` first. Missing id and
/// invoice number are generated, a missing due date is derived from the terms,
/// a missing amount is stored as zero, and status is computed against the
/// clock. The only hard requirement is an invoice date, without which no due
/// date exists.
pub fn create_invoice(draft: InvoiceDraft, clock: &impl Clock) -> DomainResult<Invoice> {
    let invoice_date = draft
        .invoice_date
        .ok_or_else(|| DomainError::validation("invoice date is required"))?;

    let mut invoice = Invoice {
        id: draft.id.unwrap_or_default(),
        invoice_number: draft
            .invoice_number
            .filter(|number| !number.is_empty())
            .unwrap_or_else(|| generate_invoice_number(clock.now())),
        customer_name: draft.customer_name,
        amount: draft.amount.unwrap_or_default(),
        invoice_date,
        payment_terms: draft.payment_terms,
        due_date: draft
            .due_date
            .unwrap_or_else(|| calculate_due_date(invoice_date, draft.payment_terms)),
        payment_date: draft.payment_date,
        status: InvoiceStatus::Pending,
    };
    invoice.refresh_status(clock.today());
    Ok(invoice)
}
