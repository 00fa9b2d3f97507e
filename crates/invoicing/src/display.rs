//! Presentation helpers: relative-days text and value formatting.
//!
//! Every helper returns a defined value for every input; a missing date renders
//! as an empty string.

use chrono::NaiveDate;

use invoicedesk_core::Clock;

use crate::dates::difference_in_days;
use crate::invoice::{Invoice, InvoiceStatus};

/// Payment timing shown next to each invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaysInfo {
    PaidLate(i64),
    PaidEarly(i64),
    PaidOnTime,
    OverdueBy(i64),
    DueIn(i64),
    /// Status and payment date disagree (e.g. stale data); renders empty.
    Unavailable,
}

impl core::fmt::Display for DaysInfo {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DaysInfo::PaidLate(days) => write!(f, "Paid {days} days late"),
            DaysInfo::PaidEarly(days) => write!(f, "Paid {days} days early"),
            DaysInfo::PaidOnTime => f.write_str("Paid on time"),
            DaysInfo::OverdueBy(days) => write!(f, "Overdue by {days} days"),
            DaysInfo::DueIn(days) => write!(f, "Due in {days} days"),
            DaysInfo::Unavailable => Ok(()),
        }
    }
}

/// Days are counted in the clock's time zone, both for today and for the
/// payment timestamp.
pub fn days_info(invoice: &Invoice, clock: &impl Clock) -> DaysInfo {
    let today = clock.today();
    match (invoice.status(), invoice.payment_date()) {
        (InvoiceStatus::Paid, Some(paid_at)) => {
            let diff = difference_in_days(&clock.day_of(paid_at), &invoice.due_date());
            match diff {
                d if d > 0 => DaysInfo::PaidLate(d),
                d if d < 0 => DaysInfo::PaidEarly(-d),
                _ => DaysInfo::PaidOnTime,
            }
        }
        (InvoiceStatus::Paid, None) => DaysInfo::Unavailable,
        (InvoiceStatus::Overdue, _) => {
            DaysInfo::OverdueBy(difference_in_days(&today, &invoice.due_date()))
        }
        (InvoiceStatus::Pending, _) => {
            DaysInfo::DueIn(difference_in_days(&invoice.due_date(), &today))
        }
    }
}

/// `MM/DD/YYYY`, or an empty string when there is no valid date.
pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%m/%d/%Y").to_string())
        .unwrap_or_default()
}

/// An amount in cents as US dollars with thousands separators.
pub fn format_currency(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    format!("{sign}${}.{:02}", group_thousands(cents / 100), cents % 100)
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
