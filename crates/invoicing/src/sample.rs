//! Demo invoices used to seed an empty store.

use chrono::Duration;
use rand::Rng;
use rand::seq::SliceRandom;

use invoicedesk_core::Clock;

use crate::dates::{add_days, difference_in_days};
use crate::invoice::{Invoice, InvoiceDraft, PaymentTerms, create_invoice};

/// Generate `count` valid invoices spread around `clock.today()`.
///
/// Invoice dates fall between 60 days ago and 29 days ahead, amounts are whole
/// dollars from $100 to $5,099, and about 40% carry a payment date up to nine
/// days after the invoice date, so all three statuses usually appear.
pub fn generate_sample_invoices<R>(count: usize, clock: &impl Clock, rng: &mut R) -> Vec<Invoice>
where
    R: Rng + ?Sized,
{
    let today = clock.today();

    (0..count)
        .map(|i| {
            let invoice_date = add_days(today, rng.gen_range(-60..30));
            let terms = PaymentTerms::ALL
                .choose(rng)
                .copied()
                .unwrap_or_default();
            let amount = i64::from(rng.gen_range(100u32..5100)) * 100;
            let letter = char::from(b'A' + (i % 26) as u8);

            let mut draft = InvoiceDraft::new(
                format!("Customer {letter}{}", i + 1),
                amount,
                invoice_date,
                terms.days(),
            );
            if rng.gen_bool(0.4) {
                // Shift "now" by whole days so the payment lands on `paid_on`
                // in the clock's own time zone.
                let paid_on = add_days(invoice_date, rng.gen_range(0..10));
                let shift = Duration::days(difference_in_days(&paid_on, &today));
                draft.payment_date = clock.now().checked_add_signed(shift);
            }
            draft
        })
        // Drafts always carry an invoice date, so creation cannot fail.
        .filter_map(|draft| create_invoice(draft, clock).ok())
        .collect()
}
