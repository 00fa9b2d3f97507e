use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;

use invoicedesk_core::{Clock, DomainError, InvoiceId, SystemClock};
use invoicedesk_infra::{DashboardConfig, PersistenceGateway};
use invoicedesk_invoicing::{
    FilterState, FilterUpdate, Invoice, InvoiceDraft, InvoiceMetrics, aggregate_metrics,
    apply_filters, create_invoice, generate_sample_invoices, validate_invoice,
};

use crate::error::{DashboardError, DashboardResult};
use crate::event::DashboardEvent;

type Listener = Box<dyn FnMut(&DashboardEvent) + Send>;

/// Owner of the invoice collection and the list settings.
///
/// The collection keeps insertion order with the newest invoice first. Writes
/// to the gateway are best-effort: a failed save is logged and the in-memory
/// state stays authoritative.
pub struct InvoiceDashboard<G, C = SystemClock> {
    invoices: Vec<Invoice>,
    filters: FilterState,
    gateway: G,
    clock: C,
    listeners: Vec<Listener>,
}

impl<G, C> core::fmt::Debug for InvoiceDashboard<G, C>
where
    G: core::fmt::Debug,
    C: core::fmt::Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InvoiceDashboard")
            .field("invoices", &self.invoices.len())
            .field("filters", &self.filters)
            .field("gateway", &self.gateway)
            .field("clock", &self.clock)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<G, C> InvoiceDashboard<G, C>
where
    G: PersistenceGateway,
    C: Clock,
{
    /// Load the stored collection, seeding sample invoices when storage is
    /// empty and the config asks for it.
    pub fn open(gateway: G, clock: C, config: &DashboardConfig) -> Self {
        Self::open_with_rng(gateway, clock, config, &mut rand::thread_rng())
    }

    pub fn open_with_rng<R>(gateway: G, clock: C, config: &DashboardConfig, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let stored = gateway.load().filter(|invoices| !invoices.is_empty());
        let mut dashboard = Self::with_invoices(gateway, clock, stored.unwrap_or_default());

        if dashboard.invoices.is_empty() && config.seed_samples {
            dashboard.invoices = generate_sample_invoices(config.sample_count, &dashboard.clock, rng);
            tracing::info!(count = dashboard.invoices.len(), "seeded sample invoices");
            dashboard.persist();
        } else {
            tracing::info!(count = dashboard.invoices.len(), "opened invoice dashboard");
        }
        dashboard
    }

    /// Dashboard over an existing collection; statuses are re-derived against
    /// the clock. Nothing is loaded or saved.
    pub fn with_invoices(gateway: G, clock: C, mut invoices: Vec<Invoice>) -> Self {
        let today = clock.today();
        for invoice in &mut invoices {
            invoice.refresh_status(today);
        }
        Self {
            invoices,
            filters: FilterState::default(),
            gateway,
            clock,
            listeners: Vec::new(),
        }
    }

    /// Register a listener called after every state change.
    pub fn subscribe(&mut self, listener: impl FnMut(&DashboardEvent) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// All invoices, newest first.
    pub fn invoices(&self) -> &[Invoice] {
        &self.invoices
    }

    pub fn invoice(&self, id: InvoiceId) -> Option<&Invoice> {
        self.invoices.iter().find(|invoice| invoice.id_typed() == id)
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    /// The list as currently filtered and sorted.
    pub fn filtered_invoices(&self) -> Vec<&Invoice> {
        apply_filters(&self.invoices, &self.filters)
    }

    /// Totals over the whole collection, ignoring filters.
    pub fn metrics(&self) -> InvoiceMetrics {
        aggregate_metrics(&self.invoices)
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Validate and create a new invoice at the front of the collection.
    pub fn add_invoice(&mut self, draft: InvoiceDraft) -> DashboardResult<InvoiceId> {
        ensure_valid(&draft)?;
        let invoice = create_invoice(draft, &self.clock)?;
        let invoice_id = invoice.id_typed();
        if self.position(invoice_id).is_ok() {
            return Err(DomainError::conflict(format!("invoice {invoice_id} already exists")).into());
        }

        tracing::info!(
            invoice_id = %invoice_id,
            invoice_number = invoice.invoice_number(),
            status = %invoice.status(),
            "invoice added"
        );
        self.invoices.insert(0, invoice);
        self.commit(DashboardEvent::InvoiceAdded { invoice_id });
        Ok(invoice_id)
    }

    /// Replace a stored invoice with the same id, in place.
    ///
    /// The replacement is validated like a new invoice and its status is
    /// re-derived; the caller is responsible for a consistent due date (use
    /// `edit_invoice` to have it recomputed).
    pub fn update_invoice(&mut self, mut invoice: Invoice) -> DashboardResult<()> {
        ensure_valid(&InvoiceDraft::from_invoice(&invoice))?;
        let invoice_id = invoice.id_typed();
        let index = self.position(invoice_id)?;
        invoice.refresh_status(self.clock.today());

        tracing::info!(invoice_id = %invoice_id, status = %invoice.status(), "invoice updated");
        self.invoices[index] = invoice;
        self.commit(DashboardEvent::InvoiceUpdated { invoice_id });
        Ok(())
    }

    /// Validate an edited draft and apply it to the stored invoice.
    pub fn edit_invoice(&mut self, invoice_id: InvoiceId, draft: &InvoiceDraft) -> DashboardResult<()> {
        ensure_valid(draft)?;
        let index = self.position(invoice_id)?;
        let today = self.clock.today();
        let invoice = &mut self.invoices[index];
        invoice.apply_draft(draft, today)?;

        tracing::info!(
            invoice_id = %invoice_id,
            due_date = %invoice.due_date(),
            status = %invoice.status(),
            "invoice edited"
        );
        self.commit(DashboardEvent::InvoiceUpdated { invoice_id });
        Ok(())
    }

    /// Record a payment; `paid_at` defaults to now.
    pub fn mark_as_paid(
        &mut self,
        invoice_id: InvoiceId,
        paid_at: Option<DateTime<Utc>>,
    ) -> DashboardResult<()> {
        let index = self.position(invoice_id)?;
        let paid_at = paid_at.unwrap_or_else(|| self.clock.now());
        let today = self.clock.today();
        self.invoices[index].mark_paid(paid_at, today);

        tracing::info!(invoice_id = %invoice_id, paid_at = %paid_at, "invoice marked paid");
        self.commit(DashboardEvent::InvoicePaid { invoice_id });
        Ok(())
    }

    /// Permanently remove an invoice and return it.
    pub fn delete_invoice(&mut self, invoice_id: InvoiceId) -> DashboardResult<Invoice> {
        let index = self.position(invoice_id)?;
        let removed = self.invoices.remove(index);

        tracing::info!(invoice_id = %invoice_id, "invoice deleted");
        self.commit(DashboardEvent::InvoiceDeleted { invoice_id });
        Ok(removed)
    }

    /// Merge a partial filter change. Filters are not persisted.
    pub fn update_filters(&mut self, update: FilterUpdate) -> bool {
        let changed = self.filters.apply(update);
        if changed {
            tracing::debug!(filters = ?self.filters, "filters changed");
            self.notify(&DashboardEvent::FiltersChanged);
        }
        changed
    }

    /// Re-derive every status against the clock's current day.
    ///
    /// Returns how many invoices changed status; only then is anything saved
    /// or announced.
    pub fn refresh_statuses(&mut self) -> usize {
        let today = self.clock.today();
        let changed = self
            .invoices
            .iter_mut()
            .map(|invoice| invoice.refresh_status(today))
            .filter(|changed| *changed)
            .count();
        if changed > 0 {
            tracing::info!(changed, %today, "invoice statuses refreshed");
            self.commit(DashboardEvent::StatusesRefreshed { changed });
        }
        changed
    }

    /// Replace the collection with what storage holds (empty if unreadable).
    pub fn reload(&mut self) {
        let today = self.clock.today();
        self.invoices = self.gateway.load().unwrap_or_default();
        for invoice in &mut self.invoices {
            invoice.refresh_status(today);
        }
        let count = self.invoices.len();
        tracing::info!(count, "invoice collection reloaded");
        self.notify(&DashboardEvent::Reloaded { count });
    }

    fn position(&self, invoice_id: InvoiceId) -> DashboardResult<usize> {
        self.invoices
            .iter()
            .position(|invoice| invoice.id_typed() == invoice_id)
            .ok_or_else(|| DomainError::not_found(format!("invoice {invoice_id}")).into())
    }

    fn commit(&mut self, event: DashboardEvent) {
        self.persist();
        self.notify(&event);
    }

    fn persist(&self) {
        if !self.gateway.save(&self.invoices) {
            tracing::warn!(count = self.invoices.len(), "invoice changes kept in memory only");
        }
    }

    fn notify(&mut self, event: &DashboardEvent) {
        tracing::debug!(
            event_type = event.event_type(),
            invoice_id = ?event.invoice_id(),
            collection_changed = event.touches_collection(),
            listeners = self.listeners.len(),
            "dashboard event"
        );
        for listener in &mut self.listeners {
            listener(event);
        }
    }
}

fn ensure_valid(draft: &InvoiceDraft) -> DashboardResult<()> {
    let report = validate_invoice(draft);
    if report.is_valid() {
        Ok(())
    } else {
        tracing::debug!(errors = %report, "invoice draft rejected");
        Err(DashboardError::Invalid(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use invoicedesk_core::FixedClock;
    use invoicedesk_invoicing::{InvoiceStatus, SortDirection, SortField, StatusFilter};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[derive(Debug, Default)]
    struct RecordingGateway {
        stored: Mutex<Option<Vec<Invoice>>>,
        saves: AtomicUsize,
        fail_saves: bool,
    }

    impl RecordingGateway {
        fn failing() -> Self {
            Self {
                fail_saves: true,
                ..Self::default()
            }
        }

        fn saves(&self) -> usize {
            self.saves.load(Ordering::SeqCst)
        }

        fn stored_len(&self) -> Option<usize> {
            self.stored.lock().unwrap().as_ref().map(Vec::len)
        }
    }

    impl PersistenceGateway for RecordingGateway {
        fn load(&self) -> Option<Vec<Invoice>> {
            self.stored.lock().unwrap().clone()
        }

        fn save(&self, invoices: &[Invoice]) -> bool {
            self.saves.fetch_add(1, Ordering::SeqCst);
            if self.fail_saves {
                return false;
            }
            *self.stored.lock().unwrap() = Some(invoices.to_vec());
            true
        }

        fn clear(&self) {
            *self.stored.lock().unwrap() = None;
        }
    }

    /// Clock that tests move forward by hand.
    #[derive(Debug)]
    struct ManualClock {
        now: Cell<DateTime<Utc>>,
    }

    impl ManualClock {
        fn on(day: NaiveDate) -> Self {
            Self {
                now: Cell::new(FixedClock::on(day).now()),
            }
        }

        fn advance_days(&self, days: i64) {
            self.now.set(self.now.get() + chrono::Duration::days(days));
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            self.now.get()
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn clock() -> FixedClock {
        FixedClock::on(day(2024, 2, 10))
    }

    fn no_seed() -> DashboardConfig {
        DashboardConfig {
            seed_samples: false,
            ..DashboardConfig::default()
        }
    }

    fn empty_dashboard() -> InvoiceDashboard<RecordingGateway, FixedClock> {
        InvoiceDashboard::open(RecordingGateway::default(), clock(), &no_seed())
    }

    fn draft(customer: &str, amount: i64, invoice_date: NaiveDate) -> InvoiceDraft {
        InvoiceDraft::new(customer, amount, invoice_date, 30)
    }

    #[test]
    fn empty_storage_is_seeded_and_saved() {
        let mut rng = StdRng::seed_from_u64(3);
        let config = DashboardConfig {
            sample_count: 7,
            ..DashboardConfig::default()
        };
        let dashboard =
            InvoiceDashboard::open_with_rng(RecordingGateway::default(), clock(), &config, &mut rng);

        assert_eq!(dashboard.invoices().len(), 7);
        assert_eq!(dashboard.gateway().saves(), 1);
        assert_eq!(dashboard.gateway().stored_len(), Some(7));
    }

    #[test]
    fn seeding_can_be_disabled() {
        let dashboard = empty_dashboard();
        assert!(dashboard.invoices().is_empty());
        assert_eq!(dashboard.gateway().saves(), 0);
    }

    #[test]
    fn add_validates_before_touching_the_collection() {
        let mut dashboard = empty_dashboard();
        let err = dashboard
            .add_invoice(InvoiceDraft::from_form("", "abc", "", "10"))
            .unwrap_err();

        assert_eq!(err.validation_errors().map(<[String]>::len), Some(4));
        assert!(dashboard.invoices().is_empty());
        assert_eq!(dashboard.gateway().saves(), 0);
    }

    #[test]
    fn new_invoices_go_first_and_are_persisted() {
        let mut dashboard = empty_dashboard();
        let first = dashboard.add_invoice(draft("Acme", 10_000, day(2024, 2, 1))).unwrap();
        let second = dashboard.add_invoice(draft("Globex", 20_000, day(2024, 1, 1))).unwrap();

        let ids: Vec<_> = dashboard.invoices().iter().map(Invoice::id_typed).collect();
        assert_eq!(ids, vec![second, first]);
        assert_eq!(dashboard.gateway().saves(), 2);
        assert_eq!(dashboard.gateway().stored_len(), Some(2));
        assert_eq!(dashboard.invoice(second).unwrap().status(), InvoiceStatus::Overdue);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut dashboard = empty_dashboard();
        let id = dashboard.add_invoice(draft("Acme", 10_000, day(2024, 2, 1))).unwrap();
        let mut again = draft("Acme", 10_000, day(2024, 2, 1));
        again.id = Some(id);

        let err = dashboard.add_invoice(again).unwrap_err();
        assert!(matches!(err, DashboardError::Domain(DomainError::Conflict(_))));
        assert_eq!(dashboard.invoices().len(), 1);
    }

    #[test]
    fn mark_as_paid_defaults_to_now() {
        let mut dashboard = empty_dashboard();
        let id = dashboard.add_invoice(draft("Acme", 10_000, day(2024, 1, 1))).unwrap();
        assert_eq!(dashboard.invoice(id).unwrap().status(), InvoiceStatus::Overdue);

        dashboard.mark_as_paid(id, None).unwrap();
        let invoice = dashboard.invoice(id).unwrap();
        assert_eq!(invoice.status(), InvoiceStatus::Paid);
        assert_eq!(invoice.payment_date(), Some(clock().now()));
    }

    #[test]
    fn edit_recomputes_due_date_and_status() {
        let mut dashboard = empty_dashboard();
        let id = dashboard.add_invoice(draft("Acme", 10_000, day(2024, 1, 1))).unwrap();

        let mut edited = InvoiceDraft::from_invoice(dashboard.invoice(id).unwrap());
        edited.payment_terms = 60;
        dashboard.edit_invoice(id, &edited).unwrap();

        let invoice = dashboard.invoice(id).unwrap();
        assert_eq!(invoice.due_date(), day(2024, 3, 1));
        assert_eq!(invoice.status(), InvoiceStatus::Pending);

        edited.amount = Some(-100);
        let err = dashboard.edit_invoice(id, &edited).unwrap_err();
        assert!(err.validation_errors().is_some());
        assert_eq!(dashboard.invoice(id).unwrap().amount(), 10_000);
    }

    #[test]
    fn update_replaces_in_place_and_rederives_status() {
        let mut dashboard = empty_dashboard();
        let older = dashboard.add_invoice(draft("Acme", 10_000, day(2024, 1, 1))).unwrap();
        let newer = dashboard.add_invoice(draft("Globex", 5_000, day(2024, 2, 1))).unwrap();

        let mut replacement = dashboard.invoice(older).unwrap().clone();
        replacement.mark_paid(clock().now(), day(2000, 1, 1));
        dashboard.update_invoice(replacement).unwrap();

        let ids: Vec<_> = dashboard.invoices().iter().map(Invoice::id_typed).collect();
        assert_eq!(ids, vec![newer, older]);
        assert_eq!(dashboard.invoice(older).unwrap().status(), InvoiceStatus::Paid);
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let mut dashboard = empty_dashboard();
        let missing = InvoiceId::new();
        assert!(matches!(
            dashboard.mark_as_paid(missing, None),
            Err(DashboardError::Domain(DomainError::NotFound(_)))
        ));
        assert!(dashboard.delete_invoice(missing).is_err());
        assert_eq!(dashboard.gateway().saves(), 0);
    }

    #[test]
    fn delete_removes_permanently() {
        let mut dashboard = empty_dashboard();
        let id = dashboard.add_invoice(draft("Acme", 10_000, day(2024, 1, 1))).unwrap();
        let removed = dashboard.delete_invoice(id).unwrap();
        assert_eq!(removed.id_typed(), id);
        assert!(dashboard.invoice(id).is_none());
        assert_eq!(dashboard.gateway().stored_len(), Some(0));
    }

    #[test]
    fn derived_views_follow_every_change() {
        let mut dashboard = empty_dashboard();
        let overdue = dashboard.add_invoice(draft("Acme", 10_000, day(2024, 1, 1))).unwrap();
        dashboard.add_invoice(draft("Globex", 30_000, day(2024, 2, 1))).unwrap();

        dashboard.update_filters(FilterUpdate::status(StatusFilter::Overdue));
        assert_eq!(dashboard.filtered_invoices().len(), 1);
        assert_eq!(dashboard.metrics().overdue.count, 1);

        dashboard.mark_as_paid(overdue, None).unwrap();
        assert!(dashboard.filtered_invoices().is_empty());
        let metrics = dashboard.metrics();
        assert_eq!(metrics.overdue.count, 0);
        assert_eq!(metrics.paid.amount, 10_000);
        assert_eq!(metrics.all.amount, 40_000);
    }

    #[test]
    fn filter_changes_are_not_persisted() {
        let mut dashboard = empty_dashboard();
        assert!(dashboard.update_filters(FilterUpdate::sort(SortField::Amount, SortDirection::Asc)));
        assert!(!dashboard.update_filters(FilterUpdate::sort(SortField::Amount, SortDirection::Asc)));
        assert_eq!(dashboard.filters().sort_field, SortField::Amount);
        assert_eq!(dashboard.gateway().saves(), 0);
    }

    #[test]
    fn failed_saves_keep_the_in_memory_state() {
        let mut dashboard = InvoiceDashboard::open(RecordingGateway::failing(), clock(), &no_seed());
        let id = dashboard.add_invoice(draft("Acme", 10_000, day(2024, 1, 1))).unwrap();
        assert_eq!(dashboard.gateway().saves(), 1);
        assert!(dashboard.invoice(id).is_some());
    }

    #[test]
    fn subscribers_see_one_event_per_change() {
        let mut dashboard = empty_dashboard();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        dashboard.subscribe(move |event| sink.lock().unwrap().push(event.event_type()));

        let id = dashboard.add_invoice(draft("Acme", 10_000, day(2024, 1, 1))).unwrap();
        dashboard.mark_as_paid(id, None).unwrap();
        dashboard.update_filters(FilterUpdate::search("acme"));
        dashboard.update_filters(FilterUpdate::search("acme"));
        dashboard.delete_invoice(id).unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                "dashboard.invoice.added",
                "dashboard.invoice.paid",
                "dashboard.filters.changed",
                "dashboard.invoice.deleted",
            ]
        );
    }

    #[test]
    fn loaded_statuses_are_rederived_against_the_clock() {
        let early = FixedClock::on(day(2024, 1, 5));
        let invoice = create_invoice(draft("Acme", 10_000, day(2024, 1, 1)), &early).unwrap();
        assert_eq!(invoice.status(), InvoiceStatus::Pending);

        let gateway = RecordingGateway::default();
        gateway.save(&[invoice]);
        let dashboard = InvoiceDashboard::open(gateway, clock(), &no_seed());
        assert_eq!(dashboard.invoices()[0].status(), InvoiceStatus::Overdue);
    }

    #[test]
    fn refresh_only_commits_real_changes() {
        let early = FixedClock::on(day(2024, 1, 5));
        let invoice = create_invoice(draft("Acme", 10_000, day(2024, 1, 1)), &early).unwrap();
        let mut dashboard = InvoiceDashboard::with_invoices(RecordingGateway::default(), clock(), vec![invoice]);

        assert_eq!(dashboard.refresh_statuses(), 0);
        assert_eq!(dashboard.gateway().saves(), 0);
    }

    #[test]
    fn update_rejects_an_invalid_replacement() {
        let mut dashboard = empty_dashboard();
        let id = dashboard.add_invoice(draft("Acme", 10_000, day(2024, 1, 1))).unwrap();
        let saves = dashboard.gateway().saves();

        let mut unreadable = InvoiceDraft::from_form("Acme", "oops", "2024-01-01", "30");
        unreadable.id = Some(id);
        let replacement = create_invoice(unreadable, &clock()).unwrap();

        let err = dashboard.update_invoice(replacement).unwrap_err();
        assert_eq!(
            err.validation_errors(),
            Some([invoicedesk_invoicing::validation::AMOUNT_NOT_POSITIVE.to_string()].as_slice())
        );
        assert_eq!(dashboard.invoice(id).unwrap().amount(), 10_000);
        assert_eq!(dashboard.gateway().saves(), saves);
    }

    #[test]
    fn refresh_marks_lapsed_invoices_overdue() {
        let clock = ManualClock::on(day(2024, 1, 15));
        let mut dashboard = InvoiceDashboard::open(RecordingGateway::default(), &clock, &no_seed());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        dashboard.subscribe(move |event| sink.lock().unwrap().push(event.clone()));

        // Due 2024-01-31 and 2024-02-09.
        let lapsing = dashboard.add_invoice(draft("Acme", 10_000, day(2024, 1, 1))).unwrap();
        let later = dashboard.add_invoice(draft("Globex", 20_000, day(2024, 1, 10))).unwrap();
        let saves = dashboard.gateway().saves();
        assert_eq!(dashboard.refresh_statuses(), 0);

        clock.advance_days(20);
        assert_eq!(dashboard.today(), day(2024, 2, 4));
        assert_eq!(dashboard.refresh_statuses(), 1);

        assert_eq!(dashboard.invoice(lapsing).unwrap().status(), InvoiceStatus::Overdue);
        assert_eq!(dashboard.invoice(later).unwrap().status(), InvoiceStatus::Pending);
        assert_eq!(dashboard.metrics().overdue.count, 1);
        assert_eq!(dashboard.gateway().saves(), saves + 1);
        let seen = seen.lock().unwrap();
        assert_eq!(seen.last(), Some(&DashboardEvent::StatusesRefreshed { changed: 1 }));
        assert_eq!(seen.last().map(DashboardEvent::event_type), Some("dashboard.statuses.refreshed"));
    }
}
