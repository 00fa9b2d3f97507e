//! Injectable notion of "now".
//!
//! Invoice status depends on the current calendar day, so every operation that
//! derives status takes a `Clock`. Only the outermost host uses `SystemClock`;
//! tests pin time with `FixedClock`.
//!
//! A clock also decides which calendar day an instant falls on. Stored
//! timestamps are UTC, but days are counted in the clock's own time zone so
//! that "today" and a payment made today land on the same day.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveTime, Offset, Utc};

/// Source of the current moment and the current calendar day.
pub trait Clock {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Calendar day `instant` falls on in this clock's time zone.
    fn day_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.date_naive()
    }

    /// The current calendar day, used for due-date comparisons.
    fn today(&self) -> NaiveDate {
        self.day_of(self.now())
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }

    fn day_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        (**self).day_of(instant)
    }

    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}

/// Wall clock. Days are local calendar dates.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn day_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&Local).date_naive()
    }
}

/// Clock frozen at a single instant, counting days at a fixed UTC offset
/// (UTC unless set with [`FixedClock::in_offset`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    now: DateTime<Utc>,
    offset: FixedOffset,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            offset: Utc.fix(),
        }
    }

    /// Clock frozen at noon UTC of the given day.
    pub fn on(day: NaiveDate) -> Self {
        let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN);
        Self::new(day.and_time(noon).and_utc())
    }

    /// Same instant, with days counted at `offset`.
    pub fn in_offset(self, offset: FixedOffset) -> Self {
        Self { offset, ..self }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn day_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }
}
