//! Calendar arithmetic for invoice dates.
//!
//! All comparisons work on whole calendar days: time-of-day components are
//! discarded before any arithmetic, so 23:59 and 00:01 of the same day are the
//! same day.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

/// A value that falls on a calendar day.
pub trait CalendarDay {
    /// The calendar day with the time of day dropped.
    ///
    /// Zoned timestamps are normalized in their own offset.
    fn calendar_day(&self) -> NaiveDate;
}

impl CalendarDay for NaiveDate {
    fn calendar_day(&self) -> NaiveDate {
        *self
    }
}

impl CalendarDay for NaiveDateTime {
    fn calendar_day(&self) -> NaiveDate {
        self.date()
    }
}

impl<Tz: TimeZone> CalendarDay for DateTime<Tz> {
    fn calendar_day(&self) -> NaiveDate {
        self.date_naive()
    }
}

/// Whole days between two dates, `a - b`.
pub fn difference_in_days(a: &impl CalendarDay, b: &impl CalendarDay) -> i64 {
    (a.calendar_day() - b.calendar_day()).num_days()
}

/// `date` moved by `n` calendar days (negative moves backwards).
///
/// Month and year rollover follow the proleptic Gregorian calendar. Results
/// outside chrono's representable range saturate at `NaiveDate::MIN`/`MAX`.
pub fn add_days(date: NaiveDate, n: i64) -> NaiveDate {
    let step = Days::new(n.unsigned_abs());
    let moved = if n >= 0 {
        date.checked_add_days(step)
    } else {
        date.checked_sub_days(step)
    };
    moved.unwrap_or(if n >= 0 { NaiveDate::MAX } else { NaiveDate::MIN })
}

/// True iff both fall in the same month of the same year.
pub fn is_same_month(a: &impl CalendarDay, b: &impl CalendarDay) -> bool {
    let (a, b) = (a.calendar_day(), b.calendar_day());
    a.year() == b.year() && a.month() == b.month()
}

pub fn is_current_month(date: &impl CalendarDay, today: NaiveDate) -> bool {
    is_same_month(date, &today)
}

/// First day of the month containing `date`.
pub fn start_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Last day of the month containing `date`.
pub fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    start_of_month(date)
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

/// Last representable millisecond of the month containing `date`.
pub fn end_of_month(date: NaiveDate) -> NaiveDateTime {
    let last = last_day_of_month(date);
    let end_of_day = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    last.and_time(end_of_day)
}

/// Parse a date typed into a form.
///
/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp. Anything else yields
/// `None`, which validation reports as an invalid invoice date.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(input).ok().map(|dt| dt.date_naive()))
}
