//! Clock and check-in window arithmetic.
//!
//! All window math is pure: callers pass the reference moment in, nothing
//! here reads a global clock. The application runs on a fixed UTC offset
//! (WIB by default), so local-day boundaries are simple shifts.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Utc};
use shared::CheckinKind;
use std::sync::Mutex;

/// Source of "now". Injected so services stay deterministic under test.
pub trait Clock: Send + Sync {
    fn now_utc(&self) -> DateTime<Utc>;
}

/// Production clock.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Settable clock for tests and replay-style drivers.
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.now.lock().unwrap();
        *guard += by;
    }
}

impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// A half-open `[start, end)` interval in which one check-in kind is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// Local wall-clock bounds of each window.
const MORNING_START: (u32, u32) = (4, 0);
const MORNING_END: (u32, u32) = (13, 0);
const EVENING_START: (u32, u32) = (16, 0);
const EVENING_END: (u32, u32) = (23, 0);

/// Computes check-in windows for calendar days in the application timezone.
#[derive(Debug, Clone, Copy)]
pub struct TimeWindows {
    offset: FixedOffset,
}

impl TimeWindows {
    pub fn new(utc_offset_hours: i32) -> Self {
        let offset =
            FixedOffset::east_opt(utc_offset_hours * 3600).expect("UTC offset out of range");
        Self { offset }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Local calendar day the given instant falls on.
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }

    /// Window for `kind` on an explicit local calendar day.
    pub fn window_on(&self, kind: CheckinKind, date: NaiveDate) -> Window {
        let ((sh, sm), (eh, em)) = match kind {
            CheckinKind::Morning => (MORNING_START, MORNING_END),
            CheckinKind::Evening => (EVENING_START, EVENING_END),
        };
        Window {
            start: self.local_instant(date, sh, sm),
            end: self.local_instant(date, eh, em),
        }
    }

    /// Window for `kind` on the local day the reference moment falls on.
    /// Only the date component of the reference matters.
    pub fn window_for(&self, kind: CheckinKind, reference: DateTime<Utc>) -> Window {
        self.window_on(kind, self.local_date(reference))
    }

    /// True iff the instant lies inside the window computed against its own
    /// local day.
    pub fn is_within(&self, kind: CheckinKind, instant: DateTime<Utc>) -> bool {
        self.window_for(kind, instant).contains(instant)
    }

    /// UTC bounds of one local calendar day, `[midnight, next midnight)`.
    pub fn day_range(&self, date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        (
            self.local_instant(date, 0, 0),
            self.local_instant(date + Duration::days(1), 0, 0),
        )
    }

    /// UTC bounds of one local calendar month. None for an invalid month.
    pub fn month_range(&self, year: i32, month: u32) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };
        Some((self.local_instant(first, 0, 0), self.local_instant(next, 0, 0)))
    }

    /// A local wall-clock moment expressed as UTC.
    pub fn at_local(&self, date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
        // A fixed offset has no gaps or folds, so local -> UTC is a plain shift.
        DateTime::<Utc>::from_naive_utc_and_offset(date.and_time(time) - self.offset, Utc)
    }

    fn local_instant(&self, date: NaiveDate, hour: u32, minute: u32) -> DateTime<Utc> {
        self.at_local(date, NaiveTime::from_hms_opt(hour, minute, 0).expect("valid time"))
    }
}

/// Number of days in a calendar month. None for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((next - first).num_days() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn wib() -> TimeWindows {
        TimeWindows::new(7)
    }

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        // Build a WIB wall-clock instant and express it in UTC.
        FixedOffset::east_opt(7 * 3600)
            .unwrap()
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn morning_window_is_4_to_13_local_regardless_of_reference_time() {
        let windows = wib();
        for (h, min) in [(0, 0), (4, 0), (9, 30), (12, 59), (23, 59)] {
            let reference = local(2024, 3, 15, h, min);
            let window = windows.window_for(CheckinKind::Morning, reference);
            assert_eq!(window.start, local(2024, 3, 15, 4, 0));
            assert_eq!(window.end, local(2024, 3, 15, 13, 0));
        }
    }

    #[test]
    fn evening_window_is_16_to_23_local() {
        let window = wib().window_for(CheckinKind::Evening, local(2024, 3, 15, 18, 0));
        assert_eq!(window.start, local(2024, 3, 15, 16, 0));
        assert_eq!(window.end, local(2024, 3, 15, 23, 0));
    }

    #[test]
    fn windows_are_half_open() {
        let windows = wib();
        assert!(windows.is_within(CheckinKind::Morning, local(2024, 3, 15, 4, 0)));
        assert!(!windows.is_within(CheckinKind::Morning, local(2024, 3, 15, 13, 0)));
        assert!(windows.is_within(CheckinKind::Evening, local(2024, 3, 15, 22, 59)));
        assert!(!windows.is_within(CheckinKind::Evening, local(2024, 3, 15, 23, 0)));
    }

    #[test]
    fn out_of_window_times_are_rejected() {
        let windows = wib();
        assert!(!windows.is_within(CheckinKind::Morning, local(2024, 3, 15, 14, 0)));
        assert!(!windows.is_within(CheckinKind::Evening, local(2024, 3, 15, 9, 0)));
        assert!(!windows.is_within(CheckinKind::Morning, local(2024, 3, 15, 3, 59)));
    }

    #[test]
    fn local_date_shifts_across_utc_midnight() {
        // 23:00 UTC on the 14th is 06:00 WIB on the 15th.
        let instant = Utc.with_ymd_and_hms(2024, 3, 14, 23, 0, 0).unwrap();
        assert_eq!(
            wib().local_date(instant),
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
        );
        assert!(wib().is_within(CheckinKind::Morning, instant));
    }

    #[test]
    fn month_and_day_ranges_cover_local_days() {
        let windows = wib();
        let (start, end) = windows.month_range(2024, 2).unwrap();
        assert_eq!(start, local(2024, 2, 1, 0, 0));
        assert_eq!(end, local(2024, 3, 1, 0, 0));

        let (start, end) = windows.day_range(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
        assert_eq!(start, local(2024, 12, 31, 0, 0));
        assert_eq!(end, local(2025, 1, 1, 0, 0));
    }

    #[test]
    fn days_in_month_handles_leap_years_and_year_ends() {
        assert_eq!(days_in_month(2024, 2), Some(29));
        assert_eq!(days_in_month(2023, 2), Some(28));
        assert_eq!(days_in_month(2024, 12), Some(31));
        assert_eq!(days_in_month(2024, 4), Some(30));
        assert_eq!(days_in_month(2024, 13), None);
    }

    #[test]
    fn fixed_clock_advances() {
        let clock = FixedClock::new(local(2024, 3, 15, 9, 0));
        clock.advance(Duration::hours(2));
        assert_eq!(clock.now_utc(), local(2024, 3, 15, 11, 0));
    }
}
