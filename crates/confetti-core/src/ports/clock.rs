//! Clock port - the scheduler's reference clock.
//!
//! The scheduler never reads wall-clock time directly; it asks a `Clock`.
//! Tests use `FixedClock` and move it between days.

use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, Utc};

/// Clock provides the current instant. Dates are taken in UTC.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Production clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Settable clock for tests and simulations.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Midday UTC on the given date; `None` for an impossible date.
    pub fn on(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .map(|dt| Self::new(dt.and_utc()))
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut guard = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *guard += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_reports_its_date() {
        let clock = FixedClock::on(2026, 7, 4).unwrap();
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2026, 7, 4).unwrap());
    }

    #[test]
    fn fixed_clock_can_advance_a_day() {
        let clock = FixedClock::on(2026, 12, 31).unwrap();
        clock.advance(chrono::Duration::days(1));
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2027, 1, 1).unwrap());
    }

    #[test]
    fn impossible_date_yields_none() {
        assert!(FixedClock::on(2026, 2, 30).is_none());
    }
}
