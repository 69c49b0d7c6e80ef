//! Calendar day (month + day, no year) and the leap-day rule.
//!
//! Validation uses the leap reference year 2000 so Feb 29 is storable. In a
//! non-leap year a Feb 29 birthday is celebrated on Feb 28.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::fmt;

use super::errors::CoreError;

const REFERENCE_LEAP_YEAR: i32 = 2000;

/// An annual date: validated (month, day) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CalendarDay {
    month: u32,
    day: u32,
}

impl CalendarDay {
    pub const LEAP_DAY: CalendarDay = CalendarDay { month: 2, day: 29 };

    /// Validate a (month, day) pair.
    ///
    /// # Errors
    /// `CoreError::InvalidDate` when the pair is not a real date in any year.
    pub fn new(month: u32, day: u32) -> Result<Self, CoreError> {
        NaiveDate::from_ymd_opt(REFERENCE_LEAP_YEAR, month, day)
            .map(|_| Self { month, day })
            .ok_or(CoreError::InvalidDate { month, day })
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            month: date.month(),
            day: date.day(),
        }
    }

    /// Calendar days celebrated on `date`.
    ///
    /// Usually just the date's own (month, day). On Feb 28 of a non-leap year
    /// the leap day is celebrated as well.
    pub fn celebrated_on(date: NaiveDate) -> Vec<CalendarDay> {
        let own = Self::of(date);
        if own.month == 2 && own.day == 28 && !date.leap_year() {
            vec![own, Self::LEAP_DAY]
        } else {
            vec![own]
        }
    }

    /// The concrete date this calendar day falls on in `year`.
    pub fn in_year(&self, year: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, self.month, self.day).or_else(|| {
            if *self == Self::LEAP_DAY {
                NaiveDate::from_ymd_opt(year, 2, 28)
            } else {
                None
            }
        })
    }
}

impl fmt::Display for CalendarDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case::feb_30(2, 30)]
    #[case::feb_31(2, 31)]
    #[case::april_31(4, 31)]
    #[case::month_zero(0, 10)]
    #[case::month_13(13, 1)]
    #[case::day_zero(5, 0)]
    fn rejects_impossible_dates(#[case] month: u32, #[case] day: u32) {
        assert!(matches!(
            CalendarDay::new(month, day),
            Err(CoreError::InvalidDate { .. })
        ));
    }

    #[test]
    fn accepts_leap_day() {
        assert_eq!(CalendarDay::new(2, 29).unwrap(), CalendarDay::LEAP_DAY);
    }

    #[test]
    fn leap_day_is_celebrated_on_feb_28_in_common_years() {
        let days = CalendarDay::celebrated_on(date(2025, 2, 28));
        assert_eq!(days, vec![CalendarDay::new(2, 28).unwrap(), CalendarDay::LEAP_DAY]);
    }

    #[test]
    fn leap_day_is_celebrated_on_its_own_day_in_leap_years() {
        assert_eq!(
            CalendarDay::celebrated_on(date(2024, 2, 28)),
            vec![CalendarDay::new(2, 28).unwrap()]
        );
        assert_eq!(
            CalendarDay::celebrated_on(date(2024, 2, 29)),
            vec![CalendarDay::LEAP_DAY]
        );
    }

    #[test]
    fn in_year_maps_leap_day() {
        assert_eq!(CalendarDay::LEAP_DAY.in_year(2025), Some(date(2025, 2, 28)));
        assert_eq!(CalendarDay::LEAP_DAY.in_year(2024), Some(date(2024, 2, 29)));
        assert_eq!(CalendarDay::new(7, 4).unwrap().in_year(2026), Some(date(2026, 7, 4)));
    }

    #[test]
    fn display_is_zero_padded() {
        assert_eq!(CalendarDay::new(7, 4).unwrap().to_string(), "07-04");
    }
}
