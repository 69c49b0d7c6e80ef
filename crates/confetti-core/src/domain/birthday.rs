//! Birthday record: the row the event store keeps per user.

use chrono::NaiveDate;
use serde::Serialize;

use super::calendar::CalendarDay;
use super::ids::UserId;

/// One stored birthday.
///
/// `last_notified` replaces a boolean "notified today" flag: a record counts
/// as notified only for the date stored there, so a new day needs no reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BirthdayRecord {
    pub user_id: UserId,
    pub display_name: String,
    pub birthday: CalendarDay,
    pub last_notified: Option<NaiveDate>,
}

impl BirthdayRecord {
    pub fn new(user_id: UserId, display_name: impl Into<String>, birthday: CalendarDay) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
            birthday,
            last_notified: None,
        }
    }

    pub fn notified_on(&self, date: NaiveDate) -> bool {
        self.last_notified == Some(date)
    }

    /// Due on `today`: celebrated today and not yet notified today.
    pub fn is_due(&self, today: NaiveDate) -> bool {
        CalendarDay::celebrated_on(today).contains(&self.birthday) && !self.notified_on(today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(month: u32, day: u32) -> BirthdayRecord {
        BirthdayRecord::new(UserId::new(42), "ada", CalendarDay::new(month, day).unwrap())
    }

    #[test]
    fn fresh_record_is_due_on_its_day() {
        let r = record(7, 4);
        assert!(r.is_due(date(2026, 7, 4)));
        assert!(!r.is_due(date(2026, 7, 5)));
    }

    #[test]
    fn notified_today_is_not_due_again() {
        let mut r = record(7, 4);
        r.last_notified = Some(date(2026, 7, 4));
        assert!(!r.is_due(date(2026, 7, 4)));
    }

    #[test]
    fn last_year_notification_does_not_block_this_year() {
        let mut r = record(7, 4);
        r.last_notified = Some(date(2025, 7, 4));
        assert!(r.is_due(date(2026, 7, 4)));
    }

    #[test]
    fn leap_day_record_due_on_feb_28_of_common_year() {
        let r = record(2, 29);
        assert!(r.is_due(date(2026, 2, 28)));
        assert!(!r.is_due(date(2028, 2, 28)));
        assert!(r.is_due(date(2028, 2, 29)));
    }
}
