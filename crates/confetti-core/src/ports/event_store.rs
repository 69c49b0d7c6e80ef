//! EventStore port - durable table of birthdays.
//!
//! # Contract
//! - Each mutation is atomic per user: two racing `upsert`s for the same
//!   user leave exactly one of the two full records behind.
//! - Reads return a consistent snapshot, never a half-written record.
//! - Any method may fail with `CoreError::StoreUnavailable`.

use chrono::NaiveDate;

use crate::domain::{BirthdayRecord, CalendarDay, CoreError, UserId};

pub trait EventStore: Send + Sync {
    /// Insert or replace the record for `user_id`, clearing its notified marker.
    fn upsert(
        &self,
        user_id: UserId,
        display_name: &str,
        birthday: CalendarDay,
    ) -> Result<(), CoreError>;

    /// Delete the record; returns whether one existed.
    fn remove(&self, user_id: UserId) -> Result<bool, CoreError>;

    fn get(&self, user_id: UserId) -> Result<Option<BirthdayRecord>, CoreError>;

    /// Records whose birthday is exactly `day`, ordered by user id.
    fn find_by_date(&self, day: CalendarDay) -> Result<Vec<BirthdayRecord>, CoreError>;

    /// Every record, ordered by (month, day, user id).
    fn all(&self) -> Result<Vec<BirthdayRecord>, CoreError>;

    /// Record that `user_id` was notified on `on`. Marking twice is a no-op.
    ///
    /// # Errors
    /// `CoreError::NotFound` when no record exists for `user_id`.
    fn mark_notified(&self, user_id: UserId, on: NaiveDate) -> Result<(), CoreError>;

    /// Remove every record whose user fails `is_known`; returns how many.
    fn prune_missing(&self, is_known: &dyn Fn(UserId) -> bool) -> Result<usize, CoreError>;

    /// Clear the notified marker of every record (manual recovery).
    fn reset_all_flags(&self) -> Result<(), CoreError>;

    /// Delete every record; returns how many.
    fn wipe(&self) -> Result<usize, CoreError>;
}
