//! InMemoryStore - ephemeral event store and channel registry.
//!
//! # Implementation
//! - `BTreeMap<UserId, BirthdayRecord>` keeps results ordered by user id
//! - one `Mutex` per table serialises writers; a read clones under the lock,
//!   so callers always get a consistent snapshot

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;

use crate::domain::{BirthdayRecord, CalendarDay, ChannelId, CommunityId, CoreError, UserId};
use crate::ports::{ChannelRegistry, EventStore};

/// Development and test store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    birthdays: Mutex<BTreeMap<UserId, BirthdayRecord>>,
    channels: Mutex<HashMap<CommunityId, ChannelId>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn birthdays(&self) -> Result<MutexGuard<'_, BTreeMap<UserId, BirthdayRecord>>, CoreError> {
        self.birthdays
            .lock()
            .map_err(|e| CoreError::StoreUnavailable(format!("lock poisoned: {e}")))
    }

    fn channels(&self) -> Result<MutexGuard<'_, HashMap<CommunityId, ChannelId>>, CoreError> {
        self.channels
            .lock()
            .map_err(|e| CoreError::StoreUnavailable(format!("lock poisoned: {e}")))
    }
}

impl EventStore for InMemoryStore {
    fn upsert(
        &self,
        user_id: UserId,
        display_name: &str,
        birthday: CalendarDay,
    ) -> Result<(), CoreError> {
        self.birthdays()?.insert(
            user_id,
            BirthdayRecord::new(user_id, display_name, birthday),
        );
        Ok(())
    }

    fn remove(&self, user_id: UserId) -> Result<bool, CoreError> {
        Ok(self.birthdays()?.remove(&user_id).is_some())
    }

    fn get(&self, user_id: UserId) -> Result<Option<BirthdayRecord>, CoreError> {
        Ok(self.birthdays()?.get(&user_id).cloned())
    }

    fn find_by_date(&self, day: CalendarDay) -> Result<Vec<BirthdayRecord>, CoreError> {
        Ok(self
            .birthdays()?
            .values()
            .filter(|r| r.birthday == day)
            .cloned()
            .collect())
    }

    fn all(&self) -> Result<Vec<BirthdayRecord>, CoreError> {
        let mut records: Vec<BirthdayRecord> = self.birthdays()?.values().cloned().collect();
        records.sort_by_key(|r| (r.birthday, r.user_id));
        Ok(records)
    }

    fn mark_notified(&self, user_id: UserId, on: NaiveDate) -> Result<(), CoreError> {
        let mut birthdays = self.birthdays()?;
        let record = birthdays
            .get_mut(&user_id)
            .ok_or(CoreError::NotFound(user_id))?;
        record.last_notified = Some(on);
        Ok(())
    }

    fn prune_missing(&self, is_known: &dyn Fn(UserId) -> bool) -> Result<usize, CoreError> {
        let mut birthdays = self.birthdays()?;
        let before = birthdays.len();
        birthdays.retain(|user_id, _| is_known(*user_id));
        Ok(before - birthdays.len())
    }

    fn reset_all_flags(&self) -> Result<(), CoreError> {
        for record in self.birthdays()?.values_mut() {
            record.last_notified = None;
        }
        Ok(())
    }

    fn wipe(&self) -> Result<usize, CoreError> {
        let mut birthdays = self.birthdays()?;
        let removed = birthdays.len();
        birthdays.clear();
        Ok(removed)
    }
}

impl ChannelRegistry for InMemoryStore {
    fn set_channel(&self, community: CommunityId, channel: ChannelId) -> Result<(), CoreError> {
        self.channels()?.insert(community, channel);
        Ok(())
    }

    fn get_channel(&self, community: CommunityId) -> Result<Option<ChannelId>, CoreError> {
        Ok(self.channels()?.get(&community).copied())
    }
}
