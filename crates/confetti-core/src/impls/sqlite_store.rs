//! SQLite-backed event store and channel registry.
//!
//! One database file holds both tables. The connection is owned exclusively
//! by `SqliteStore` behind a `Mutex`, so all writes are serialised and no
//! caller ever touches the handle directly.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, params};

use super::schema::{apply_schema, read_schema_version};
use crate::domain::{BirthdayRecord, CalendarDay, ChannelId, CommunityId, CoreError, UserId};
use crate::ports::{ChannelRegistry, EventStore};

const RECORD_COLUMNS: &str = "user_id, display_name, birth_month, birth_day, last_notified";

/// SQLite integers are signed 64-bit; snowflakes are stored bit-cast so the
/// full `u64` range round-trips.
fn to_sql_id(id: u64) -> i64 {
    id as i64
}

fn from_sql_id(raw: i64) -> u64 {
    raw as u64
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("lock poisoned: {0}")]
    Lock(String),

    #[error("corrupt row for user {user_id}: month={month} day={day}")]
    CorruptRow { user_id: u64, month: u32, day: u32 },
}

impl From<StoreError> for CoreError {
    fn from(e: StoreError) -> Self {
        CoreError::StoreUnavailable(e.to_string())
    }
}

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and apply the schema.
    ///
    /// Failing here is the one error that should stop the process.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Io(e.to_string()))?;
        }
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        apply_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn schema_version(&self) -> Result<Option<u32>, StoreError> {
        let conn = self.lock()?;
        Ok(read_schema_version(&conn)?)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Lock(e.to_string()))
    }

    fn query_records(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<BirthdayRecord>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params, read_row)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?.into_record()?);
        }
        // bit-cast ids do not sort like u64 inside SQLite
        records.sort_by_key(|r| (r.birthday, r.user_id));
        Ok(records)
    }
}

impl EventStore for SqliteStore {
    fn upsert(
        &self,
        user_id: UserId,
        display_name: &str,
        birthday: CalendarDay,
    ) -> Result<(), CoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO birthdays (user_id, display_name, birth_month, birth_day, last_notified) \
             VALUES (?1, ?2, ?3, ?4, NULL) \
             ON CONFLICT(user_id) DO UPDATE SET \
               display_name = excluded.display_name, \
               birth_month = excluded.birth_month, \
               birth_day = excluded.birth_day, \
               last_notified = NULL",
            params![to_sql_id(user_id.get()), display_name, birthday.month(), birthday.day()],
        )
        .map_err(StoreError::from)?;
        Ok(())
    }

    fn remove(&self, user_id: UserId) -> Result<bool, CoreError> {
        let conn = self.lock()?;
        let rows = conn
            .execute(
                "DELETE FROM birthdays WHERE user_id = ?1",
                params![to_sql_id(user_id.get())],
            )
            .map_err(StoreError::from)?;
        Ok(rows > 0)
    }

    fn get(&self, user_id: UserId) -> Result<Option<BirthdayRecord>, CoreError> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                &format!("SELECT {RECORD_COLUMNS} FROM birthdays WHERE user_id = ?1"),
                params![to_sql_id(user_id.get())],
                read_row,
            )
            .optional()
            .map_err(StoreError::from)?;
        Ok(row.map(RawRow::into_record).transpose()?)
    }

    fn find_by_date(&self, day: CalendarDay) -> Result<Vec<BirthdayRecord>, CoreError> {
        Ok(self.query_records(
            &format!(
                "SELECT {RECORD_COLUMNS} FROM birthdays \
                 WHERE birth_month = ?1 AND birth_day = ?2"
            ),
            params![day.month(), day.day()],
        )?)
    }

    fn all(&self) -> Result<Vec<BirthdayRecord>, CoreError> {
        Ok(self.query_records(
            &format!("SELECT {RECORD_COLUMNS} FROM birthdays"),
            [],
        )?)
    }

    fn mark_notified(&self, user_id: UserId, on: NaiveDate) -> Result<(), CoreError> {
        let conn = self.lock()?;
        let rows = conn
            .execute(
                "UPDATE birthdays SET last_notified = ?1 WHERE user_id = ?2",
                params![on, to_sql_id(user_id.get())],
            )
            .map_err(StoreError::from)?;
        if rows == 0 {
            return Err(CoreError::NotFound(user_id));
        }
        Ok(())
    }

    fn prune_missing(&self, is_known: &dyn Fn(UserId) -> bool) -> Result<usize, CoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(StoreError::from)?;

        let ids: Vec<i64> = {
            let mut stmt = tx
                .prepare("SELECT user_id FROM birthdays")
                .map_err(StoreError::from)?;
            let rows = stmt
                .query_map([], |row| row.get::<_, i64>(0))
                .map_err(StoreError::from)?;
            rows.collect::<Result<_, _>>().map_err(StoreError::from)?
        };

        let mut removed = 0;
        for id in ids
            .into_iter()
            .filter(|id| !is_known(UserId::new(from_sql_id(*id))))
        {
            removed += tx
                .execute("DELETE FROM birthdays WHERE user_id = ?1", params![id])
                .map_err(StoreError::from)?;
        }

        tx.commit().map_err(StoreError::from)?;
        Ok(removed)
    }

    fn reset_all_flags(&self) -> Result<(), CoreError> {
        let conn = self.lock()?;
        conn.execute("UPDATE birthdays SET last_notified = NULL", [])
            .map_err(StoreError::from)?;
        Ok(())
    }

    fn wipe(&self) -> Result<usize, CoreError> {
        let conn = self.lock()?;
        let rows = conn
            .execute("DELETE FROM birthdays", [])
            .map_err(StoreError::from)?;
        Ok(rows)
    }
}

impl ChannelRegistry for SqliteStore {
    fn set_channel(&self, community: CommunityId, channel: ChannelId) -> Result<(), CoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO birthday_channels (guild_id, channel_id) VALUES (?1, ?2) \
             ON CONFLICT(guild_id) DO UPDATE SET channel_id = excluded.channel_id",
            params![to_sql_id(community.get()), to_sql_id(channel.get())],
        )
        .map_err(StoreError::from)?;
        Ok(())
    }

    fn get_channel(&self, community: CommunityId) -> Result<Option<ChannelId>, CoreError> {
        let conn = self.lock()?;
        let channel: Option<i64> = conn
            .query_row(
                "SELECT channel_id FROM birthday_channels WHERE guild_id = ?1",
                params![to_sql_id(community.get())],
                |row| row.get(0),
            )
            .optional()
            .map_err(StoreError::from)?;
        Ok(channel.map(|raw| ChannelId::new(from_sql_id(raw))))
    }
}

// ---------------------------------------------------------------------------
// Row conversion
// ---------------------------------------------------------------------------

/// Row as stored, before the calendar day is re-validated.
struct RawRow {
    user_id: u64,
    display_name: String,
    month: u32,
    day: u32,
    last_notified: Option<NaiveDate>,
}

impl RawRow {
    fn into_record(self) -> Result<BirthdayRecord, StoreError> {
        let birthday = CalendarDay::new(self.month, self.day).map_err(|_| StoreError::CorruptRow {
            user_id: self.user_id,
            month: self.month,
            day: self.day,
        })?;
        Ok(BirthdayRecord {
            user_id: UserId::new(self.user_id),
            display_name: self.display_name,
            birthday,
            last_notified: self.last_notified,
        })
    }
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
    Ok(RawRow {
        user_id: from_sql_id(row.get(0)?),
        display_name: row.get(1)?,
        month: row.get(2)?,
        day: row.get(3)?,
        last_notified: row.get(4)?,
    })
}
