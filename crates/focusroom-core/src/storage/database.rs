//! SQLite-based session storage and statistics.
//!
//! Provides persistent storage for:
//! - Completed work intervals (append-only)
//! - Session statistics (today and all-time, per owner)

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use super::{data_dir, migrations};
use crate::error::DatabaseError;
use crate::identity::OwnerId;
use crate::recorder::SessionRecord;

/// A session row as read back from the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    pub id: i64,
    pub owner_id: String,
    pub kind: String,
    pub duration_secs: u64,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Stats {
    pub total_sessions: u64,
    pub total_focus_min: u64,
    pub today_sessions: u64,
    pub today_focus_min: u64,
}

/// SQLite database for session storage.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/focusroom/focusroom.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, DatabaseError> {
        let dir = data_dir().map_err(DatabaseError::DataDir)?;
        Self::open_at(&dir.join("focusroom.db"))
    }

    /// Open (or create) the database file at `path`.
    pub fn open_at(path: &Path) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_connection(conn)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, DatabaseError> {
        migrations::migrate(&conn).map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Append a completed work interval.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn append_session(&self, record: &SessionRecord) -> Result<i64, DatabaseError> {
        self.conn.execute(
            "INSERT INTO sessions (owner_id, kind, duration_secs, occurred_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                record.owner_id.as_str(),
                record.kind.as_str(),
                record.duration_secs,
                timestamp(record.occurred_at),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Totals for `owner` (or every owner), with "today" being the UTC day of `now`.
    pub fn stats(&self, owner: Option<&OwnerId>, now: DateTime<Utc>) -> Result<Stats, DatabaseError> {
        let owner = owner.map(OwnerId::as_str);
        let today_start = format!("{}T00:00:00Z", now.format("%Y-%m-%d"));

        let (total_sessions, total_secs): (u64, u64) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(duration_secs), 0)
             FROM sessions
             WHERE kind = 'work' AND (?1 IS NULL OR owner_id = ?1)",
            params![owner],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let (today_sessions, today_secs): (u64, u64) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(duration_secs), 0)
             FROM sessions
             WHERE kind = 'work' AND (?1 IS NULL OR owner_id = ?1) AND occurred_at >= ?2",
            params![owner, today_start],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok(Stats {
            total_sessions,
            total_focus_min: total_secs / 60,
            today_sessions,
            today_focus_min: today_secs / 60,
        })
    }

    /// Most recent sessions first.
    pub fn recent_sessions(
        &self,
        owner: Option<&OwnerId>,
        limit: usize,
    ) -> Result<Vec<StoredSession>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, owner_id, kind, duration_secs, occurred_at
             FROM sessions
             WHERE ?1 IS NULL OR owner_id = ?1
             ORDER BY occurred_at DESC, id DESC
             LIMIT ?2",
        )?;

        let rows = stmt.query_map(
            params![owner.map(OwnerId::as_str), limit as i64],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, u64>(3)?,
                    row.get::<_, String>(4)?,
                ))
            },
        )?;

        let mut sessions = Vec::new();
        for row in rows {
            let (id, owner_id, kind, duration_secs, occurred_at) = row?;
            let occurred_at = DateTime::parse_from_rfc3339(&occurred_at)
                .map_err(|e| DatabaseError::QueryFailed(format!("bad occurred_at '{occurred_at}': {e}")))?
                .with_timezone(&Utc);
            sessions.push(StoredSession {
                id,
                owner_id,
                kind,
                duration_secs,
                occurred_at,
            });
        }
        Ok(sessions)
    }
}

/// Fixed-width UTC timestamps so that text comparison orders by time.
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn owner(id: &str) -> OwnerId {
        OwnerId::new(id).unwrap()
    }

    #[test]
    fn record_and_query() {
        let db = Database::open_memory().unwrap();
        let now = Utc::now();
        db.append_session(&SessionRecord::work(owner("u1"), now, 1500))
            .unwrap();
        let stats = db.stats(Some(&owner("u1")), now).unwrap();
        assert_eq!(stats.total_sessions, 1);
        assert_eq!(stats.total_focus_min, 25);
        assert_eq!(stats.today_sessions, 1);
        assert_eq!(stats.today_focus_min, 25);
    }

    #[test]
    fn stats_split_today_from_history_and_by_owner() {
        let db = Database::open_memory().unwrap();
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 15, 0, 0).unwrap();
        let yesterday = now - Duration::days(1);

        db.append_session(&SessionRecord::work(owner("u1"), now, 1500)).unwrap();
        db.append_session(&SessionRecord::work(owner("u1"), yesterday, 1500)).unwrap();
        db.append_session(&SessionRecord::work(owner("u2"), now, 1500)).unwrap();

        let u1 = db.stats(Some(&owner("u1")), now).unwrap();
        assert_eq!(
            u1,
            Stats {
                total_sessions: 2,
                total_focus_min: 50,
                today_sessions: 1,
                today_focus_min: 25,
            }
        );

        let everyone = db.stats(None, now).unwrap();
        assert_eq!(everyone.total_sessions, 3);
        assert_eq!(everyone.today_sessions, 2);
    }

    #[test]
    fn empty_database_has_zero_stats() {
        let db = Database::open_memory().unwrap();
        assert_eq!(db.stats(None, Utc::now()).unwrap(), Stats::default());
    }

    #[test]
    fn recent_sessions_newest_first() {
        let db = Database::open_memory().unwrap();
        let t0 = Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap();
        for i in 0..3 {
            db.append_session(&SessionRecord::work(owner("u1"), t0 + Duration::minutes(30 * i), 1500))
                .unwrap();
        }

        let recent = db.recent_sessions(Some(&owner("u1")), 2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].occurred_at, t0 + Duration::minutes(60));
        assert_eq!(recent[0].kind, "work");
        assert_eq!(recent[1].occurred_at, t0 + Duration::minutes(30));
    }

    #[test]
    fn open_at_persists_across_connections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("focusroom.db");
        {
            let db = Database::open_at(&path).unwrap();
            db.append_session(&SessionRecord::work(owner("u1"), Utc::now(), 1500))
                .unwrap();
        }
        let db = Database::open_at(&path).unwrap();
        assert_eq!(db.stats(None, Utc::now()).unwrap().total_sessions, 1);
    }
}
