//! SQLite-backed session log.
//!
//! One row per finished session. `duration` and `is_completed` are nullable
//! so rows written before those columns existed decode with defaults.

use std::path::Path;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use tracing::warn;

use crate::error::StorageError;
use crate::session::Session;
use crate::timer::{SessionDurations, SessionType};

use super::session_log::SessionLog;

pub struct SqliteSessionLog {
    conn: Mutex<Connection>,
}

/// Raw column values, decoded leniently in [`decode_row`].
struct Row {
    id: i64,
    session_type: String,
    completion_time: String,
    session_number: Option<i64>,
    selected_tag: Option<String>,
    duration: Option<i64>,
    is_completed: Option<bool>,
}

impl SqliteSessionLog {
    /// Open (or create) the database at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|e| StorageError::OpenFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let log = Self {
            conn: Mutex::new(conn),
        };
        log.migrate()?;
        Ok(log)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let log = Self {
            conn: Mutex::new(conn),
        };
        log.migrate()?;
        Ok(log)
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn migrate(&self) -> Result<(), StorageError> {
        self.conn().execute_batch(
            "CREATE TABLE IF NOT EXISTS sessions (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                session_type    TEXT NOT NULL,
                completion_time TEXT NOT NULL,
                session_number  INTEGER NOT NULL DEFAULT 0,
                selected_tag    TEXT NOT NULL DEFAULT 'study',
                duration        INTEGER,
                is_completed    INTEGER
            );

            CREATE INDEX IF NOT EXISTS idx_sessions_completion_time ON sessions(completion_time);
            CREATE INDEX IF NOT EXISTS idx_sessions_type_time ON sessions(session_type, completion_time);",
        )?;
        Ok(())
    }

    /// Insert a raw row, bypassing validation. Used to seed legacy data.
    #[cfg(test)]
    fn insert_raw(
        &self,
        session_type: &str,
        completion_time: &str,
        duration: Option<i64>,
        is_completed: Option<bool>,
    ) -> Result<(), StorageError> {
        self.conn().execute(
            "INSERT INTO sessions (session_type, completion_time, duration, is_completed)
             VALUES (?1, ?2, ?3, ?4)",
            params![session_type, completion_time, duration, is_completed],
        )?;
        Ok(())
    }
}

impl SessionLog for SqliteSessionLog {
    fn append(&self, session: &Session) -> Result<(), StorageError> {
        self.conn()
            .execute(
                "INSERT INTO sessions
                    (session_type, completion_time, session_number, selected_tag, duration, is_completed)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    session.session_type.as_str(),
                    session.completion_time.to_rfc3339(),
                    session.session_number,
                    session.selected_tag,
                    session.duration,
                    session.is_completed,
                ],
            )
            .map_err(|e| StorageError::AppendFailed(e.to_string()))?;
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<Session>, StorageError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, session_type, completion_time, session_number, selected_tag, duration, is_completed
             FROM sessions
             ORDER BY id",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(Row {
                id: row.get(0)?,
                session_type: row.get(1)?,
                completion_time: row.get(2)?,
                session_number: row.get(3)?,
                selected_tag: row.get(4)?,
                duration: row.get(5)?,
                is_completed: row.get(6)?,
            })
        })?;

        let mut sessions = Vec::new();
        for row in rows {
            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    warn!(error = %e, "skipping unreadable session row");
                    continue;
                }
            };
            match decode_row(&row) {
                Ok(session) => sessions.push(session),
                Err(reason) => warn!(id = row.id, %reason, "skipping malformed session row"),
            }
        }
        Ok(sessions)
    }
}

fn decode_row(row: &Row) -> Result<Session, String> {
    let session_type: SessionType = row.session_type.parse().map_err(|e| format!("{e}"))?;
    let completion_time = DateTime::parse_from_rfc3339(&row.completion_time)
        .map_err(|e| format!("bad completion_time '{}': {e}", row.completion_time))?
        .with_timezone(&Utc);

    let duration = row
        .duration
        .and_then(|d| u32::try_from(d).ok())
        .unwrap_or_else(|| SessionDurations::default().duration(session_type));

    let mut session = Session::new(
        session_type,
        row.session_number
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0),
        row.selected_tag
            .clone()
            .unwrap_or_else(|| crate::session::DEFAULT_TAG_ID.to_string()),
        duration,
        completion_time,
    );
    if !row.is_completed.unwrap_or(true) {
        session = session.stopped_early();
    }
    Ok(session)
}
