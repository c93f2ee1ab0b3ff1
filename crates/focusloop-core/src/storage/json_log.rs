//! Session log stored as a single pretty-printed JSON array.
//!
//! Appends rewrite the file through a temporary sibling and an atomic rename,
//! so a crash mid-write leaves the previous log intact. Records are decoded
//! one by one; a record that fails to decode is skipped on load and carried
//! through unchanged on the next append.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::StorageError;
use crate::session::Session;

use super::session_log::SessionLog;

pub struct JsonSessionLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonSessionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_records(&self) -> Result<Vec<Value>, StorageError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StorageError::OpenFailed {
                    path: self.path.clone(),
                    message: e.to_string(),
                })
            }
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Array(records)) => Ok(records),
            Ok(_) => Err(StorageError::Corrupt {
                path: self.path.clone(),
                message: "expected a JSON array of sessions".into(),
            }),
            Err(e) => Err(StorageError::Corrupt {
                path: self.path.clone(),
                message: e.to_string(),
            }),
        }
    }

    fn write_records(&self, records: &[Value]) -> Result<(), StorageError> {
        let serialized = serde_json::to_string_pretty(records)
            .map_err(|e| StorageError::AppendFailed(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");

        let write = || -> std::io::Result<()> {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut file = File::create(&tmp)?;
            file.write_all(serialized.as_bytes())?;
            file.sync_all()?;
            fs::rename(&tmp, &self.path)
        };
        write().map_err(|e| {
            let _ = fs::remove_file(&tmp);
            StorageError::AppendFailed(format!("{}: {e}", self.path.display()))
        })
    }
}

impl SessionLog for JsonSessionLog {
    fn append(&self, session: &Session) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut records = self
            .read_records()
            .map_err(|e| StorageError::AppendFailed(e.to_string()))?;
        let record =
            serde_json::to_value(session).map_err(|e| StorageError::AppendFailed(e.to_string()))?;
        records.push(record);
        self.write_records(&records)?;
        debug!(path = %self.path.display(), total = records.len(), "session appended");
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<Session>, StorageError> {
        let records = self.read_records()?;
        let mut sessions = Vec::with_capacity(records.len());
        for (index, record) in records.into_iter().enumerate() {
            match serde_json::from_value::<Session>(record) {
                Ok(session) => sessions.push(session),
                Err(e) => warn!(index, error = %e, "skipping malformed session record"),
            }
        }
        Ok(sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::SessionType;
    use chrono::Utc;

    #[test]
    fn missing_file_is_empty_log() {
        let dir = tempfile::tempdir().unwrap();
        let log = JsonSessionLog::new(dir.path().join("sessions.json"));
        assert!(log.load_all().unwrap().is_empty());
    }

    #[test]
    fn append_creates_and_extends_file() {
        let dir = tempfile::tempdir().unwrap();
        let log = JsonSessionLog::new(dir.path().join("sessions.json"));
        log.append(&Session::new(SessionType::Pomodoro, 1, "work", 1500, Utc::now()))
            .unwrap();
        log.append(&Session::new(SessionType::Pomodoro, 2, "work", 1500, Utc::now()))
            .unwrap();

        let all = log.load_all().unwrap();
        assert_eq!(all.len(), 2);
        assert!(!dir.path().join("sessions.json.tmp").exists());
    }

    #[test]
    fn bad_record_does_not_block_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.json");
        fs::write(
            &path,
            r#"[
                {"sessionType": "pomodoro", "completionTime": "2025-01-06T10:00:00Z",
                 "sessionNumber": 1, "selectedTag": "work"},
                {"sessionType": "pomodoro", "completionTime": "not a date"},
                {"sessionType": "shortBreak", "completionTime": "2025-01-06T10:30:00Z",
                 "sessionNumber": 0, "selectedTag": "work", "duration": 280, "isCompleted": true}
            ]"#,
        )
        .unwrap();

        let log = JsonSessionLog::new(&path);
        let all = log.load_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].duration, 1500);
        assert_eq!(all[1].duration, 280);

        // The unreadable record is preserved on append.
        log.append(&Session::new(SessionType::Pomodoro, 2, "work", 1500, Utc::now()))
            .unwrap();
        let raw: Vec<Value> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw.len(), 4);
        assert_eq!(log.load_all().unwrap().len(), 3);
    }

    #[test]
    fn corrupt_file_fails_append_without_overwriting() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.json");
        fs::write(&path, "{ definitely not an array").unwrap();

        let log = JsonSessionLog::new(&path);
        assert!(log.load_all().is_err());
        let result = log.append(&Session::new(SessionType::Pomodoro, 1, "work", 1500, Utc::now()));
        assert!(matches!(result, Err(StorageError::AppendFailed(_))));
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ definitely not an array");
    }
}
