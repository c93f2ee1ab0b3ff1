use std::sync::{Mutex, PoisonError};

use crate::error::StorageError;
use crate::session::Session;

/// Append-only store of finished sessions.
///
/// `append` must be durable before it returns. `load_all` skips records it
/// cannot decode instead of failing the whole load.
pub trait SessionLog: Send + Sync {
    fn append(&self, session: &Session) -> Result<(), StorageError>;

    fn load_all(&self) -> Result<Vec<Session>, StorageError>;
}

/// In-process log, for tests and as a fallback when no store can be opened.
#[derive(Debug, Default)]
pub struct MemorySessionLog {
    sessions: Mutex<Vec<Session>>,
}

impl MemorySessionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sessions(sessions: Vec<Session>) -> Self {
        Self {
            sessions: Mutex::new(sessions),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Session>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionLog for MemorySessionLog {
    fn append(&self, session: &Session) -> Result<(), StorageError> {
        self.lock().push(session.clone());
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<Session>, StorageError> {
        Ok(self.lock().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::SessionType;
    use chrono::Utc;

    #[test]
    fn memory_log_appends_in_order() {
        let log = MemorySessionLog::new();
        assert!(log.is_empty());
        log.append(&Session::new(SessionType::Pomodoro, 1, "work", 1500, Utc::now()))
            .unwrap();
        log.append(&Session::new(SessionType::Pomodoro, 2, "study", 1500, Utc::now()))
            .unwrap();
        let all = log.load_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].selected_tag, "work");
        assert_eq!(all[1].session_number, 2);
    }
}
