mod config;
pub mod database;
pub mod json_log;
mod session_log;

pub use config::{
    Config, NotificationsConfig, PomodoroSettings, SessionConfig, SoundSettings, StorageBackend,
    StorageConfig,
};
pub use database::SqliteSessionLog;
pub use json_log::JsonSessionLog;
pub use session_log::{MemorySessionLog, SessionLog};

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::StorageError;

/// Returns `~/.config/focusloop[-dev]/` based on FOCUSLOOP_ENV.
///
/// Set FOCUSLOOP_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("FOCUSLOOP_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("focusloop-dev")
    } else {
        base_dir.join("focusloop")
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StorageError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

/// Open the session log selected in the configuration, inside `data_dir()`.
///
/// # Errors
/// Returns an error if the data directory or the backing store cannot be opened.
pub fn open_session_log(config: &Config) -> Result<Arc<dyn SessionLog>, StorageError> {
    let dir = data_dir()?;
    let log: Arc<dyn SessionLog> = match config.storage.backend {
        StorageBackend::Sqlite => Arc::new(SqliteSessionLog::open(dir.join("focusloop.db"))?),
        StorageBackend::Json => Arc::new(JsonSessionLog::new(dir.join("sessions.json"))),
    };
    Ok(log)
}
