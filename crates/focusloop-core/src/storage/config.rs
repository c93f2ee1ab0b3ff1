//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Session durations and the long-break interval
//! - Auto-start and completion prompt behaviour
//! - Sound cue choices
//! - Notification preferences
//! - Which session log backend to use
//!
//! Configuration is stored at `~/.config/focusloop/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;
use crate::session::DEFAULT_TAG_ID;
use crate::timer::{SessionDurations, TimerSettings};

/// Timer configuration. Durations are in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PomodoroSettings {
    #[serde(default = "default_pomodoro_duration")]
    pub pomodoro_duration: u32,
    #[serde(default = "default_short_break")]
    pub short_break_duration: u32,
    #[serde(default = "default_long_break")]
    pub long_break_duration: u32,
    #[serde(default = "default_long_break_interval")]
    pub long_break_interval: u32,
    #[serde(default)]
    pub auto_start_break: bool,
    #[serde(default = "default_true")]
    pub show_completion_view: bool,
}

/// Sound cue configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoundSettings {
    /// Looping tick sound; "None" disables it.
    #[serde(default = "default_tick_sound")]
    pub tick_sound: String,
    /// Ambient loop played during pomodoros only; "none" disables it.
    #[serde(default = "default_ambient_sound")]
    pub ambient_sound: String,
    #[serde(default = "default_completion_sound")]
    pub completion_sound: String,
    /// Whether looping cues start enabled.
    #[serde(default = "default_true")]
    pub sound_button_enabled: bool,
}

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Sqlite,
    Json,
}

/// Session log configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_backend")]
    pub backend: StorageBackend,
}

/// Values remembered between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_tag")]
    pub last_selected_tag: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/focusloop/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub pomodoro: PomodoroSettings,
    #[serde(default)]
    pub sound: SoundSettings,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

// Default functions
fn default_pomodoro_duration() -> u32 {
    1500
}
fn default_short_break() -> u32 {
    300
}
fn default_long_break() -> u32 {
    900
}
fn default_long_break_interval() -> u32 {
    4
}
fn default_true() -> bool {
    true
}
fn default_tick_sound() -> String {
    "None".into()
}
fn default_ambient_sound() -> String {
    "none".into()
}
fn default_completion_sound() -> String {
    "Bell 1".into()
}
fn default_backend() -> StorageBackend {
    StorageBackend::Sqlite
}
fn default_tag() -> String {
    DEFAULT_TAG_ID.into()
}

impl Default for PomodoroSettings {
    fn default() -> Self {
        Self {
            pomodoro_duration: default_pomodoro_duration(),
            short_break_duration: default_short_break(),
            long_break_duration: default_long_break(),
            long_break_interval: default_long_break_interval(),
            auto_start_break: false,
            show_completion_view: true,
        }
    }
}

impl Default for SoundSettings {
    fn default() -> Self {
        Self {
            tick_sound: default_tick_sound(),
            ambient_sound: default_ambient_sound(),
            completion_sound: default_completion_sound(),
            sound_button_enabled: true,
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            last_selected_tag: default_tag(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
                    ),
                    serde_json::Value::Number(_) => serde_json::Value::Number(
                        value
                            .parse::<u32>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?
                            .into(),
                    ),
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        return Err(invalid("cannot set a whole section".into()));
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Default location of the config file.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created.
    pub fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from the default location, writing defaults if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// if it fails validation.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key. Does not save.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the resulting config is invalid. The config is unchanged on error.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Reject settings the timer cannot run with.
    ///
    /// # Errors
    /// Returns the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("pomodoro.pomodoro_duration", self.pomodoro.pomodoro_duration),
            ("pomodoro.short_break_duration", self.pomodoro.short_break_duration),
            ("pomodoro.long_break_duration", self.pomodoro.long_break_duration),
            ("pomodoro.long_break_interval", self.pomodoro.long_break_interval),
        ];
        for (key, value) in checks {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: "must be greater than zero".into(),
                });
            }
        }
        Ok(())
    }

    /// Snapshot consumed by the session state machine.
    pub fn timer_settings(&self) -> TimerSettings {
        TimerSettings {
            durations: SessionDurations {
                pomodoro_secs: self.pomodoro.pomodoro_duration,
                short_break_secs: self.pomodoro.short_break_duration,
                long_break_secs: self.pomodoro.long_break_duration,
            },
            long_break_interval: self.pomodoro.long_break_interval,
            auto_start_break: self.pomodoro.auto_start_break,
            show_completion_view: self.pomodoro.show_completion_view,
        }
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.pomodoro.pomodoro_duration, 1500);
        assert!(parsed.pomodoro.show_completion_view);
        assert_eq!(parsed.storage.backend, StorageBackend::Sqlite);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[pomodoro]\nauto_start_break = true\n").unwrap();
        assert!(parsed.pomodoro.auto_start_break);
        assert_eq!(parsed.pomodoro.long_break_duration, 900);
        assert_eq!(parsed.sound.tick_sound, "None");
        assert_eq!(parsed.session.last_selected_tag, "study");
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("pomodoro.pomodoro_duration").as_deref(), Some("1500"));
        assert_eq!(cfg.get("storage.backend").as_deref(), Some("sqlite"));
        assert_eq!(cfg.get("pomodoro.auto_start_break").as_deref(), Some("false"));
        assert!(cfg.get("pomodoro.missing_key").is_none());
    }

    #[test]
    fn set_updates_nested_values() {
        let mut cfg = Config::default();
        cfg.set("pomodoro.short_break_duration", "420").unwrap();
        cfg.set("pomodoro.auto_start_break", "true").unwrap();
        cfg.set("storage.backend", "json").unwrap();
        cfg.set("session.last_selected_tag", "work").unwrap();
        assert_eq!(cfg.pomodoro.short_break_duration, 420);
        assert!(cfg.pomodoro.auto_start_break);
        assert_eq!(cfg.storage.backend, StorageBackend::Json);
        assert_eq!(cfg.session.last_selected_tag, "work");
    }

    #[test]
    fn set_rejects_bad_input_and_keeps_config() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("pomodoro.nonexistent", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(cfg.set("pomodoro.auto_start_break", "sometimes").is_err());
        assert!(cfg.set("storage.backend", "postgres").is_err());
        assert!(cfg.set("pomodoro.pomodoro_duration", "0").is_err());
        assert!(cfg.set("pomodoro", "1").is_err());
        assert_eq!(cfg.pomodoro.pomodoro_duration, 1500);
        assert_eq!(cfg.storage.backend, StorageBackend::Sqlite);
    }

    #[test]
    fn timer_settings_mirror_config() {
        let mut cfg = Config::default();
        cfg.pomodoro.pomodoro_duration = 60;
        cfg.pomodoro.show_completion_view = false;
        let settings = cfg.timer_settings();
        assert_eq!(settings.durations.pomodoro_secs, 60);
        assert_eq!(settings.long_break_interval, 4);
        assert!(!settings.show_completion_view);
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.pomodoro.long_break_interval, 4);
        assert!(path.exists());

        let mut changed = cfg.clone();
        changed.set("pomodoro.long_break_interval", "3").unwrap();
        changed.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().pomodoro.long_break_interval, 3);
    }

    #[test]
    fn load_from_rejects_zero_duration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[pomodoro]\npomodoro_duration = 0\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
