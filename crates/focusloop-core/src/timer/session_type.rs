use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionType {
    Pomodoro,
    ShortBreak,
    LongBreak,
}

impl SessionType {
    pub const ALL: [SessionType; 3] = [
        SessionType::Pomodoro,
        SessionType::ShortBreak,
        SessionType::LongBreak,
    ];

    /// Label shown next to the countdown. Pomodoros show the bare timer.
    pub fn display_name(&self) -> &'static str {
        match self {
            SessionType::Pomodoro => "",
            SessionType::ShortBreak => "Short Break",
            SessionType::LongBreak => "Long Break",
        }
    }

    pub fn is_break(&self) -> bool {
        !matches!(self, SessionType::Pomodoro)
    }

    /// Stable identifier used by the storage backends.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::Pomodoro => "pomodoro",
            SessionType::ShortBreak => "shortBreak",
            SessionType::LongBreak => "longBreak",
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionType::Pomodoro => f.write_str("Pomodoro"),
            other => f.write_str(other.display_name()),
        }
    }
}

impl FromStr for SessionType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pomodoro" => Ok(SessionType::Pomodoro),
            "shortBreak" => Ok(SessionType::ShortBreak),
            "longBreak" => Ok(SessionType::LongBreak),
            other => Err(ValidationError::InvalidValue {
                field: "session_type".into(),
                message: format!("unknown session type '{other}'"),
            }),
        }
    }
}

/// Configured length of each session type, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDurations {
    pub pomodoro_secs: u32,
    pub short_break_secs: u32,
    pub long_break_secs: u32,
}

impl SessionDurations {
    pub fn duration(&self, session_type: SessionType) -> u32 {
        match session_type {
            SessionType::Pomodoro => self.pomodoro_secs,
            SessionType::ShortBreak => self.short_break_secs,
            SessionType::LongBreak => self.long_break_secs,
        }
    }
}

impl Default for SessionDurations {
    fn default() -> Self {
        Self {
            pomodoro_secs: 1500,
            short_break_secs: 300,
            long_break_secs: 900,
        }
    }
}

/// Snapshot of the settings the state machine reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSettings {
    pub durations: SessionDurations,
    /// Pomodoros per cycle before the long break.
    pub long_break_interval: u32,
    pub auto_start_break: bool,
    pub show_completion_view: bool,
}

impl TimerSettings {
    pub fn duration(&self, session_type: SessionType) -> u32 {
        self.durations.duration(session_type)
    }
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            durations: SessionDurations::default(),
            long_break_interval: 4,
            auto_start_break: false,
            show_completion_view: true,
        }
    }
}

/// Format seconds as `MM:SS`.
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_durations() {
        let d = SessionDurations::default();
        assert_eq!(d.duration(SessionType::Pomodoro), 1500);
        assert_eq!(d.duration(SessionType::ShortBreak), 300);
        assert_eq!(d.duration(SessionType::LongBreak), 900);
    }

    #[test]
    fn only_breaks_carry_a_label() {
        assert_eq!(SessionType::Pomodoro.display_name(), "");
        assert_eq!(SessionType::ShortBreak.display_name(), "Short Break");
        assert_eq!(SessionType::LongBreak.display_name(), "Long Break");
    }

    #[test]
    fn storage_names_parse_back() {
        for t in SessionType::ALL {
            assert_eq!(t.as_str().parse::<SessionType>().unwrap(), t);
        }
        assert!("focus".parse::<SessionType>().is_err());
    }

    #[test]
    fn serde_uses_camel_case() {
        let json = serde_json::to_string(&SessionType::ShortBreak).unwrap();
        assert_eq!(json, "\"shortBreak\"");
    }

    #[test]
    fn clock_formatting() {
        assert_eq!(format_clock(125), "02:05");
        assert_eq!(format_clock(1500), "25:00");
        assert_eq!(format_clock(0), "00:00");
    }
}
