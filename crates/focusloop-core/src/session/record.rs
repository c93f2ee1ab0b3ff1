use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{SessionDurations, SessionType};

use super::tag::DEFAULT_TAG_ID;

/// A finished session. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredSession")]
pub struct Session {
    pub session_type: SessionType,
    pub completion_time: DateTime<Utc>,
    /// Position within the cycle (1-based); always 0 for breaks.
    pub session_number: u32,
    /// Tag id, resolved against the catalog at display time.
    pub selected_tag: String,
    /// Seconds actually spent, independent of later settings changes.
    pub duration: u32,
    /// False when the session was stopped before the countdown ran out.
    pub is_completed: bool,
}

impl Session {
    pub fn new(
        session_type: SessionType,
        session_number: u32,
        selected_tag: impl Into<String>,
        duration: u32,
        completion_time: DateTime<Utc>,
    ) -> Self {
        Self {
            session_type,
            completion_time,
            session_number: if session_type.is_break() {
                0
            } else {
                session_number
            },
            selected_tag: selected_tag.into(),
            duration,
            is_completed: true,
        }
    }

    pub fn stopped_early(mut self) -> Self {
        self.is_completed = false;
        self
    }

    pub fn is_pomodoro(&self) -> bool {
        self.session_type == SessionType::Pomodoro
    }

    /// Calendar day of completion in the process-local timezone.
    pub fn local_date(&self) -> NaiveDate {
        self.completion_time.with_timezone(&Local).date_naive()
    }
}

/// On-disk shape. Fields added after the first release are optional so older
/// logs keep loading.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSession {
    session_type: SessionType,
    completion_time: DateTime<Utc>,
    #[serde(default)]
    session_number: u32,
    #[serde(default = "default_tag")]
    selected_tag: String,
    #[serde(default)]
    duration: Option<u32>,
    #[serde(default)]
    is_completed: Option<bool>,
}

fn default_tag() -> String {
    DEFAULT_TAG_ID.to_string()
}

impl From<StoredSession> for Session {
    fn from(stored: StoredSession) -> Self {
        let duration = stored
            .duration
            .unwrap_or_else(|| SessionDurations::default().duration(stored.session_type));
        Self {
            session_type: stored.session_type,
            completion_time: stored.completion_time,
            session_number: if stored.session_type.is_break() {
                0
            } else {
                stored.session_number
            },
            selected_tag: stored.selected_tag,
            duration,
            is_completed: stored.is_completed.unwrap_or(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breaks_have_no_session_number() {
        let s = Session::new(SessionType::ShortBreak, 3, "work", 300, Utc::now());
        assert_eq!(s.session_number, 0);
        let s = Session::new(SessionType::Pomodoro, 3, "work", 1500, Utc::now());
        assert_eq!(s.session_number, 3);
        assert!(s.is_completed);
    }

    #[test]
    fn serializes_camel_case_keys() {
        let s = Session::new(SessionType::Pomodoro, 1, "study", 1500, Utc::now());
        let json = serde_json::to_value(&s).unwrap();
        for key in [
            "sessionType",
            "completionTime",
            "sessionNumber",
            "selectedTag",
            "duration",
            "isCompleted",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        let back: Session = serde_json::from_value(json).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn legacy_record_gets_defaults() {
        let json = r#"{
            "sessionType": "longBreak",
            "completionTime": "2025-01-06T10:00:00Z",
            "sessionNumber": 0,
            "selectedTag": "research"
        }"#;
        let s: Session = serde_json::from_str(json).unwrap();
        assert_eq!(s.duration, 900);
        assert!(s.is_completed);
        assert_eq!(s.selected_tag, "research");
    }

    #[test]
    fn explicit_fields_win_over_defaults() {
        let json = r#"{
            "sessionType": "pomodoro",
            "completionTime": "2025-01-06T10:00:00Z",
            "sessionNumber": 2,
            "selectedTag": "work",
            "duration": 600,
            "isCompleted": false
        }"#;
        let s: Session = serde_json::from_str(json).unwrap();
        assert_eq!(s.duration, 600);
        assert!(!s.is_completed);
    }

    #[test]
    fn unknown_type_is_rejected() {
        let json = r#"{"sessionType": "nap", "completionTime": "2025-01-06T10:00:00Z"}"#;
        assert!(serde_json::from_str::<Session>(json).is_err());
    }
}
