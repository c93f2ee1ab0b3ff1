use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::Session;
use crate::timer::{CompletionState, SessionType, TimerState};

/// Every state change in the session state machine produces an Event.
/// Front ends render them; the CLI prints them as JSON lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        session_type: SessionType,
        time_remaining: u32,
        at: DateTime<Utc>,
    },
    TimerResumed {
        session_type: SessionType,
        time_remaining: u32,
        at: DateTime<Utc>,
    },
    TimerPaused {
        time_remaining: u32,
        at: DateTime<Utc>,
    },
    TimerReset {
        session_type: SessionType,
        time_remaining: u32,
        at: DateTime<Utc>,
    },
    /// Countdown abandoned; back to an idle pomodoro.
    TimerStopped {
        completed_sessions: u32,
        at: DateTime<Utc>,
    },
    BreakSkipped {
        skipped: SessionType,
        /// Whether the following pomodoro is already running.
        auto_started: bool,
        at: DateTime<Utc>,
    },
    /// A countdown reached zero.
    SessionCompleted {
        session: Session,
        /// The record reached the session log.
        persisted: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        persist_error: Option<String>,
        completed_sessions: u32,
        next_session_type: SessionType,
        auto_started: bool,
        completion_state: CompletionState,
        at: DateTime<Utc>,
    },
    CompletionDismissed {
        at: DateTime<Utc>,
    },
    /// The prompt handed over to an idle pomodoro.
    NextPomodoroReady {
        selected_tag: String,
        time_remaining: u32,
        at: DateTime<Utc>,
    },
    TagSelected {
        tag: String,
        at: DateTime<Utc>,
    },
    SettingsApplied {
        time_remaining: u32,
        at: DateTime<Utc>,
    },
    SoundsToggled {
        enabled: bool,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: TimerState,
        session_type: SessionType,
        label: String,
        time_remaining: u32,
        formatted_time: String,
        completed_sessions: u32,
        long_break_interval: u32,
        selected_tag: String,
        completion_state: CompletionState,
        sounds_enabled: bool,
        primary_action: String,
        at: DateTime<Utc>,
    },
}
