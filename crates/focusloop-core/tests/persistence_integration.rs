//! Integration tests for the file-backed session logs.
//!
//! Sessions written by the state machine must survive a reopen and feed the
//! statistics of a fresh aggregator, for both backends.

use std::sync::Arc;

use focusloop_core::timer::{ManualClock, SessionDurations};
use focusloop_core::{
    JsonSessionLog, SessionLog, SessionStateMachine, SqliteSessionLog, StatisticsAggregator,
    TimerSettings,
};

fn quick_settings() -> TimerSettings {
    TimerSettings {
        durations: SessionDurations {
            pomodoro_secs: 120,
            short_break_secs: 2,
            long_break_secs: 3,
        },
        long_break_interval: 4,
        auto_start_break: false,
        show_completion_view: false,
    }
}

fn complete_pomodoros(log: Arc<dyn SessionLog>, count: usize) {
    let mut machine = SessionStateMachine::new(quick_settings(), ManualClock::new(), log);
    machine.select_tag("research");
    for _ in 0..count {
        // pomodoro, then its break
        for _ in 0..2 {
            machine.start();
            while machine.tick().is_none() {}
        }
    }
}

#[test]
fn test_sqlite_log_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("focusloop.db");

    complete_pomodoros(Arc::new(SqliteSessionLog::open(&path).unwrap()), 3);

    let reopened: Arc<dyn SessionLog> = Arc::new(SqliteSessionLog::open(&path).unwrap());
    let sessions = reopened.load_all().unwrap();
    assert_eq!(sessions.len(), 3);
    assert!(sessions.iter().all(|s| s.selected_tag == "research"));
    assert!(sessions.iter().all(|s| s.duration == 120));

    let stats = StatisticsAggregator::new(reopened);
    assert_eq!(stats.today_session_count(), 3);
    assert_eq!(stats.today_focus_minutes(), 6);
}

#[test]
fn test_json_log_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sessions.json");

    complete_pomodoros(Arc::new(JsonSessionLog::new(&path)), 2);

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let records = raw.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["sessionType"], "pomodoro");
    assert_eq!(records[1]["sessionNumber"], 2);
    assert_eq!(records[0]["isCompleted"], true);

    let stats = StatisticsAggregator::new(Arc::new(JsonSessionLog::new(&path)));
    assert_eq!(stats.today_session_count(), 2);
}

#[test]
fn test_legacy_json_records_load_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sessions.json");
    std::fs::write(
        &path,
        r#"[
            {"sessionType": "pomodoro", "completionTime": "2024-03-01T09:00:00Z", "sessionNumber": 1, "selectedTag": "work"},
            {"sessionType": "longBreak", "completionTime": "2024-03-01T10:00:00Z"}
        ]"#,
    )
    .unwrap();

    let sessions = JsonSessionLog::new(&path).load_all().unwrap();
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].duration, 1500);
    assert!(sessions[0].is_completed);
    assert_eq!(sessions[1].duration, 900);
    assert_eq!(sessions[1].session_number, 0);
    assert_eq!(sessions[1].selected_tag, "study");
}
