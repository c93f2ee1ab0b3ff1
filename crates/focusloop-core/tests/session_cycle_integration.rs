//! Integration tests for the full pomodoro cycle.
//!
//! Drive the state machine with a manual clock through complete cycles and
//! check the resulting log and statistics.

use std::sync::Arc;

use focusloop_core::timer::{ManualClock, SessionDurations};
use focusloop_core::{
    CompletionState, Event, MemorySessionLog, SessionLog, SessionStateMachine, SessionType,
    StatisticsAggregator, TimerSettings, TimerState,
};

fn default_settings(auto_start_break: bool, show_completion_view: bool) -> TimerSettings {
    TimerSettings {
        durations: SessionDurations {
            pomodoro_secs: 1500,
            short_break_secs: 300,
            long_break_secs: 900,
        },
        long_break_interval: 4,
        auto_start_break,
        show_completion_view,
    }
}

fn finish(machine: &mut SessionStateMachine) -> Event {
    if !machine.is_running() {
        machine.start();
    }
    for _ in 0..10_000 {
        if let Some(event) = machine.tick() {
            return event;
        }
    }
    panic!("session never completed");
}

/// Run four pomodoros (with their short breaks) and return the state after
/// the fourth.
fn four_pomodoros(machine: &mut SessionStateMachine) {
    for i in 0..4 {
        finish(machine);
        if i < 3 {
            assert_eq!(machine.session_type(), SessionType::ShortBreak);
            if machine.completion_state() == CompletionState::PomodoroComplete {
                machine.start_break_from_completion();
            }
            finish(machine);
            if machine.completion_state() == CompletionState::BreakComplete {
                machine.start_next_pomodoro_from_completion();
            }
            assert_eq!(machine.session_type(), SessionType::Pomodoro);
        }
    }
}

#[test]
fn test_full_cycle_every_prompt_mode() {
    for auto in [false, true] {
        for show in [false, true] {
            let log = Arc::new(MemorySessionLog::new());
            let mut machine =
                SessionStateMachine::new(default_settings(auto, show), ManualClock::new(), log.clone());

            four_pomodoros(&mut machine);
            assert_eq!(machine.session_type(), SessionType::LongBreak, "auto={auto} show={show}");
            assert_eq!(machine.completed_sessions(), 4);
            assert_eq!(machine.time_remaining(), 900);
            if auto {
                assert_eq!(machine.state(), TimerState::Running);
            } else if show {
                assert_eq!(machine.state(), TimerState::Completed);
            } else {
                assert_eq!(machine.state(), TimerState::Idle);
            }

            if machine.completion_state() == CompletionState::PomodoroComplete {
                machine.start_break_from_completion();
            }
            finish(&mut machine);
            assert_eq!(machine.session_type(), SessionType::Pomodoro);
            assert_eq!(machine.completed_sessions(), 0);
            assert_eq!(machine.state(), TimerState::Idle);
            assert_eq!(machine.time_remaining(), 1500);

            let sessions = log.load_all().unwrap();
            assert_eq!(sessions.len(), 4, "only pomodoros are logged");
            let numbers: Vec<u32> = sessions.iter().map(|s| s.session_number).collect();
            assert_eq!(numbers, vec![1, 2, 3, 4]);
        }
    }
}

#[test]
fn test_stop_mid_cycle_keeps_progress() {
    let log = Arc::new(MemorySessionLog::new());
    let mut machine =
        SessionStateMachine::new(default_settings(false, false), ManualClock::new(), log.clone());
    machine.select_tag("work");
    finish(&mut machine);
    finish(&mut machine);

    machine.start();
    for _ in 0..100 {
        machine.tick();
    }
    machine.stop();

    assert_eq!(machine.state(), TimerState::Idle);
    assert_eq!(machine.session_type(), SessionType::Pomodoro);
    assert_eq!(machine.time_remaining(), 1500);
    assert_eq!(machine.completed_sessions(), 1);
    assert_eq!(machine.selected_tag(), "work");
    assert_eq!(log.len(), 1, "abandoned pomodoro is not recorded");
}

#[test]
fn test_statistics_follow_completions() {
    let log: Arc<dyn SessionLog> = Arc::new(MemorySessionLog::new());
    let stats = Arc::new(StatisticsAggregator::new(Arc::clone(&log)));
    let mut machine = SessionStateMachine::new(default_settings(true, false), ManualClock::new(), log)
        .with_statistics(Arc::clone(&stats));

    finish(&mut machine);
    finish(&mut machine); // short break, not counted
    finish(&mut machine);

    assert_eq!(stats.today_session_count(), 2);
    assert_eq!(stats.today_focus_minutes(), 50);
    assert_eq!(stats.current_streak(), 1);
    assert_eq!(stats.week_session_counts(0).iter().sum::<u32>(), 2);
}

#[test]
fn test_completion_events_serialize_for_front_ends() {
    let mut machine = SessionStateMachine::new(
        default_settings(false, true),
        ManualClock::new(),
        Arc::new(MemorySessionLog::new()),
    );
    let event = finish(&mut machine);
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["type"], "SessionCompleted");
    assert_eq!(json["completion_state"]["state"], "pomodoroComplete");
    assert_eq!(json["session"]["sessionType"], "pomodoro");
    assert_eq!(json["session"]["duration"], 1500);

    let snapshot = serde_json::to_value(machine.snapshot()).unwrap();
    assert_eq!(snapshot["state"], "completed");
    assert_eq!(snapshot["label"], "Short Break");
    assert_eq!(snapshot["formatted_time"], "05:00");
}
