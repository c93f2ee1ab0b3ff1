//! Post-completion prompt.
//!
//! Decides, once a session has run out, which session comes next and whether
//! it starts by itself or waits for the user. The prompt keeps its own
//! [`CompletionState`] which is independent of the timer state.
//!
//! ```text
//! Hidden -> PomodoroComplete -> BreakRunning -> Hidden
//! Hidden -> BreakRunning -> BreakComplete -> Hidden
//! Hidden -> BreakComplete -> Hidden
//! ```

use serde::{Deserialize, Serialize};

use super::session_type::{SessionType, TimerSettings};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum CompletionState {
    #[default]
    Hidden,
    /// A pomodoro finished; offering to start or skip the break.
    PomodoroComplete,
    /// A break finished; offering the next pomodoro.
    BreakComplete,
    /// The break countdown is shown inside the prompt.
    #[serde(rename_all = "camelCase")]
    BreakRunning { time_remaining: u32 },
}

/// Effect of a finished session on the cycle counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterEffect {
    Unchanged,
    Reset,
}

/// One row of the cycle table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: SessionType,
    pub counter: CounterEffect,
    /// Whether the tag used for the last pomodoro becomes the selection again.
    pub restore_tag: bool,
}

/// The cycle table: which session follows `current`.
///
/// `completed_sessions` is the counter *after* the finished pomodoro has been
/// counted. A long break is due once the counter has reached the interval.
pub fn next_transition(
    current: SessionType,
    completed_sessions: u32,
    long_break_interval: u32,
) -> Transition {
    match current {
        SessionType::Pomodoro => Transition {
            next: if completed_sessions >= long_break_interval {
                SessionType::LongBreak
            } else {
                SessionType::ShortBreak
            },
            counter: CounterEffect::Unchanged,
            restore_tag: false,
        },
        SessionType::ShortBreak => Transition {
            next: SessionType::Pomodoro,
            counter: CounterEffect::Unchanged,
            restore_tag: true,
        },
        SessionType::LongBreak => Transition {
            next: SessionType::Pomodoro,
            counter: CounterEffect::Reset,
            restore_tag: true,
        },
    }
}

/// What the state machine should do after a session finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub transition: Transition,
    /// Run the next session immediately instead of leaving it idle.
    pub auto_start: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompletionPrompt {
    state: CompletionState,
}

impl CompletionPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CompletionState {
        self.state
    }

    pub fn is_visible(&self) -> bool {
        self.state != CompletionState::Hidden
    }

    /// Decide how to proceed after `finished` ran out.
    ///
    /// Pomodoros following a break never start on their own. When the
    /// prompt is disabled the cycle advances silently and `auto_start_break`
    /// only affects breaks.
    pub fn on_session_finished(
        &mut self,
        finished: SessionType,
        completed_sessions: u32,
        settings: &TimerSettings,
    ) -> Decision {
        let transition =
            next_transition(finished, completed_sessions, settings.long_break_interval);
        let auto_start = transition.next.is_break() && settings.auto_start_break;

        self.state = match (settings.show_completion_view, finished) {
            (false, _) => CompletionState::Hidden,
            (true, SessionType::Pomodoro) if auto_start => CompletionState::BreakRunning {
                time_remaining: settings.duration(transition.next),
            },
            (true, SessionType::Pomodoro) => CompletionState::PomodoroComplete,
            (true, _) => CompletionState::BreakComplete,
        };

        Decision {
            transition,
            auto_start,
        }
    }

    /// User chose to start the offered break. Returns false when no break
    /// is on offer.
    pub fn start_break(&mut self, time_remaining: u32) -> bool {
        if self.state != CompletionState::PomodoroComplete {
            return false;
        }
        self.state = CompletionState::BreakRunning { time_remaining };
        true
    }

    /// User chose to skip the break, either before it started or while it
    /// runs in the prompt.
    pub fn skip_break(&mut self) -> bool {
        match self.state {
            CompletionState::PomodoroComplete | CompletionState::BreakRunning { .. } => {
                self.state = CompletionState::Hidden;
                true
            }
            _ => false,
        }
    }

    /// User accepted the next pomodoro after a break.
    pub fn start_next_pomodoro(&mut self) -> bool {
        if self.state != CompletionState::BreakComplete {
            return false;
        }
        self.state = CompletionState::Hidden;
        true
    }

    /// Close the prompt without advancing anything.
    pub fn dismiss(&mut self) -> bool {
        if self.state == CompletionState::Hidden {
            return false;
        }
        self.state = CompletionState::Hidden;
        true
    }

    /// Keep the break countdown in the prompt live.
    pub fn update_time(&mut self, time_remaining: u32) {
        if let CompletionState::BreakRunning { .. } = self.state {
            self.state = CompletionState::BreakRunning { time_remaining };
        }
    }

    pub fn hide(&mut self) {
        self.state = CompletionState::Hidden;
    }
}
