//! Composition root.
//!
//! [`FocusLoop`] wires the session log, the statistics aggregator, the tokio
//! ticker and the tracing sinks into one state machine, and translates text
//! commands into state machine operations.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::error::{CoreError, ValidationError};
use crate::events::Event;
use crate::notify::{TracingNotifier, TracingSoundCues};
use crate::stats::StatisticsAggregator;
use crate::storage::{open_session_log, Config, MemorySessionLog, SessionLog};
use crate::timer::{SessionStateMachine, Tick, TokioClock};

/// A user command understood by [`FocusLoop::dispatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerCommand {
    Start,
    Pause,
    Toggle,
    Reset,
    Stop,
    Skip,
    StartBreak,
    SkipBreak,
    Next,
    Dismiss,
    Tag(String),
    Sounds,
    Status,
}

impl FromStr for TimerCommand {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let command = match name {
            "start" => TimerCommand::Start,
            "pause" => TimerCommand::Pause,
            "toggle" => TimerCommand::Toggle,
            "reset" => TimerCommand::Reset,
            "stop" => TimerCommand::Stop,
            "skip" => TimerCommand::Skip,
            "start-break" => TimerCommand::StartBreak,
            "skip-break" => TimerCommand::SkipBreak,
            "next" => TimerCommand::Next,
            "dismiss" => TimerCommand::Dismiss,
            "sounds" => TimerCommand::Sounds,
            "status" => TimerCommand::Status,
            "tag" => {
                let id = parts.next().ok_or_else(|| ValidationError::InvalidValue {
                    field: "tag".into(),
                    message: "missing tag id".into(),
                })?;
                TimerCommand::Tag(id.to_string())
            }
            other => return Err(ValidationError::UnknownCommand(other.to_string())),
        };
        Ok(command)
    }
}

impl fmt::Display for TimerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerCommand::Start => f.write_str("start"),
            TimerCommand::Pause => f.write_str("pause"),
            TimerCommand::Toggle => f.write_str("toggle"),
            TimerCommand::Reset => f.write_str("reset"),
            TimerCommand::Stop => f.write_str("stop"),
            TimerCommand::Skip => f.write_str("skip"),
            TimerCommand::StartBreak => f.write_str("start-break"),
            TimerCommand::SkipBreak => f.write_str("skip-break"),
            TimerCommand::Next => f.write_str("next"),
            TimerCommand::Dismiss => f.write_str("dismiss"),
            TimerCommand::Tag(id) => write!(f, "tag {id}"),
            TimerCommand::Sounds => f.write_str("sounds"),
            TimerCommand::Status => f.write_str("status"),
        }
    }
}

pub struct FocusLoop {
    machine: SessionStateMachine,
    stats: Arc<StatisticsAggregator>,
    ticks: mpsc::UnboundedReceiver<Tick>,
}

impl FocusLoop {
    /// Build everything from the configuration. A session log that cannot be
    /// opened is replaced by an in-memory one so the timer still runs.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn from_config(config: &Config) -> Result<Self, CoreError> {
        config.validate()?;
        let log: Arc<dyn SessionLog> = match open_session_log(config) {
            Ok(log) => log,
            Err(e) => {
                warn!(error = %e, "session log unavailable; sessions will not be saved");
                Arc::new(MemorySessionLog::new())
            }
        };
        Ok(Self::with_log(config, log))
    }

    /// Build around an explicit session log.
    pub fn with_log(config: &Config, log: Arc<dyn SessionLog>) -> Self {
        let stats = Arc::new(StatisticsAggregator::new(Arc::clone(&log)));
        let (clock, ticks) = TokioClock::new();
        let machine = SessionStateMachine::new(config.timer_settings(), clock, log)
            .with_statistics(Arc::clone(&stats))
            .with_notifier(Arc::new(TracingNotifier::new(config.notifications.enabled)))
            .with_sound_cues(Arc::new(TracingSoundCues::new(config.sound.clone())))
            .with_sounds_enabled(config.sound.sound_button_enabled)
            .with_selected_tag(config.session.last_selected_tag.clone());
        info!(backend = ?config.storage.backend, "focus loop ready");
        Self::new(machine, stats, ticks)
    }

    pub fn new(
        machine: SessionStateMachine,
        stats: Arc<StatisticsAggregator>,
        ticks: mpsc::UnboundedReceiver<Tick>,
    ) -> Self {
        Self {
            machine,
            stats,
            ticks,
        }
    }

    pub fn machine(&self) -> &SessionStateMachine {
        &self.machine
    }

    pub fn machine_mut(&mut self) -> &mut SessionStateMachine {
        &mut self.machine
    }

    pub fn stats(&self) -> &Arc<StatisticsAggregator> {
        &self.stats
    }

    /// Wait for the next tick from the clock. Returns `None` once the clock
    /// has been dropped.
    pub async fn next_tick(&mut self) -> Option<Tick> {
        self.ticks.recv().await
    }

    pub fn handle_tick(&mut self, tick: Tick) -> Option<Event> {
        self.machine.on_tick(tick)
    }

    pub fn dispatch(&mut self, command: TimerCommand) -> Option<Event> {
        let m = &mut self.machine;
        match command {
            TimerCommand::Start => m.start(),
            TimerCommand::Pause => m.pause(),
            TimerCommand::Toggle => m.toggle(),
            TimerCommand::Reset => m.reset(),
            TimerCommand::Stop => m.stop(),
            TimerCommand::Skip => m.skip_break(),
            TimerCommand::StartBreak => m.start_break_from_completion(),
            TimerCommand::SkipBreak => m.skip_break_from_completion(),
            TimerCommand::Next => m.start_next_pomodoro_from_completion(),
            TimerCommand::Dismiss => m.dismiss_completion_view(),
            TimerCommand::Tag(id) => m.select_tag(&id),
            TimerCommand::Sounds => m.toggle_sounds(),
            TimerCommand::Status => Some(m.snapshot()),
        }
    }
}
