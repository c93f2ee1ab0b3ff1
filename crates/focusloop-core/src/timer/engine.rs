//! Session state machine.
//!
//! Drives the pomodoro/break cycle. Time only moves when the clock delivers
//! a [`Tick`]; each tick carries the generation it was scheduled under and
//! ticks from any other generation are dropped.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//! Running -> Completed -> (Idle | Running)
//! ```
//!
//! `Completed` is only held while the completion prompt waits for the user
//! to start or skip the break that follows a pomodoro.
//!
//! ## Usage
//!
//! ```ignore
//! let (clock, mut ticks) = TokioClock::new();
//! let mut machine = SessionStateMachine::new(settings, clock, log);
//! machine.start();
//! while let Some(tick) = ticks.recv().await {
//!     if let Some(event) = machine.on_tick(tick) { /* ... */ }
//! }
//! ```

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::clock::{SessionClock, Tick, TICK_INTERVAL};
use super::completion::{CompletionPrompt, CompletionState, CounterEffect};
use super::session_type::{format_clock, SessionType, TimerSettings};
use crate::events::Event;
use crate::notify::{NotificationContext, NotificationKind, Notifier, Silent, SoundCues};
use crate::session::{Session, DEFAULT_TAG_ID};
use crate::stats::StatisticsAggregator;
use crate::storage::SessionLog;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    Completed,
}

pub struct SessionStateMachine {
    settings: TimerSettings,
    state: TimerState,
    session_type: SessionType,
    /// Pomodoros finished in the current cycle.
    completed_sessions: u32,
    selected_tag: String,
    /// Tag of the last finished pomodoro, restored after its break.
    last_selected_tag: String,
    time_remaining: u32,
    sounds_enabled: bool,
    prompt: CompletionPrompt,
    /// Generation of the ticker whose ticks are accepted.
    generation: u64,
    clock: Box<dyn SessionClock>,
    log: Arc<dyn SessionLog>,
    stats: Option<Arc<StatisticsAggregator>>,
    notifier: Arc<dyn Notifier>,
    cues: Arc<dyn SoundCues>,
    last_session: Option<Session>,
}

impl SessionStateMachine {
    /// Idle pomodoro with the full configured duration.
    pub fn new(
        settings: TimerSettings,
        clock: impl SessionClock + 'static,
        log: Arc<dyn SessionLog>,
    ) -> Self {
        Self {
            time_remaining: settings.duration(SessionType::Pomodoro),
            settings,
            state: TimerState::Idle,
            session_type: SessionType::Pomodoro,
            completed_sessions: 0,
            selected_tag: DEFAULT_TAG_ID.to_string(),
            last_selected_tag: DEFAULT_TAG_ID.to_string(),
            sounds_enabled: true,
            prompt: CompletionPrompt::new(),
            generation: 0,
            clock: Box::new(clock),
            log,
            stats: None,
            notifier: Arc::new(Silent),
            cues: Arc::new(Silent),
            last_session: None,
        }
    }

    pub fn with_statistics(mut self, stats: Arc<StatisticsAggregator>) -> Self {
        self.stats = Some(stats);
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_sound_cues(mut self, cues: Arc<dyn SoundCues>) -> Self {
        self.cues = cues;
        self
    }

    /// Initial tag, e.g. the one remembered from the previous run.
    pub fn with_selected_tag(mut self, tag: impl Into<String>) -> Self {
        self.selected_tag = tag.into();
        self.last_selected_tag = self.selected_tag.clone();
        self
    }

    pub fn with_sounds_enabled(mut self, enabled: bool) -> Self {
        self.sounds_enabled = enabled;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn session_type(&self) -> SessionType {
        self.session_type
    }

    pub fn completed_sessions(&self) -> u32 {
        self.completed_sessions
    }

    pub fn selected_tag(&self) -> &str {
        &self.selected_tag
    }

    pub fn last_selected_tag(&self) -> &str {
        &self.last_selected_tag
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    pub fn settings(&self) -> &TimerSettings {
        &self.settings
    }

    pub fn completion_state(&self) -> CompletionState {
        self.prompt.state()
    }

    pub fn sounds_enabled(&self) -> bool {
        self.sounds_enabled
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    /// Most recently finished session, breaks included.
    pub fn last_session(&self) -> Option<&Session> {
        self.last_session.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Label of the primary button.
    pub fn primary_action(&self) -> &'static str {
        if self.is_running() {
            "Pause"
        } else {
            "Start"
        }
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.state,
            session_type: self.session_type,
            label: self.session_type.display_name().to_string(),
            time_remaining: self.time_remaining,
            formatted_time: format_clock(self.time_remaining),
            completed_sessions: self.completed_sessions,
            long_break_interval: self.settings.long_break_interval,
            selected_tag: self.selected_tag.clone(),
            completion_state: self.prompt.state(),
            sounds_enabled: self.sounds_enabled,
            primary_action: self.primary_action().to_string(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        self.run(true)
    }

    /// Start or resume. `chime` plays the start cue; transitions out of a
    /// finished session only bring up the looping cues.
    fn run(&mut self, chime: bool) -> Option<Event> {
        if self.state == TimerState::Running {
            return None;
        }
        let resumed = self.state == TimerState::Paused;

        match self.prompt.state() {
            CompletionState::PomodoroComplete => {
                self.prompt.start_break(self.time_remaining);
            }
            CompletionState::BreakComplete => self.prompt.hide(),
            _ => {}
        }

        self.begin_running(chime);
        info!(
            session_type = %self.session_type,
            time_remaining = self.time_remaining,
            resumed,
            "timer running"
        );

        let (session_type, time_remaining, at) = (self.session_type, self.time_remaining, Utc::now());
        Some(if resumed {
            Event::TimerResumed {
                session_type,
                time_remaining,
                at,
            }
        } else {
            Event::TimerStarted {
                session_type,
                time_remaining,
                at,
            }
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        if self.state != TimerState::Running {
            return None;
        }
        self.cancel_ticker();
        self.state = TimerState::Paused;
        self.stop_cues();
        info!(time_remaining = self.time_remaining, "timer paused");
        Some(Event::TimerPaused {
            time_remaining: self.time_remaining,
            at: Utc::now(),
        })
    }

    pub fn toggle(&mut self) -> Option<Event> {
        if self.is_running() {
            self.pause()
        } else {
            self.start()
        }
    }

    /// Back to the full duration of the current session type.
    pub fn reset(&mut self) -> Option<Event> {
        let was_running = self.is_running();
        self.cancel_ticker();
        self.state = TimerState::Idle;
        self.time_remaining = self.settings.duration(self.session_type);
        self.prompt.hide();
        if was_running {
            self.stop_cues();
        }
        info!(session_type = %self.session_type, "timer reset");
        Some(Event::TimerReset {
            session_type: self.session_type,
            time_remaining: self.time_remaining,
            at: Utc::now(),
        })
    }

    /// Abandon the current session and return to an idle pomodoro. The cycle
    /// counter and the selected tag are kept.
    pub fn stop(&mut self) -> Option<Event> {
        self.abandon();
        info!(completed_sessions = self.completed_sessions, "timer stopped");
        Some(Event::TimerStopped {
            completed_sessions: self.completed_sessions,
            at: Utc::now(),
        })
    }

    /// Same as [`stop`](Self::stop), but only during a break. Nothing is
    /// recorded for the skipped break.
    pub fn skip_break(&mut self) -> Option<Event> {
        if !self.session_type.is_break() {
            return None;
        }
        let skipped = self.session_type;
        self.abandon();
        info!(%skipped, "break skipped");
        Some(Event::BreakSkipped {
            skipped,
            auto_started: false,
            at: Utc::now(),
        })
    }

    /// Advance one second using the current generation.
    pub fn tick(&mut self) -> Option<Event> {
        let generation = self.generation;
        self.on_tick(Tick { generation })
    }

    /// Handle a tick delivered by the clock. Returns an event when the
    /// session completes.
    pub fn on_tick(&mut self, tick: Tick) -> Option<Event> {
        if tick.generation != self.generation || self.state != TimerState::Running {
            debug!(
                tick = tick.generation,
                current = self.generation,
                "ignoring stale tick"
            );
            return None;
        }

        self.time_remaining = self.time_remaining.saturating_sub(1);
        self.prompt.update_time(self.time_remaining);
        if self.time_remaining == 0 {
            Some(self.complete())
        } else {
            None
        }
    }

    // ── Completion prompt actions ────────────────────────────────────

    /// Start the break offered after a pomodoro.
    pub fn start_break_from_completion(&mut self) -> Option<Event> {
        if self.prompt.state() != CompletionState::PomodoroComplete {
            return None;
        }
        self.run(false)
    }

    /// Abandon the offered or running break and start the next pomodoro.
    pub fn skip_break_from_completion(&mut self) -> Option<Event> {
        if !self.prompt.skip_break() {
            return None;
        }
        let skipped = self.session_type;
        self.cancel_ticker();
        if self.state == TimerState::Running {
            self.stop_cues();
        }
        self.session_type = SessionType::Pomodoro;
        self.time_remaining = self.settings.duration(SessionType::Pomodoro);
        self.selected_tag = self.last_selected_tag.clone();
        self.begin_running(true);
        info!(%skipped, "break skipped from completion prompt");
        Some(Event::BreakSkipped {
            skipped,
            auto_started: true,
            at: Utc::now(),
        })
    }

    /// Accept the next pomodoro after a break. It is left idle.
    pub fn start_next_pomodoro_from_completion(&mut self) -> Option<Event> {
        if !self.prompt.start_next_pomodoro() {
            return None;
        }
        self.cancel_ticker();
        self.state = TimerState::Idle;
        self.session_type = SessionType::Pomodoro;
        self.time_remaining = self.settings.duration(SessionType::Pomodoro);
        Some(Event::NextPomodoroReady {
            selected_tag: self.selected_tag.clone(),
            time_remaining: self.time_remaining,
            at: Utc::now(),
        })
    }

    /// Close the prompt without advancing.
    pub fn dismiss_completion_view(&mut self) -> Option<Event> {
        if !self.prompt.dismiss() {
            return None;
        }
        if self.state == TimerState::Completed {
            self.state = TimerState::Idle;
        }
        Some(Event::CompletionDismissed { at: Utc::now() })
    }

    // ── Preferences ──────────────────────────────────────────────────

    /// Tag for the next pomodoro. Unknown ids are accepted.
    pub fn select_tag(&mut self, tag: &str) -> Option<Event> {
        let tag = tag.trim();
        if tag.is_empty() {
            return None;
        }
        self.selected_tag = tag.to_string();
        debug!(tag, "tag selected");
        Some(Event::TagSelected {
            tag: self.selected_tag.clone(),
            at: Utc::now(),
        })
    }

    /// Swap the settings snapshot. An idle timer picks up the new duration.
    pub fn apply_settings(&mut self, settings: TimerSettings) -> Option<Event> {
        self.settings = settings;
        if self.state == TimerState::Idle {
            self.time_remaining = self.settings.duration(self.session_type);
        }
        Some(Event::SettingsApplied {
            time_remaining: self.time_remaining,
            at: Utc::now(),
        })
    }

    pub fn set_sounds_enabled(&mut self, enabled: bool) -> Option<Event> {
        if self.sounds_enabled == enabled {
            return None;
        }
        self.sounds_enabled = enabled;
        if self.is_running() {
            self.cues.set_looping(enabled, self.session_type);
        }
        Some(Event::SoundsToggled {
            enabled,
            at: Utc::now(),
        })
    }

    pub fn toggle_sounds(&mut self) -> Option<Event> {
        self.set_sounds_enabled(!self.sounds_enabled)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn schedule_ticker(&mut self) {
        self.clock.cancel();
        self.generation += 1;
        self.clock.schedule(self.generation, TICK_INTERVAL);
    }

    /// Cancel the ticker and invalidate any tick already in flight.
    fn cancel_ticker(&mut self) {
        self.clock.cancel();
        self.generation += 1;
    }

    fn begin_running(&mut self, chime: bool) {
        self.state = TimerState::Running;
        self.schedule_ticker();
        if chime {
            self.cues.on_session_start(self.session_type);
        }
        if self.sounds_enabled {
            self.cues.set_looping(true, self.session_type);
        }
    }

    fn stop_cues(&self) {
        self.cues.set_looping(false, self.session_type);
        self.cues.on_session_stop();
    }

    fn abandon(&mut self) {
        let was_running = self.is_running();
        self.cancel_ticker();
        if was_running {
            self.stop_cues();
        }
        self.state = TimerState::Idle;
        self.session_type = SessionType::Pomodoro;
        self.time_remaining = self.settings.duration(SessionType::Pomodoro);
        self.prompt.hide();
    }

    fn complete(&mut self) -> Event {
        self.cancel_ticker();
        self.state = TimerState::Completed;
        let finished = self.session_type;

        let session = Session::new(
            finished,
            self.completed_sessions + 1,
            self.selected_tag.clone(),
            self.settings.duration(finished),
            Utc::now(),
        );

        let mut persisted = false;
        let mut persist_error = None;
        if session.is_pomodoro() {
            match self.log.append(&session) {
                Ok(()) => {
                    persisted = true;
                    if let Some(stats) = &self.stats {
                        stats.refresh();
                    }
                }
                Err(e) => {
                    warn!(error = %e, "failed to record session");
                    persist_error = Some(e.to_string());
                }
            }
            self.completed_sessions += 1;
            self.last_selected_tag = self.selected_tag.clone();
        }

        self.cues.set_looping(false, finished);
        self.cues.on_session_complete(finished);
        let kind = if finished.is_break() {
            NotificationKind::BreakComplete
        } else {
            NotificationKind::PomodoroComplete
        };
        self.notifier.notify(
            kind,
            NotificationContext {
                sessions_completed: self.completed_sessions,
                sessions_in_set: self.settings.long_break_interval,
            },
        );

        let decision =
            self.prompt
                .on_session_finished(finished, self.completed_sessions, &self.settings);
        let transition = decision.transition;
        if transition.counter == CounterEffect::Reset {
            self.completed_sessions = 0;
        }
        if transition.restore_tag {
            self.selected_tag = self.last_selected_tag.clone();
        }
        self.session_type = transition.next;
        self.time_remaining = self.settings.duration(transition.next);

        if decision.auto_start {
            self.begin_running(false);
        } else if self.prompt.state() == CompletionState::PomodoroComplete {
            self.state = TimerState::Completed;
        } else {
            self.state = TimerState::Idle;
        }

        info!(
            %finished,
            next = %self.session_type,
            completed_sessions = self.completed_sessions,
            auto_started = decision.auto_start,
            "session completed"
        );

        self.last_session = Some(session.clone());
        Event::SessionCompleted {
            session,
            persisted,
            persist_error,
            completed_sessions: self.completed_sessions,
            next_session_type: self.session_type,
            auto_started: decision.auto_start,
            completion_state: self.prompt.state(),
            at: Utc::now(),
        }
    }
}
