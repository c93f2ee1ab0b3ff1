//! Outbound side effects of the session state machine.
//!
//! The state machine only talks to [`Notifier`] and [`SoundCues`]. Delivery
//! (OS notifications, audio playback) lives behind these traits; the sinks
//! in this module log through `tracing` so the core runs headless.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::storage::SoundSettings;
use crate::timer::SessionType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationKind {
    PomodoroComplete,
    BreakComplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationContext {
    /// Pomodoros completed in the current cycle.
    pub sessions_completed: u32,
    /// Pomodoros per cycle.
    pub sessions_in_set: u32,
}

impl NotificationKind {
    pub fn title(&self) -> &'static str {
        match self {
            NotificationKind::PomodoroComplete => "Pomodoro Complete!",
            NotificationKind::BreakComplete => "Break Complete!",
        }
    }

    pub fn body(&self, context: &NotificationContext) -> String {
        match self {
            NotificationKind::PomodoroComplete => format!(
                "Time for a break. ({} of {} complete)",
                context.sessions_completed, context.sessions_in_set
            ),
            NotificationKind::BreakComplete => "Ready to start another Pomodoro?".to_string(),
        }
    }
}

/// Fire-and-forget notification delivery. Must not block.
pub trait Notifier: Send + Sync {
    fn notify(&self, kind: NotificationKind, context: NotificationContext);
}

/// Audio cue hooks. Must not block.
pub trait SoundCues: Send + Sync {
    fn on_session_start(&self, session_type: SessionType);
    fn on_session_stop(&self);
    fn on_session_complete(&self, session_type: SessionType);
    /// Start or stop the looping tick/ambient sounds for `session_type`.
    fn set_looping(&self, enabled: bool, session_type: SessionType);
}

/// Drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl Notifier for Silent {
    fn notify(&self, _kind: NotificationKind, _context: NotificationContext) {}
}

impl SoundCues for Silent {
    fn on_session_start(&self, _session_type: SessionType) {}
    fn on_session_stop(&self) {}
    fn on_session_complete(&self, _session_type: SessionType) {}
    fn set_looping(&self, _enabled: bool, _session_type: SessionType) {}
}

/// Logs notifications at info level.
#[derive(Debug, Clone, Copy)]
pub struct TracingNotifier {
    enabled: bool,
}

impl TracingNotifier {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl Notifier for TracingNotifier {
    fn notify(&self, kind: NotificationKind, context: NotificationContext) {
        if !self.enabled {
            return;
        }
        info!(
            target: "focusloop::notify",
            title = kind.title(),
            body = %kind.body(&context),
            "notification"
        );
    }
}

/// Logs which sounds would play under the configured sound choices.
#[derive(Debug, Clone)]
pub struct TracingSoundCues {
    settings: SoundSettings,
}

impl TracingSoundCues {
    pub fn new(settings: SoundSettings) -> Self {
        Self { settings }
    }

    /// Looping sounds that apply to `session_type`.
    pub fn looping_sounds(&self, session_type: SessionType) -> Vec<&str> {
        let mut sounds = Vec::new();
        if !self.settings.tick_sound.eq_ignore_ascii_case("none") {
            sounds.push(self.settings.tick_sound.as_str());
        }
        // Ambient sound only accompanies focus time.
        if session_type == SessionType::Pomodoro
            && !self.settings.ambient_sound.eq_ignore_ascii_case("none")
        {
            sounds.push(self.settings.ambient_sound.as_str());
        }
        sounds
    }
}

impl SoundCues for TracingSoundCues {
    fn on_session_start(&self, session_type: SessionType) {
        debug!(target: "focusloop::sound", %session_type, "session start cue");
    }

    fn on_session_stop(&self) {
        debug!(target: "focusloop::sound", "session stop cue");
    }

    fn on_session_complete(&self, session_type: SessionType) {
        debug!(
            target: "focusloop::sound",
            %session_type,
            sound = %self.settings.completion_sound,
            "completion cue"
        );
    }

    fn set_looping(&self, enabled: bool, session_type: SessionType) {
        debug!(
            target: "focusloop::sound",
            enabled,
            sounds = ?self.looping_sounds(session_type),
            "looping cues"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_copy() {
        let ctx = NotificationContext {
            sessions_completed: 2,
            sessions_in_set: 4,
        };
        assert_eq!(NotificationKind::PomodoroComplete.title(), "Pomodoro Complete!");
        assert_eq!(
            NotificationKind::PomodoroComplete.body(&ctx),
            "Time for a break. (2 of 4 complete)"
        );
        assert_eq!(
            NotificationKind::BreakComplete.body(&ctx),
            "Ready to start another Pomodoro?"
        );
    }

    #[test]
    fn ambient_only_during_pomodoro() {
        let cues = TracingSoundCues::new(SoundSettings {
            tick_sound: "Clock".into(),
            ambient_sound: "Rain".into(),
            ..SoundSettings::default()
        });
        assert_eq!(cues.looping_sounds(SessionType::Pomodoro), vec!["Clock", "Rain"]);
        assert_eq!(cues.looping_sounds(SessionType::ShortBreak), vec!["Clock"]);

        let quiet = TracingSoundCues::new(SoundSettings::default());
        assert!(quiet.looping_sounds(SessionType::Pomodoro).is_empty());
    }
}
