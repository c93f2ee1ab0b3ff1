//! # Focusloop Core Library
//!
//! This library provides the business logic for the focusloop Pomodoro timer,
//! independent of any UI toolkit. The `focusloop-cli` binary is a thin layer
//! over the same library.
//!
//! ## Architecture
//!
//! - **Session state machine**: drives the pomodoro/break cycle from
//!   generation-tagged ticks and decides each transition together with the
//!   completion prompt
//! - **Storage**: append-only session log (SQLite or JSON file) and TOML
//!   configuration
//! - **Statistics**: daily, weekly and monthly pomodoro counts and streaks
//!   over the session log, in the local calendar
//! - **Notify**: notification and sound cue hooks with `tracing` sinks
//!
//! ## Key Components
//!
//! - [`SessionStateMachine`]: core timer state machine
//! - [`StatisticsAggregator`]: cached read-side summaries
//! - [`SessionLog`]: trait for session persistence
//! - [`Config`]: application configuration management
//! - [`FocusLoop`]: composition root and command dispatch

pub mod error;
pub mod events;
pub mod notify;
pub mod runtime;
pub mod session;
pub mod stats;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use events::Event;
pub use notify::{NotificationContext, NotificationKind, Notifier, SoundCues};
pub use runtime::{FocusLoop, TimerCommand};
pub use session::{resolve_tag, Session, SessionTag, TagDisplay, PREDEFINED_TAGS};
pub use stats::{DateRange, StatisticsAggregator, StatsSummary};
pub use storage::{Config, JsonSessionLog, MemorySessionLog, SessionLog, SqliteSessionLog};
pub use timer::{
    CompletionState, SessionClock, SessionStateMachine, SessionType, TimerSettings, TimerState,
};
