mod clock;
mod completion;
mod engine;
mod session_type;

pub use clock::{ManualClock, SessionClock, Tick, TokioClock, TICK_INTERVAL};
pub use completion::{
    next_transition, CompletionPrompt, CompletionState, CounterEffect, Decision, Transition,
};
pub use engine::{SessionStateMachine, TimerState};
pub use session_type::{format_clock, SessionDurations, SessionType, TimerSettings};
