//! Repeating one-second ticker.
//!
//! A clock delivers [`Tick`]s tagged with the generation they were scheduled
//! under. The state machine bumps the generation every time it (re)schedules
//! the clock and drops ticks from any other generation, so a tick that was
//! already queued when the ticker got cancelled can never decrement the
//! countdown.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub generation: u64,
}

pub trait SessionClock: Send {
    /// Start ticking every `interval`, replacing any ticker already running.
    fn schedule(&mut self, generation: u64, interval: Duration);

    /// Stop ticking. Idempotent.
    fn cancel(&mut self);
}

/// Ticker backed by a tokio task feeding an unbounded channel.
pub struct TokioClock {
    sender: mpsc::UnboundedSender<Tick>,
    handle: Option<JoinHandle<()>>,
}

impl TokioClock {
    /// Create the clock and the receiving end the driver loop reads from.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Tick>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                sender,
                handle: None,
            },
            receiver,
        )
    }
}

impl SessionClock for TokioClock {
    fn schedule(&mut self, generation: u64, interval: Duration) {
        self.cancel();

        let sender = self.sender.clone();
        let handle = tokio::spawn(async move {
            // First tick lands one full interval after scheduling.
            let mut ticker = time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);
            loop {
                ticker.tick().await;
                if sender.send(Tick { generation }).is_err() {
                    break;
                }
            }
        });
        debug!(generation, "ticker scheduled");
        self.handle = Some(handle);
    }

    fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("ticker cancelled");
        }
    }
}

impl Drop for TokioClock {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[derive(Debug, Default)]
struct ManualClockState {
    active: Option<u64>,
    schedules: u32,
    cancels: u32,
}

/// Clock that never ticks by itself; the caller delivers ticks.
///
/// Clones share state, so a test can keep a handle after moving the clock
/// into a state machine.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    state: Arc<Mutex<ManualClockState>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generation currently scheduled, if any.
    pub fn active_generation(&self) -> Option<u64> {
        self.lock().active
    }

    pub fn schedule_count(&self) -> u32 {
        self.lock().schedules
    }

    pub fn cancel_count(&self) -> u32 {
        self.lock().cancels
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManualClockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionClock for ManualClock {
    fn schedule(&mut self, generation: u64, _interval: Duration) {
        let mut state = self.lock();
        state.active = Some(generation);
        state.schedules += 1;
    }

    fn cancel(&mut self) {
        let mut state = self.lock();
        if state.active.take().is_some() {
            state.cancels += 1;
        }
    }
}
