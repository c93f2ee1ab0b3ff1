//! Read-side summaries over the session log.
//!
//! Only pomodoro sessions count. The filtered list is cached until
//! [`StatisticsAggregator::refresh`] is called, which the state machine does
//! after every successful append. All bucketing uses the local calendar.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{Datelike, Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, warn};

use super::calendar::{month_range, week_range, weekday_index, DateRange};
use crate::session::Session;
use crate::storage::SessionLog;

type TodayFn = Box<dyn Fn() -> NaiveDate + Send + Sync>;

/// Dashboard snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSummary {
    pub today_sessions: u32,
    pub today_focus_minutes: u32,
    pub current_streak: u32,
    pub week: DateRange,
    /// Monday..Sunday pomodoro counts for the current week.
    pub week_session_counts: [u32; 7],
}

pub struct StatisticsAggregator {
    log: Arc<dyn SessionLog>,
    cache: RwLock<Option<Arc<Vec<Session>>>>,
    revision: watch::Sender<u64>,
    today: TodayFn,
}

impl StatisticsAggregator {
    pub fn new(log: Arc<dyn SessionLog>) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            log,
            cache: RwLock::new(None),
            revision,
            today: Box::new(|| Local::now().date_naive()),
        }
    }

    /// Replace the source of "today", for deterministic tests.
    pub fn with_today(mut self, today: impl Fn() -> NaiveDate + Send + Sync + 'static) -> Self {
        self.today = Box::new(today);
        self
    }

    pub fn today(&self) -> NaiveDate {
        (self.today)()
    }

    /// Drop the cache and notify subscribers.
    pub fn refresh(&self) {
        *self.cache.write().unwrap_or_else(PoisonError::into_inner) = None;
        let next = *self.revision.borrow() + 1;
        self.revision.send_replace(next);
        debug!(revision = next, "statistics refreshed");
    }

    /// Receiver that changes every time the statistics are refreshed.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Pomodoros completed today.
    pub fn today_session_count(&self) -> u32 {
        let today = self.today();
        self.pomodoros()
            .iter()
            .filter(|s| s.local_date() == today)
            .count() as u32
    }

    /// Whole minutes of focus recorded today.
    pub fn today_focus_minutes(&self) -> u32 {
        let today = self.today();
        let seconds: u64 = self
            .pomodoros()
            .iter()
            .filter(|s| s.local_date() == today)
            .map(|s| u64::from(s.duration))
            .sum();
        (seconds / 60) as u32
    }

    /// Consecutive days with at least one pomodoro, ending today, or
    /// yesterday when nothing has been done today yet.
    pub fn current_streak(&self) -> u32 {
        let days: HashSet<NaiveDate> = self.pomodoros().iter().map(Session::local_date).collect();
        let today = self.today();

        let mut day = if days.contains(&today) {
            today
        } else {
            today - Duration::days(1)
        };
        let mut streak = 0;
        while days.contains(&day) {
            streak += 1;
            day -= Duration::days(1);
        }
        streak
    }

    /// Monday..Sunday counts for the week `offset` weeks from the current one.
    pub fn week_session_counts(&self, offset: i32) -> [u32; 7] {
        let range = self.week_range(offset);
        let mut counts = [0u32; 7];
        for session in self.pomodoros().iter() {
            let date = session.local_date();
            if range.contains(date) {
                counts[weekday_index(date)] += 1;
            }
        }
        counts
    }

    /// Day of month -> count, for days that have at least one pomodoro.
    pub fn month_sessions_by_day(&self, offset: i32) -> BTreeMap<u32, u32> {
        let range = self.month_range(offset);
        let mut by_day = BTreeMap::new();
        for session in self.pomodoros().iter() {
            let date = session.local_date();
            if range.contains(date) {
                *by_day.entry(date.day()).or_insert(0) += 1;
            }
        }
        by_day
    }

    pub fn week_range(&self, offset: i32) -> DateRange {
        week_range(self.today(), offset)
    }

    pub fn month_range(&self, offset: i32) -> DateRange {
        month_range(self.today(), offset)
    }

    pub fn summary(&self) -> StatsSummary {
        StatsSummary {
            today_sessions: self.today_session_count(),
            today_focus_minutes: self.today_focus_minutes(),
            current_streak: self.current_streak(),
            week: self.week_range(0),
            week_session_counts: self.week_session_counts(0),
        }
    }

    /// Cached pomodoro sessions. A failed load is logged and not cached, so
    /// the next query retries.
    fn pomodoros(&self) -> Arc<Vec<Session>> {
        if let Some(cached) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            return Arc::clone(cached);
        }

        match self.log.load_all() {
            Ok(sessions) => {
                let pomodoros: Arc<Vec<Session>> =
                    Arc::new(sessions.into_iter().filter(Session::is_pomodoro).collect());
                debug!(count = pomodoros.len(), "session log loaded");
                *self.cache.write().unwrap_or_else(PoisonError::into_inner) =
                    Some(Arc::clone(&pomodoros));
                pomodoros
            }
            Err(e) => {
                warn!(error = %e, "failed to load session log; statistics are empty");
                Arc::new(Vec::new())
            }
        }
    }
}
