use std::sync::Arc;

use clap::Subcommand;
use focusloop_core::storage::open_session_log;
use focusloop_core::{Config, StatisticsAggregator};
use serde_json::json;

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's pomodoro count and focus minutes
    Today,
    /// Monday..Sunday counts
    Week {
        /// Weeks relative to the current one (-1 = last week)
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        offset: i32,
    },
    /// Per-day counts for a month
    Month {
        /// Months relative to the current one (-1 = last month)
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        offset: i32,
    },
    /// Consecutive days with at least one pomodoro
    Streak,
    /// Everything on the dashboard
    Summary,
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let stats = StatisticsAggregator::new(open_session_log(&config)?);
    let value = report(&stats, action);
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

pub(crate) fn report(stats: &StatisticsAggregator, action: StatsAction) -> serde_json::Value {
    match action {
        StatsAction::Today => json!({
            "date": stats.today(),
            "sessions": stats.today_session_count(),
            "focus_minutes": stats.today_focus_minutes(),
        }),
        StatsAction::Week { offset } => {
            let counts = stats.week_session_counts(offset);
            let days: Vec<_> = WEEKDAYS
                .iter()
                .zip(counts)
                .map(|(day, count)| json!({ "day": day, "count": count }))
                .collect();
            json!({
                "range": stats.week_range(offset),
                "total": counts.iter().sum::<u32>(),
                "days": days,
            })
        }
        StatsAction::Month { offset } => {
            let by_day = stats.month_sessions_by_day(offset);
            json!({
                "range": stats.month_range(offset),
                "total": by_day.values().sum::<u32>(),
                "by_day": by_day,
            })
        }
        StatsAction::Streak => json!({ "current_streak": stats.current_streak() }),
        StatsAction::Summary => json!(stats.summary()),
    }
}

/// Used by the interactive timer to print statistics without reopening
/// the log.
pub(crate) fn summary(stats: &Arc<StatisticsAggregator>) -> serde_json::Value {
    report(stats, StatsAction::Summary)
}
