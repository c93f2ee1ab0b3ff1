//! Statistics over the session log.
//!
//! Daily, weekly and monthly pomodoro counts plus streak tracking, all in the
//! local calendar of the running process.

mod aggregator;
mod calendar;

pub use aggregator::{StatisticsAggregator, StatsSummary};
pub use calendar::{month_range, monday_based_index, week_range, weekday_index, DateRange};
