//! Local-calendar helpers for bucketing sessions into weeks and months.
//!
//! Weeks run Monday through Sunday.

use chrono::{Datelike, Days, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Convert a Sunday-based weekday number (Sunday = 1 .. Saturday = 7) into a
/// Monday-based index (Monday = 0 .. Sunday = 6).
pub fn monday_based_index(sunday_based: u32) -> usize {
    ((sunday_based + 5) % 7) as usize
}

/// Monday-based index of `date` within its week.
pub fn weekday_index(date: NaiveDate) -> usize {
    monday_based_index(date.weekday().number_from_sunday())
}

/// Inclusive range of local dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Monday..Sunday week containing `today`, shifted by `offset` weeks.
pub fn week_range(today: NaiveDate, offset: i32) -> DateRange {
    let start = today
        .checked_sub_days(Days::new(weekday_index(today) as u64))
        .and_then(|monday| monday.checked_add_signed(Duration::weeks(i64::from(offset))));
    let end = start.and_then(|start| start.checked_add_days(Days::new(6)));
    match (start, end) {
        (Some(start), Some(end)) => DateRange { start, end },
        // Out of chrono's representable range.
        _ => DateRange {
            start: today,
            end: today,
        },
    }
}

/// Calendar month containing `today`, shifted by `offset` months.
pub fn month_range(today: NaiveDate, offset: i32) -> DateRange {
    let months = i64::from(today.year()) * 12 + i64::from(today.month0()) + i64::from(offset);
    let year = months.div_euclid(12) as i32;
    let month0 = months.rem_euclid(12) as u32;

    let start = NaiveDate::from_ymd_opt(year, month0 + 1, 1);
    let next = if month0 == 11 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month0 + 2, 1)
    };
    match (start, next) {
        (Some(start), Some(next)) => DateRange {
            start,
            end: next - Duration::days(1),
        },
        // Out of chrono's representable range.
        _ => DateRange {
            start: today,
            end: today,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn remap_table() {
        // Sunday=1 .. Saturday=7
        let expected = [6, 0, 1, 2, 3, 4, 5];
        for (i, want) in expected.iter().enumerate() {
            assert_eq!(monday_based_index(i as u32 + 1), *want);
        }
    }

    #[test]
    fn weekday_index_of_known_dates() {
        assert_eq!(weekday_index(ymd(2025, 1, 6)), 0); // Monday
        assert_eq!(weekday_index(ymd(2025, 1, 8)), 2); // Wednesday
        assert_eq!(weekday_index(ymd(2025, 1, 12)), 6); // Sunday
    }

    #[test]
    fn week_range_from_sunday_starts_previous_monday() {
        let range = week_range(ymd(2025, 1, 12), 0);
        assert_eq!(range.start, ymd(2025, 1, 6));
        assert_eq!(range.end, ymd(2025, 1, 12));

        let prev = week_range(ymd(2025, 1, 12), -1);
        assert_eq!(prev.start, ymd(2024, 12, 30));
        assert_eq!(prev.end, ymd(2025, 1, 5));
    }

    #[test]
    fn extreme_offsets_fall_back_to_today() {
        let today = ymd(2025, 1, 8);
        for offset in [i32::MAX, i32::MIN] {
            let week = week_range(today, offset);
            assert_eq!((week.start, week.end), (today, today));
            let month = month_range(today, offset);
            assert_eq!((month.start, month.end), (today, today));
        }
    }

    #[test]
    fn month_range_handles_year_boundaries() {
        let jan = month_range(ymd(2025, 1, 15), 0);
        assert_eq!(jan.start, ymd(2025, 1, 1));
        assert_eq!(jan.end, ymd(2025, 1, 31));

        let dec = month_range(ymd(2025, 1, 15), -1);
        assert_eq!(dec.start, ymd(2024, 12, 1));
        assert_eq!(dec.end, ymd(2024, 12, 31));

        let feb_leap = month_range(ymd(2023, 12, 31), 2);
        assert_eq!(feb_leap.end, ymd(2024, 2, 29));
        assert!(feb_leap.contains(ymd(2024, 2, 10)));
        assert!(!feb_leap.contains(ymd(2024, 3, 1)));
    }

    proptest! {
        #[test]
        fn remap_matches_chrono(days in 0i64..20_000) {
            let date = ymd(1990, 1, 1) + Duration::days(days);
            let idx = weekday_index(date);
            prop_assert_eq!(idx as u32, date.weekday().num_days_from_monday());
        }

        #[test]
        fn week_range_always_contains_today(days in 0i64..20_000, offset in -52i32..52) {
            let today = ymd(1990, 1, 1) + Duration::days(days);
            let range = week_range(today, 0);
            prop_assert!(range.contains(today));
            prop_assert_eq!(weekday_index(range.start), 0);

            let shifted = week_range(today, offset);
            prop_assert_eq!((shifted.start - range.start).num_days(), i64::from(offset) * 7);
        }
    }
}
