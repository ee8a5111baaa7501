// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Longest run of consecutive calendar days with at least one run

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::models::{ActivityRecord, Calendar};

/// The longest streak and the days it covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakSpan {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: u32,
}

/// Length in days of the longest consecutive-day running streak
///
/// Returns 0 when there are no runs.
pub fn longest_streak(activities: &[ActivityRecord], calendar: Calendar) -> u32 {
    longest_streak_span(activities, calendar)
        .map(|span| span.days)
        .unwrap_or(0)
}

/// The longest consecutive-day running streak, earliest one on ties
///
/// Input order and same-day duplicates do not matter: run dates are
/// collected into an ordered set before scanning.
pub fn longest_streak_span(activities: &[ActivityRecord], calendar: Calendar) -> Option<StreakSpan> {
    let run_days: BTreeSet<NaiveDate> = activities
        .iter()
        .filter(|activity| activity.is_run())
        .filter_map(|run| run.calendar_date(calendar))
        .collect();

    let mut days = run_days.into_iter();
    let first = days.next()?;

    let mut best = StreakSpan { start: first, end: first, days: 1 };
    let mut current = best;

    for day in days {
        let gap = (day - current.end).num_days();
        if gap == 1 {
            current.end = day;
            current.days += 1;
        } else {
            current = StreakSpan { start: day, end: day, days: 1 };
        }
        if current.days > best.days {
            best = current;
        }
    }

    Some(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::{ride, run};

    fn runs_on(dates: &[&str]) -> Vec<ActivityRecord> {
        dates
            .iter()
            .map(|date| run(&format!("{}T07:30:00", date), 5000.0, 1500.0))
            .collect()
    }

    #[test]
    fn test_empty_and_single() {
        assert_eq!(longest_streak(&[], Calendar::Local), 0);
        assert_eq!(longest_streak_span(&[], Calendar::Local), None);
        assert_eq!(longest_streak(&runs_on(&["2024-05-01"]), Calendar::Local), 1);
    }

    #[test]
    fn test_gap_resets_streak() {
        // D, D+1, D+2, D+5, D+6
        let activities = runs_on(&[
            "2024-05-01",
            "2024-05-02",
            "2024-05-03",
            "2024-05-06",
            "2024-05-07",
        ]);
        let span = longest_streak_span(&activities, Calendar::Local).unwrap();
        assert_eq!(span.days, 3);
        assert_eq!(span.start, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(span.end, NaiveDate::from_ymd_opt(2024, 5, 3).unwrap());
    }

    #[test]
    fn test_same_day_runs_count_once() {
        let mut activities = runs_on(&["2024-05-01", "2024-05-02"]);
        activities.push(run("2024-05-01T18:00:00", 3000.0, 900.0));
        assert_eq!(longest_streak(&activities, Calendar::Local), 2);
    }

    #[test]
    fn test_unsorted_input() {
        let activities = runs_on(&[
            "2024-05-09",
            "2024-05-03",
            "2024-05-08",
            "2024-05-01",
            "2024-05-10",
            "2024-05-02",
        ]);
        let span = longest_streak_span(&activities, Calendar::Local).unwrap();
        assert_eq!(span.days, 3);
        // ties keep the earliest streak
        assert_eq!(span.start, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    }

    #[test]
    fn test_streak_crosses_month_and_year() {
        let activities = runs_on(&["2023-12-30", "2023-12-31", "2024-01-01", "2024-01-02"]);
        assert_eq!(longest_streak(&activities, Calendar::Local), 4);
    }

    #[test]
    fn test_non_runs_do_not_bridge_gaps() {
        let mut activities = runs_on(&["2024-05-01", "2024-05-03"]);
        activities.push(ride("2024-05-02T08:00:00", 20_000.0));
        assert_eq!(longest_streak(&activities, Calendar::Local), 1);
    }
}
