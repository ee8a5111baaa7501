// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Runs per day of the week

use chrono::{Datelike, Weekday};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::models::ActivityRecord;

/// Monday through Sunday
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Run count for each of the seven weekdays; never sparse
///
/// Serializes as a map from weekday name to count, Monday first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeekdayCounts {
    counts: [u32; 7],
}

impl WeekdayCounts {
    pub fn get(&self, day: Weekday) -> u32 {
        self.counts[day.num_days_from_monday() as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Weekday, u32)> + '_ {
        WEEKDAYS.iter().map(move |day| (*day, self.get(*day)))
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    fn increment(&mut self, day: Weekday) {
        self.counts[day.num_days_from_monday() as usize] += 1;
    }
}

impl Serialize for WeekdayCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(WEEKDAYS.len()))?;
        for (day, count) in self.iter() {
            map.serialize_entry(weekday_name(day), &count)?;
        }
        map.end()
    }
}

/// Count runs by the weekday of their local start date
pub fn counts_by_weekday(activities: &[ActivityRecord]) -> WeekdayCounts {
    activities
        .iter()
        .filter(|activity| activity.is_run())
        .filter_map(|run| run.start_date_local)
        .fold(WeekdayCounts::default(), |mut counts, start| {
            counts.increment(start.weekday());
            counts
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::{ride, run};

    #[test]
    fn test_empty_input_has_seven_zero_entries() {
        let counts = counts_by_weekday(&[]);
        assert_eq!(counts.iter().count(), 7);
        assert!(counts.iter().all(|(_, count)| count == 0));
    }

    #[test]
    fn test_counts_runs_by_local_weekday() {
        let activities = vec![
            // 2024-05-06 is a Monday
            run("2024-05-06T07:00:00", 5000.0, 1500.0),
            run("2024-05-06T19:00:00", 3000.0, 900.0),
            run("2024-05-11T08:00:00", 10_000.0, 3000.0),
            ride("2024-05-07T08:00:00", 20_000.0),
        ];
        let counts = counts_by_weekday(&activities);
        assert_eq!(counts.get(Weekday::Mon), 2);
        assert_eq!(counts.get(Weekday::Sat), 1);
        assert_eq!(counts.get(Weekday::Tue), 0);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn test_serializes_in_week_order() {
        let counts = counts_by_weekday(&[run("2024-05-12T07:00:00", 5000.0, 1500.0)]);
        let json = serde_json::to_string(&counts).unwrap();
        assert!(json.starts_with("{\"Monday\":0"));
        assert!(json.ends_with("\"Sunday\":1}"));
    }
}
