// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Cumulative running statistics

use serde::{Deserialize, Serialize};

use super::streak::longest_streak;
use crate::models::{ActivityRecord, Calendar};
use crate::units::{meters_to_miles, pace_from_mph, round2, safe_div, seconds_to_hours};

/// Summary statistics over every run in a collection
///
/// Distances are in miles, times in hours, elevations in meters, average
/// speed in mph and pace in minutes per mile. `fastest_speed_mps` keeps the
/// provider's meters per second.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub total_runs: u32,
    pub total_distance_miles: f64,
    pub total_time_hours: f64,
    pub total_elevation_gain_m: f64,
    pub avg_speed_mph: f64,
    pub avg_pace_min_per_mile: f64,
    pub avg_distance_per_run_miles: f64,
    pub avg_elevation_per_run_m: f64,
    pub fastest_speed_mps: f64,
    pub longest_streak_days: u32,
    pub farthest_run_miles: f64,
    pub shortest_run_miles: f64,
    pub max_altitude_m: f64,
}

impl AggregateStats {
    /// Copy with every real-valued metric rounded to two decimals
    pub fn rounded(&self) -> Self {
        Self {
            total_runs: self.total_runs,
            total_distance_miles: round2(self.total_distance_miles),
            total_time_hours: round2(self.total_time_hours),
            total_elevation_gain_m: round2(self.total_elevation_gain_m),
            avg_speed_mph: round2(self.avg_speed_mph),
            avg_pace_min_per_mile: round2(self.avg_pace_min_per_mile),
            avg_distance_per_run_miles: round2(self.avg_distance_per_run_miles),
            avg_elevation_per_run_m: round2(self.avg_elevation_per_run_m),
            fastest_speed_mps: round2(self.fastest_speed_mps),
            longest_streak_days: self.longest_streak_days,
            farthest_run_miles: round2(self.farthest_run_miles),
            shortest_run_miles: round2(self.shortest_run_miles),
            max_altitude_m: round2(self.max_altitude_m),
        }
    }
}

/// Full-precision accumulator for a single pass over runs
#[derive(Debug, Default)]
struct RunTotals {
    runs: u32,
    distance_meters: f64,
    moving_seconds: f64,
    elevation_gain_meters: f64,
    fastest_speed_mps: f64,
    farthest_meters: f64,
    shortest_meters: Option<f64>,
    max_altitude_meters: Option<f64>,
}

impl RunTotals {
    fn add(&mut self, run: &ActivityRecord) {
        self.runs += 1;
        self.distance_meters += run.distance_meters;
        self.moving_seconds += run.moving_time_seconds;
        self.elevation_gain_meters += run.total_elevation_gain_meters;
        self.fastest_speed_mps = self.fastest_speed_mps.max(run.max_speed_mps);
        self.farthest_meters = self.farthest_meters.max(run.distance_meters);
        self.shortest_meters = Some(match self.shortest_meters {
            Some(shortest) => shortest.min(run.distance_meters),
            None => run.distance_meters,
        });
        if let Some(elev_high) = run.elev_high_meters {
            self.max_altitude_meters = Some(match self.max_altitude_meters {
                Some(highest) => highest.max(elev_high),
                None => elev_high,
            });
        }
    }

    fn finish(self, longest_streak_days: u32) -> AggregateStats {
        let total_distance_miles = meters_to_miles(self.distance_meters);
        let total_time_hours = seconds_to_hours(self.moving_seconds);
        let avg_speed_mph = safe_div(total_distance_miles, total_time_hours);
        let runs = f64::from(self.runs);

        AggregateStats {
            total_runs: self.runs,
            total_distance_miles,
            total_time_hours,
            total_elevation_gain_m: self.elevation_gain_meters,
            avg_speed_mph,
            avg_pace_min_per_mile: pace_from_mph(avg_speed_mph),
            avg_distance_per_run_miles: safe_div(total_distance_miles, runs),
            avg_elevation_per_run_m: safe_div(self.elevation_gain_meters, runs),
            fastest_speed_mps: self.fastest_speed_mps,
            longest_streak_days,
            farthest_run_miles: meters_to_miles(self.farthest_meters),
            // no runs means no shortest run; report zero rather than a sentinel
            shortest_run_miles: self.shortest_meters.map(meters_to_miles).unwrap_or(0.0),
            max_altitude_m: self.max_altitude_meters.unwrap_or(0.0),
        }
    }
}

/// Compute running statistics at full precision
///
/// Only `"Run"` activities contribute. Call [`AggregateStats::rounded`] before
/// presenting the result.
pub fn compute_stats(activities: &[ActivityRecord], calendar: Calendar) -> AggregateStats {
    let totals = activities
        .iter()
        .filter(|activity| activity.is_run())
        .fold(RunTotals::default(), |mut totals, run| {
            totals.add(run);
            totals
        });

    totals.finish(longest_streak(activities, calendar))
}
