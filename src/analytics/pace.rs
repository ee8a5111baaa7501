// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Miles run at each whole-minute pace

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::models::ActivityRecord;
use crate::units::{meters_to_pace_miles, round2, seconds_to_minutes};

/// Total miles run at one rounded pace
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaceBucket {
    /// Pace in minutes per mile, rounded half away from zero
    pub pace_minutes_per_mile: i64,
    pub total_miles: f64,
}

/// Bucket run distance by rounded pace, ascending by pace
///
/// Runs without distance have no pace and are skipped. A run with distance
/// but no recorded moving time lands in the zero-minute bucket.
pub fn pace_buckets(activities: &[ActivityRecord]) -> Vec<PaceBucket> {
    let mut miles_by_pace: BTreeMap<i64, f64> = BTreeMap::new();

    for run in activities.iter().filter(|activity| activity.is_run()) {
        let distance_miles = meters_to_pace_miles(run.distance_meters);
        let moving_minutes = seconds_to_minutes(run.moving_time_seconds);

        if distance_miles <= 0.0 {
            debug!(
                activity.id = run.id.as_deref().unwrap_or("unknown"),
                moving_minutes, "Skipping run without distance"
            );
            continue;
        }

        let pace = moving_minutes / distance_miles;
        if !pace.is_finite() {
            continue;
        }

        *miles_by_pace.entry(pace.round() as i64).or_insert(0.0) += distance_miles;
    }

    miles_by_pace
        .into_iter()
        .map(|(pace_minutes_per_mile, total_miles)| PaceBucket {
            pace_minutes_per_mile,
            total_miles,
        })
        .collect()
}

impl PaceBucket {
    pub fn rounded(&self) -> Self {
        Self {
            pace_minutes_per_mile: self.pace_minutes_per_mile,
            total_miles: round2(self.total_miles),
        }
    }
}
