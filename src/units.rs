// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Unit conversions and presentation rounding

use crate::constants::units::{
    METERS_PER_MILE, MILES_PER_METER, MINUTES_PER_HOUR, SECONDS_PER_HOUR, SECONDS_PER_MINUTE,
};

/// Meters to miles for aggregate statistics
pub fn meters_to_miles(meters: f64) -> f64 {
    meters / METERS_PER_MILE
}

/// Meters to miles for pace bucketing
pub fn meters_to_pace_miles(meters: f64) -> f64 {
    meters * MILES_PER_METER
}

pub fn seconds_to_hours(seconds: f64) -> f64 {
    seconds / SECONDS_PER_HOUR
}

pub fn seconds_to_minutes(seconds: f64) -> f64 {
    seconds / SECONDS_PER_MINUTE
}

/// Meters per second to miles per hour, on the same mile as `meters_to_miles`
pub fn mps_to_mph(mps: f64) -> f64 {
    meters_to_miles(mps * SECONDS_PER_HOUR)
}

/// Minutes per mile at a given speed; 0 when standing still
pub fn pace_from_mph(mph: f64) -> f64 {
    safe_div(MINUTES_PER_HOUR, mph)
}

/// Division that yields 0 instead of NaN or infinity
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let value = numerator / denominator;
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Round to two decimals, ties away from zero
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    (value * 100.0).round() / 100.0
}
