// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Analytics Module
//!
//! Running statistics and chart-ready series computed from a fully
//! materialized list of [`crate::models::ActivityRecord`]s.
//!
//! Every function here is pure and synchronous over a shared slice, so the
//! individual analyses can run in any order or in parallel.
//!
//! This module includes:
//! - Cumulative statistics (distance, time, elevation, speed, pace)
//! - Longest consecutive-day streak detection
//! - Pace histogram
//! - Distance and speed trends with a least-squares fit
//! - Weekday frequency

pub mod aggregator;
pub mod pace;
pub mod report;
pub mod streak;
pub mod trend;
pub mod weekday;

pub use aggregator::{compute_stats, AggregateStats};
pub use pace::{pace_buckets, PaceBucket};
pub use report::{build_report, AnalyticsOptions, AnalyticsReport};
pub use streak::{longest_streak, longest_streak_span, StreakSpan};
pub use trend::{
    days_since_epoch, distance_over_time, fit_linear_trend, speed_over_time, LinearFit,
    TrendMetric, TrendPoint, TrendSeries,
};
pub use weekday::{counts_by_weekday, weekday_name, WeekdayCounts, WEEKDAYS};
