// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Metric-over-time series with a least-squares trend line

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::constants::limits::MIN_DISTINCT_POINTS_FOR_TREND;
use crate::constants::units::SECONDS_PER_DAY;
use crate::models::ActivityRecord;
use crate::units::{meters_to_miles, mps_to_mph, round2};

/// One observation of a metric at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

/// Degree-1 least-squares fit, `value = slope * days + intercept`
///
/// `days` is fractional days since `origin`, or since the Unix epoch when
/// `origin` is `None` (see [`days_since_epoch`]). `slope` is in metric units
/// per day.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    #[serde(default)]
    pub origin: Option<NaiveDateTime>,
}

impl LinearFit {
    pub fn value_at_days(&self, days: f64) -> f64 {
        self.slope * days + self.intercept
    }

    pub fn value_at(&self, timestamp: NaiveDateTime) -> f64 {
        let origin_days = self.origin.map_or(0.0, days_since_epoch);
        self.value_at_days(days_since_epoch(timestamp) - origin_days)
    }

    /// Same line with `x` measured from `origin`, so the intercept is the
    /// fitted value at that instant
    pub fn rebased(&self, origin: NaiveDateTime) -> Self {
        Self {
            slope: self.slope,
            intercept: self.value_at(origin),
            origin: Some(origin),
        }
    }

    pub fn rounded(&self) -> Self {
        Self {
            slope: round2(self.slope),
            intercept: round2(self.intercept),
            origin: self.origin,
        }
    }
}

/// Ordinary least-squares line through the points
///
/// Point order does not matter. With fewer than two distinct timestamps the
/// fit is flat through the mean value (zero for no points).
pub fn fit_linear_trend(points: &[TrendPoint]) -> LinearFit {
    if points.is_empty() {
        return LinearFit::default();
    }

    let n = points.len() as f64;
    let xs: Vec<f64> = points.iter().map(|p| days_since_epoch(p.timestamp)).collect();
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.value).sum::<f64>() / n;

    let flat = LinearFit { slope: 0.0, intercept: mean_y, origin: None };
    if distinct_count(&xs) < MIN_DISTINCT_POINTS_FOR_TREND {
        return flat;
    }

    // centered sums; raw x values sit near 20,000 days
    let (sxx, sxy) = xs
        .iter()
        .zip(points)
        .fold((0.0, 0.0), |(sxx, sxy), (x, p)| {
            let dx = x - mean_x;
            (sxx + dx * dx, sxy + dx * (p.value - mean_y))
        });

    if sxx == 0.0 {
        return flat;
    }

    let slope = sxy / sxx;
    LinearFit { slope, intercept: mean_y - slope * mean_x, origin: None }
}

fn distinct_count(xs: &[f64]) -> usize {
    let mut sorted = xs.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted.dedup();
    sorted.len()
}

/// Metric plotted against time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendMetric {
    /// Run distance in miles
    DistanceMiles,
    /// Run average speed in miles per hour
    AverageSpeedMph,
}

impl TrendMetric {
    fn value_of(self, run: &ActivityRecord) -> f64 {
        match self {
            TrendMetric::DistanceMiles => meters_to_miles(run.distance_meters),
            TrendMetric::AverageSpeedMph => mps_to_mph(run.average_speed_mps),
        }
    }
}

/// Chart-ready series: runs sorted by local start time plus the fitted line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSeries {
    pub metric: TrendMetric,
    pub points: Vec<TrendPoint>,
    /// Fit with `x` in days since the first point
    pub fit: LinearFit,
    /// Fitted line evaluated at the first and last timestamps
    pub trend_line: Option<(TrendPoint, TrendPoint)>,
}

impl TrendSeries {
    /// Build the series for a metric over every run
    ///
    /// Points are sorted by local start time; runs sharing a timestamp keep
    /// their input order.
    pub fn from_activities(activities: &[ActivityRecord], metric: TrendMetric) -> Self {
        let mut points: Vec<TrendPoint> = activities
            .iter()
            .filter(|activity| activity.is_run())
            .filter_map(|run| {
                Some(TrendPoint {
                    timestamp: run.start_date_local?,
                    value: metric.value_of(run),
                })
            })
            .collect();
        points.sort_by_key(|point| point.timestamp);

        let mut fit = fit_linear_trend(&points);
        if let Some(first) = points.first() {
            fit = fit.rebased(first.timestamp);
        }
        let trend_line = match (points.first(), points.last()) {
            (Some(first), Some(last)) => Some((
                TrendPoint { timestamp: first.timestamp, value: fit.value_at(first.timestamp) },
                TrendPoint { timestamp: last.timestamp, value: fit.value_at(last.timestamp) },
            )),
            _ => None,
        };

        Self { metric, points, fit, trend_line }
    }

    /// Copy with point values and fit coefficients rounded to two decimals
    pub fn rounded(&self) -> Self {
        let round_point = |p: &TrendPoint| TrendPoint { timestamp: p.timestamp, value: round2(p.value) };
        Self {
            metric: self.metric,
            points: self.points.iter().map(round_point).collect(),
            fit: self.fit.rounded(),
            trend_line: self
                .trend_line
                .as_ref()
                .map(|(start, end)| (round_point(start), round_point(end))),
        }
    }
}

/// Run distance (miles) against local start time
pub fn distance_over_time(activities: &[ActivityRecord]) -> TrendSeries {
    TrendSeries::from_activities(activities, TrendMetric::DistanceMiles)
}

/// Run average speed (mph) against local start time
pub fn speed_over_time(activities: &[ActivityRecord]) -> TrendSeries {
    TrendSeries::from_activities(activities, TrendMetric::AverageSpeedMph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::{ride, run};
    use chrono::{Duration, NaiveDate};

    fn at(days: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(7, 0, 0)
            .unwrap()
            + Duration::days(days)
    }

    #[test]
    fn test_two_point_fit() {
        let points = [
            TrendPoint { timestamp: at(0), value: 1.0 },
            TrendPoint { timestamp: at(1), value: 3.0 },
        ];
        let fit = fit_linear_trend(&points);
        assert!((fit.slope - 2.0).abs() < 1e-6);
        assert!((fit.value_at(at(0)) - 1.0).abs() < 1e-6);
        assert!((fit.value_at(at(1)) - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_fit_is_order_independent() {
        let points = vec![
            TrendPoint { timestamp: at(4), value: 9.0 },
            TrendPoint { timestamp: at(0), value: 1.5 },
            TrendPoint { timestamp: at(2), value: 4.0 },
            TrendPoint { timestamp: at(7), value: 11.0 },
        ];
        let mut sorted = points.clone();
        sorted.sort_by_key(|p| p.timestamp);

        let a = fit_linear_trend(&points);
        let b = fit_linear_trend(&sorted);
        assert!((a.slope - b.slope).abs() < 1e-9);
        assert!((a.value_at(at(3)) - b.value_at(at(3))).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_fits_are_flat() {
        assert_eq!(fit_linear_trend(&[]), LinearFit::default());

        let single = fit_linear_trend(&[TrendPoint { timestamp: at(0), value: 4.0 }]);
        assert_eq!(single.slope, 0.0);
        assert_eq!(single.intercept, 4.0);

        let same_time = fit_linear_trend(&[
            TrendPoint { timestamp: at(2), value: 2.0 },
            TrendPoint { timestamp: at(2), value: 6.0 },
        ]);
        assert_eq!(same_time.slope, 0.0);
        assert_eq!(same_time.intercept, 4.0);
    }

    #[test]
    fn test_series_sorted_and_runs_only() {
        let activities = vec![
            run("2024-03-03T07:00:00", 3218.0, 1800.0),
            ride("2024-03-02T07:00:00", 20_000.0),
            run("2024-03-01T07:00:00", 1609.0, 600.0),
        ];
        let series = distance_over_time(&activities);
        assert_eq!(series.metric, TrendMetric::DistanceMiles);
        assert_eq!(series.points.len(), 2);
        assert!(series.points[0].timestamp < series.points[1].timestamp);
        assert!((series.points[0].value - 1.0).abs() < 1e-9);
        assert!((series.points[1].value - 2.0).abs() < 1e-9);
        // one mile gained over two days
        assert!((series.fit.slope - 0.5).abs() < 1e-6);

        let (start, end) = series.trend_line.unwrap();
        assert!((start.value - 1.0).abs() < 1e-6);
        assert!((end.value - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_rebased_fit_keeps_the_line() {
        let points = [
            TrendPoint { timestamp: at(0), value: 1.0 },
            TrendPoint { timestamp: at(2), value: 2.0 },
            TrendPoint { timestamp: at(4), value: 4.0 },
        ];
        let fit = fit_linear_trend(&points);
        let rebased = fit.rebased(at(0));

        assert_eq!(rebased.origin, Some(at(0)));
        assert_eq!(rebased.slope, fit.slope);
        assert!((rebased.intercept - fit.value_at(at(0))).abs() < 1e-9);
        assert!((rebased.value_at(at(3)) - fit.value_at(at(3))).abs() < 1e-9);
        assert!((rebased.value_at_days(0.0) - rebased.intercept).abs() < 1e-12);
    }

    #[test]
    fn test_rounded_series_rounds_fit() {
        let activities = vec![
            run("2024-03-01T07:00:00", 1000.0, 600.0),
            run("2024-03-02T07:00:00", 2500.0, 900.0),
            run("2024-03-04T07:00:00", 4000.0, 1500.0),
        ];
        let series = distance_over_time(&activities);
        assert_eq!(series.fit.origin, Some(series.points[0].timestamp));
        // intercept near the first run's distance, not millions of miles back at the epoch
        assert!(series.fit.intercept.abs() < 2.0);

        let rounded = series.rounded();
        assert_eq!(rounded.fit.slope, round2(series.fit.slope));
        assert_eq!(rounded.fit.intercept, round2(series.fit.intercept));
        assert_eq!(rounded.fit.origin, series.fit.origin);
    }

    #[test]
    fn test_speed_series_in_mph() {
        let activities = vec![run("2024-03-01T07:00:00", 1609.0, 480.0)];
        let series = speed_over_time(&activities);
        assert!((series.points[0].value - 7.5).abs() < 1e-9);
        assert_eq!(series.fit.slope, 0.0);
    }

    #[test]
    fn test_empty_series() {
        let series = speed_over_time(&[]);
        assert!(series.points.is_empty());
        assert!(series.trend_line.is_none());
        assert_eq!(series.fit, LinearFit::default());
    }
}
