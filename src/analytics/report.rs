// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The JSON-ready result handed to callers

use serde::Serialize;
use tracing::info;

use super::aggregator::{compute_stats, AggregateStats};
use super::pace::{pace_buckets, PaceBucket};
use super::streak::{longest_streak_span, StreakSpan};
use super::trend::{distance_over_time, speed_over_time, TrendSeries};
use super::weekday::{counts_by_weekday, WeekdayCounts};
use crate::charts::{render_charts, ChartRenderer, RenderedChart};
use crate::models::{ActivityRecord, ActivitySummary, Calendar};

/// Knobs that change how the report is computed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalyticsOptions {
    /// Calendar used to decide which day a run belongs to for streaks
    pub streak_calendar: Calendar,
}

/// Statistics, chart-ready series and the passthrough activity list
///
/// All real-valued display metrics are rounded to two decimals. The
/// aggregate statistics are flattened into the top level of the JSON object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsReport {
    #[serde(flatten)]
    pub stats: AggregateStats,
    pub pace_histogram: Vec<PaceBucket>,
    pub distance_over_time: TrendSeries,
    pub speed_over_time: TrendSeries,
    pub runs_by_weekday: WeekdayCounts,
    pub longest_streak_period: Option<StreakSpan>,
    pub streak_calendar: Calendar,
    /// Start coordinates of the most recent activity
    pub latlong: Option<(f64, f64)>,
    /// Every normalized activity, runs or not
    pub activities: Vec<ActivitySummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub charts: Vec<RenderedChart>,
}

impl AnalyticsReport {
    /// Attach rendered charts; failures are recorded per chart
    pub fn with_charts(mut self, renderer: &dyn ChartRenderer) -> Self {
        self.charts = render_charts(&self, renderer);
        self
    }
}

/// Compute every statistic and series over one activity collection
pub fn build_report(activities: &[ActivityRecord], options: &AnalyticsOptions) -> AnalyticsReport {
    info!(
        activities = activities.len(),
        streak.calendar = ?options.streak_calendar,
        "Building running statistics report"
    );

    let stats = compute_stats(activities, options.streak_calendar);

    let latlong = activities
        .iter()
        .max_by_key(|activity| activity.start_date_utc)
        .and_then(|latest| latest.start_latlng);

    AnalyticsReport {
        stats: stats.rounded(),
        pace_histogram: pace_buckets(activities).iter().map(PaceBucket::rounded).collect(),
        distance_over_time: distance_over_time(activities).rounded(),
        speed_over_time: speed_over_time(activities).rounded(),
        runs_by_weekday: counts_by_weekday(activities),
        longest_streak_period: longest_streak_span(activities, options.streak_calendar),
        streak_calendar: options.streak_calendar,
        latlong,
        activities: activities.iter().map(ActivityRecord::summary).collect(),
        charts: Vec::new(),
    }
}
