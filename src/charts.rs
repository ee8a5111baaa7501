// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Charts
//!
//! The analytics core produces data series only. Turning a series into an
//! image is delegated to a [`ChartRenderer`]; [`render_charts`] drives one
//! renderer over the four standard charts and keeps each chart's failure
//! to itself.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::analytics::{AnalyticsReport, PaceBucket, TrendSeries, WeekdayCounts};
use crate::constants::charts as labels;
use crate::errors::StatsResult;
use crate::logging::AppLogger;

/// The four standard charts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    PaceHistogram,
    AverageSpeedOverTime,
    DistanceOverTime,
    RunsByWeekday,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [
        ChartKind::PaceHistogram,
        ChartKind::AverageSpeedOverTime,
        ChartKind::DistanceOverTime,
        ChartKind::RunsByWeekday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::PaceHistogram => "pace_histogram",
            ChartKind::AverageSpeedOverTime => "average_speed_over_time",
            ChartKind::DistanceOverTime => "distance_over_time",
            ChartKind::RunsByWeekday => "runs_by_weekday",
        }
    }
}

/// Data handed to a renderer
#[derive(Debug, Clone, Copy)]
pub enum ChartSeries<'a> {
    /// Bar chart of miles per pace bucket
    Pace(&'a [PaceBucket]),
    /// Scatter plot with a dashed trend line
    Trend(&'a TrendSeries),
    /// Bar chart of runs per weekday
    Weekday(&'a WeekdayCounts),
}

/// Presentation hints for a renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartStyle {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Bar or marker colors, cycled
    pub palette: Vec<String>,
    /// Visible x-axis window, when fixed
    pub x_range: Option<(f64, f64)>,
}

impl ChartStyle {
    pub fn for_kind(kind: ChartKind) -> Self {
        let (title, x_label, y_label, x_range) = match kind {
            ChartKind::PaceHistogram => (
                labels::PACE_TITLE,
                labels::PACE_X_LABEL,
                labels::PACE_Y_LABEL,
                Some(labels::PACE_X_RANGE),
            ),
            ChartKind::AverageSpeedOverTime => {
                (labels::SPEED_TITLE, labels::DATE_LABEL, labels::SPEED_Y_LABEL, None)
            }
            ChartKind::DistanceOverTime => {
                (labels::DISTANCE_TITLE, labels::DATE_LABEL, labels::DISTANCE_Y_LABEL, None)
            }
            ChartKind::RunsByWeekday => (
                labels::WEEKDAY_TITLE,
                labels::WEEKDAY_X_LABEL,
                labels::WEEKDAY_Y_LABEL,
                None,
            ),
        };

        Self {
            title: title.to_string(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            palette: labels::PALETTE.iter().map(|c| c.to_string()).collect(),
            x_range,
        }
    }
}

/// Turns a chart series into an encoded raster image
pub trait ChartRenderer: Send + Sync {
    /// Encoded image bytes, or [`crate::errors::StatsError::Render`]
    fn render(&self, series: &ChartSeries<'_>, style: &ChartStyle) -> StatsResult<Vec<u8>>;
}

/// Outcome of rendering one chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedChart {
    pub chart: ChartKind,
    /// Base64 image payload on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_base64: Option<String>,
    /// Failure message otherwise
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RenderedChart {
    pub fn is_ok(&self) -> bool {
        self.image_base64.is_some()
    }
}

/// Series for one chart kind out of a report
pub fn series_for(report: &AnalyticsReport, kind: ChartKind) -> ChartSeries<'_> {
    match kind {
        ChartKind::PaceHistogram => ChartSeries::Pace(&report.pace_histogram),
        ChartKind::AverageSpeedOverTime => ChartSeries::Trend(&report.speed_over_time),
        ChartKind::DistanceOverTime => ChartSeries::Trend(&report.distance_over_time),
        ChartKind::RunsByWeekday => ChartSeries::Weekday(&report.runs_by_weekday),
    }
}

/// Render every standard chart; a failed chart does not stop the others
pub fn render_charts(report: &AnalyticsReport, renderer: &dyn ChartRenderer) -> Vec<RenderedChart> {
    ChartKind::ALL
        .iter()
        .map(|&kind| {
            let style = ChartStyle::for_kind(kind);
            match renderer.render(&series_for(report, kind), &style) {
                Ok(bytes) => {
                    AppLogger::log_chart_render(kind.as_str(), Ok(bytes.len()));
                    RenderedChart {
                        chart: kind,
                        image_base64: Some(STANDARD.encode(&bytes)),
                        error: None,
                    }
                }
                Err(e) => {
                    let error = e.to_string();
                    AppLogger::log_chart_render(kind.as_str(), Err(&error));
                    RenderedChart {
                        chart: kind,
                        image_base64: None,
                        error: Some(error),
                    }
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::{build_report, AnalyticsOptions};
    use crate::errors::StatsError;
    use crate::models::fixtures::run;

    /// Renders every series as a short tag, failing on weekday charts
    struct TagRenderer;

    impl ChartRenderer for TagRenderer {
        fn render(&self, series: &ChartSeries<'_>, style: &ChartStyle) -> StatsResult<Vec<u8>> {
            match series {
                ChartSeries::Pace(buckets) => Ok(format!("pace:{}", buckets.len()).into_bytes()),
                ChartSeries::Trend(trend) => Ok(format!("{}:{}", style.title, trend.points.len()).into_bytes()),
                ChartSeries::Weekday(_) => Err(StatsError::Render {
                    chart: "weekday".to_string(),
                    reason: "no fonts".to_string(),
                }),
            }
        }
    }

    #[test]
    fn test_styles() {
        let pace = ChartStyle::for_kind(ChartKind::PaceHistogram);
        assert_eq!(pace.title, "Miles Run at Different Paces");
        assert_eq!(pace.x_range, Some((5.0, 14.0)));
        assert_eq!(pace.palette.len(), 4);

        let weekday = ChartStyle::for_kind(ChartKind::RunsByWeekday);
        assert_eq!(weekday.y_label, "Number of Runs");
        assert!(weekday.x_range.is_none());
    }

    #[test]
    fn test_render_failure_is_isolated() {
        let activities = vec![
            run("2024-05-06T07:00:00", 5000.0, 1500.0),
            run("2024-05-07T07:00:00", 8000.0, 2500.0),
        ];
        let report = build_report(&activities, &AnalyticsOptions::default());
        let charts = render_charts(&report, &TagRenderer);

        assert_eq!(charts.len(), 4);
        assert!(charts[0].is_ok());
        assert_eq!(charts[0].image_base64.as_deref(), Some(STANDARD.encode("pace:1").as_str()));
        assert!(charts[1].is_ok());
        assert!(charts[2].is_ok());

        let weekday = &charts[3];
        assert_eq!(weekday.chart, ChartKind::RunsByWeekday);
        assert!(!weekday.is_ok());
        assert!(weekday.error.as_deref().unwrap().contains("no fonts"));
    }
}
