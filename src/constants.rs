// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Constants Module
//!
//! Application constants and environment-based configuration values.
//! This module provides both hardcoded constants and environment variable configuration.

/// Environment variable names
pub mod env_config {
    pub const CLIENT_ID_VAR: &str = "STRAVA_CLIENT_ID";
    pub const CLIENT_SECRET_VAR: &str = "STRAVA_CLIENT_SECRET";
    pub const REFRESH_TOKEN_VAR: &str = "STRAVA_REFRESH_TOKEN";
    pub const ACCESS_TOKEN_VAR: &str = "STRAVA_ACCESS_TOKEN";
    pub const API_BASE_VAR: &str = "STRAVA_API_BASE";
    pub const TOKEN_URL_VAR: &str = "STRAVA_TOKEN_URL";
    pub const PER_PAGE_VAR: &str = "STRAVA_PER_PAGE";
    pub const MAX_AUTH_ATTEMPTS_VAR: &str = "STRAVA_MAX_AUTH_ATTEMPTS";
    pub const MAX_PAGES_VAR: &str = "STRAVA_MAX_PAGES";
    pub const REQUEST_TIMEOUT_VAR: &str = "STRAVA_REQUEST_TIMEOUT_SECS";
    pub const STREAK_CALENDAR_VAR: &str = "STREAK_CALENDAR";
    pub const LOG_LEVEL_VAR: &str = "RUST_LOG";
}

/// API endpoints and URLs
pub mod endpoints {
    /// Strava API
    pub const STRAVA_API_BASE: &str = "https://www.strava.com/api/v3";
    pub const STRAVA_TOKEN_URL: &str = "https://www.strava.com/oauth/token";
    pub const STRAVA_AUTH_URL: &str = "https://www.strava.com/oauth/authorize";

    /// Path of the paginated activity list, relative to the API base
    pub const ATHLETE_ACTIVITIES_PATH: &str = "/athlete/activities";
}

/// Numeric limits and thresholds
pub mod limits {
    /// Largest page Strava serves for the activity list
    pub const DEFAULT_PER_PAGE: u32 = 200;

    /// Credential refreshes allowed before a 401 becomes an auth error
    pub const DEFAULT_MAX_AUTH_ATTEMPTS: u32 = 3;

    pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

    /// Distinct x-values needed for a non-degenerate trend fit
    pub const MIN_DISTINCT_POINTS_FOR_TREND: usize = 2;
}

/// Unit conversions
pub mod units {
    /// Divisor used by the aggregate statistics (meters to miles)
    pub const METERS_PER_MILE: f64 = 1609.0;

    /// Multiplier used by the pace histogram (meters to miles)
    pub const MILES_PER_METER: f64 = 0.00062137;

    pub const SECONDS_PER_MINUTE: f64 = 60.0;
    pub const SECONDS_PER_HOUR: f64 = 3600.0;
    pub const MINUTES_PER_HOUR: f64 = 60.0;
    pub const SECONDS_PER_DAY: f64 = 86_400.0;
}

/// Activity type tags as emitted by Strava
pub mod activity_types {
    /// The only tag that participates in running statistics
    pub const RUN: &str = "Run";
}

/// Chart titles, labels and palette
pub mod charts {
    pub const PALETTE: [&str; 4] = ["#F4BFBF", "#8EA7E9", "#FAF0D7", "#8CC0DE"];

    pub const PACE_TITLE: &str = "Miles Run at Different Paces";
    pub const PACE_X_LABEL: &str = "Pace (minutes per mile)";
    pub const PACE_Y_LABEL: &str = "Total Miles Run";
    /// Visible pace window in minutes per mile
    pub const PACE_X_RANGE: (f64, f64) = (5.0, 14.0);

    pub const SPEED_TITLE: &str = "Average Speed over Time";
    pub const SPEED_Y_LABEL: &str = "Average Speed (mph)";

    pub const DISTANCE_TITLE: &str = "Distance over Time";
    pub const DISTANCE_Y_LABEL: &str = "Distance (miles)";

    pub const WEEKDAY_TITLE: &str = "Frequency of Runs by Day of the Week";
    pub const WEEKDAY_X_LABEL: &str = "Day of the Week";
    pub const WEEKDAY_Y_LABEL: &str = "Number of Runs";

    pub const DATE_LABEL: &str = "Date";
}

/// Raw Strava JSON field names
pub mod json_fields {
    pub const ID: &str = "id";
    pub const NAME: &str = "name";
    pub const TYPE: &str = "type";
    pub const DISTANCE: &str = "distance";
    pub const MOVING_TIME: &str = "moving_time";
    pub const TOTAL_ELEVATION_GAIN: &str = "total_elevation_gain";
    pub const AVERAGE_SPEED: &str = "average_speed";
    pub const MAX_SPEED: &str = "max_speed";
    pub const ELEV_HIGH: &str = "elev_high";
    pub const START_DATE: &str = "start_date";
    pub const START_DATE_LOCAL: &str = "start_date_local";
    pub const START_LATLNG: &str = "start_latlng";
    pub const MAP: &str = "map";
    pub const SUMMARY_POLYLINE: &str = "summary_polyline";
}
