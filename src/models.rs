// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Data Models
//!
//! Typed representation of the activity records returned by the Strava
//! activity list endpoint.
//!
//! Raw records arrive as loosely-typed JSON objects. [`ActivityRecord::from_raw`]
//! validates and normalizes one record; [`normalize_activities`] applies it to a
//! whole batch, skipping records that cannot be normalized.
//!
//! ## Core Models
//!
//! - [`ActivityRecord`]: One logged exercise session
//! - [`SportType`]: Activity type tag; only [`SportType::Run`] feeds running statistics
//! - [`ActivitySummary`]: Passthrough export row for every activity, runs or not
//! - [`Calendar`]: Which start timestamp defines an activity's calendar day

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::constants::{activity_types, json_fields};
use crate::errors::{StatsError, StatsResult};
use crate::logging::AppLogger;

/// Activity type tag
///
/// Strava reports many more types than are listed here; anything else is kept
/// verbatim in [`SportType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SportType {
    /// Running activity
    Run,
    /// Cycling activity
    Ride,
    /// Swimming activity
    Swim,
    /// Walking activity
    Walk,
    /// Hiking activity
    Hike,
    /// Treadmill running activity
    VirtualRun,
    /// Any other provider tag
    Other(String),
}

impl SportType {
    /// Map a Strava `type` string
    pub fn from_provider_string(provider_sport: &str) -> Self {
        match provider_sport {
            activity_types::RUN => SportType::Run,
            "Ride" => SportType::Ride,
            "Swim" => SportType::Swim,
            "Walk" => SportType::Walk,
            "Hike" => SportType::Hike,
            "VirtualRun" => SportType::VirtualRun,
            other => SportType::Other(other.to_string()),
        }
    }

    /// The Strava `type` string this tag came from
    pub fn as_provider_str(&self) -> &str {
        match self {
            SportType::Run => activity_types::RUN,
            SportType::Ride => "Ride",
            SportType::Swim => "Swim",
            SportType::Walk => "Walk",
            SportType::Hike => "Hike",
            SportType::VirtualRun => "VirtualRun",
            SportType::Other(name) => name,
        }
    }

    pub fn is_run(&self) -> bool {
        matches!(self, SportType::Run)
    }
}

/// Which start timestamp decides the calendar day of an activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Calendar {
    /// Wall-clock date where the activity took place (`start_date_local`)
    #[default]
    Local,
    /// UTC date (`start_date`)
    Utc,
}

impl std::str::FromStr for Calendar {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(Calendar::Local),
            "utc" => Ok(Calendar::Utc),
            other => Err(StatsError::Config(format!(
                "unknown calendar '{}', expected 'local' or 'utc'",
                other
            ))),
        }
    }
}

/// One logged exercise session
///
/// Built once by [`ActivityRecord::from_raw`] and never mutated afterwards;
/// every statistic is a pure function of a slice of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Provider identifier, when present
    pub id: Option<String>,
    /// Human-readable title
    pub name: String,
    /// Activity type tag
    pub sport_type: SportType,
    /// Distance covered in meters
    pub distance_meters: f64,
    /// Time spent moving in seconds
    pub moving_time_seconds: f64,
    /// Elevation gained in meters
    pub total_elevation_gain_meters: f64,
    /// Average speed in meters per second
    pub average_speed_mps: f64,
    /// Top speed in meters per second
    pub max_speed_mps: f64,
    /// Highest point reached in meters; absent for indoor sessions
    pub elev_high_meters: Option<f64>,
    /// Wall-clock start time where the activity took place; always set for runs
    pub start_date_local: Option<NaiveDateTime>,
    /// Start time in UTC; always set for runs
    pub start_date_utc: Option<DateTime<Utc>>,
    /// Starting `[latitude, longitude]`, when recorded
    pub start_latlng: Option<(f64, f64)>,
    /// Encoded route polyline, when recorded
    pub summary_polyline: Option<String>,
}

impl ActivityRecord {
    /// Normalize one raw Strava activity object
    ///
    /// Runs must carry every numeric field the running statistics read;
    /// other activity types default missing numbers to zero.
    pub fn from_raw(raw: &Value) -> StatsResult<Self> {
        let object = raw
            .as_object()
            .ok_or_else(|| StatsError::malformed("record is not a JSON object"))?;

        let type_tag = object
            .get(json_fields::TYPE)
            .and_then(Value::as_str)
            .ok_or_else(|| StatsError::malformed("missing activity type"))?;
        let sport_type = SportType::from_provider_string(type_tag);
        let strict = sport_type.is_run();

        let number = |field: &str| numeric_field(raw, field, strict);

        let start_date_utc = timestamp_field(raw, json_fields::START_DATE, strict, parse_utc)?;
        let start_date_local =
            timestamp_field(raw, json_fields::START_DATE_LOCAL, strict, parse_local)?;

        let elev_high_meters = match object.get(json_fields::ELEV_HIGH) {
            None | Some(Value::Null) => None,
            Some(value) if !strict => value.as_f64().filter(|v| v.is_finite()),
            Some(value) => Some(value.as_f64().filter(|v| v.is_finite()).ok_or_else(|| {
                StatsError::malformed(format!("non-numeric {}", json_fields::ELEV_HIGH))
            })?),
        };

        let id = object.get(json_fields::ID).and_then(|id| match id {
            Value::Number(n) => Some(n.to_string()),
            Value::String(s) => Some(s.clone()),
            _ => None,
        });

        let start_latlng = object
            .get(json_fields::START_LATLNG)
            .and_then(Value::as_array)
            .and_then(|coords| match coords.as_slice() {
                [lat, lng, ..] => Some((lat.as_f64()?, lng.as_f64()?)),
                _ => None,
            });

        let summary_polyline = object
            .get(json_fields::MAP)
            .and_then(|map| map.get(json_fields::SUMMARY_POLYLINE))
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(ActivityRecord {
            id,
            name: object
                .get(json_fields::NAME)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            sport_type,
            distance_meters: number(json_fields::DISTANCE)?,
            moving_time_seconds: number(json_fields::MOVING_TIME)?,
            total_elevation_gain_meters: number(json_fields::TOTAL_ELEVATION_GAIN)?,
            average_speed_mps: number(json_fields::AVERAGE_SPEED)?,
            max_speed_mps: number(json_fields::MAX_SPEED)?,
            elev_high_meters,
            start_date_local,
            start_date_utc,
            start_latlng,
            summary_polyline,
        })
    }

    pub fn is_run(&self) -> bool {
        self.sport_type.is_run()
    }

    /// Calendar day the activity started on, when its start time is known
    pub fn calendar_date(&self, calendar: Calendar) -> Option<NaiveDate> {
        match calendar {
            Calendar::Local => self.start_date_local.map(|local| local.date()),
            Calendar::Utc => self.start_date_utc.map(|utc| utc.date_naive()),
        }
    }

    /// Export row for this activity
    pub fn summary(&self) -> ActivitySummary {
        ActivitySummary {
            activity_positions: self.summary_polyline.clone(),
            activity_name: self.name.clone(),
            activity_type: self.sport_type.as_provider_str().to_string(),
            activity_distance: self.distance_meters,
            activity_date: self.start_date_utc,
        }
    }
}

/// Passthrough export row, emitted for runs and non-runs alike
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySummary {
    /// Encoded route polyline
    pub activity_positions: Option<String>,
    pub activity_name: String,
    /// Strava type tag
    pub activity_type: String,
    /// Distance in meters
    pub activity_distance: f64,
    /// Start time in UTC
    pub activity_date: Option<DateTime<Utc>>,
}

/// Normalize a batch of raw records
///
/// Malformed records are logged and skipped. A non-empty batch in which every
/// record is malformed yields [`StatsError::NoValidData`]; an empty batch is
/// not an error.
pub fn normalize_activities(raw: &[Value]) -> StatsResult<Vec<ActivityRecord>> {
    let mut activities = Vec::with_capacity(raw.len());
    let mut skipped = 0usize;

    for (index, record) in raw.iter().enumerate() {
        match ActivityRecord::from_raw(record) {
            Ok(activity) => activities.push(activity),
            Err(e) => {
                skipped += 1;
                AppLogger::log_skipped_record(index, &e.to_string());
            }
        }
    }

    if !raw.is_empty() && activities.is_empty() {
        return Err(StatsError::NoValidData { total: raw.len() });
    }
    if skipped > 0 {
        warn!("Skipped {} of {} activity records", skipped, raw.len());
    }

    Ok(activities)
}

fn numeric_field(raw: &Value, field: &str, required: bool) -> StatsResult<f64> {
    match raw.get(field) {
        None | Some(Value::Null) if required => {
            Err(StatsError::malformed(format!("missing {}", field)))
        }
        None | Some(Value::Null) => Ok(0.0),
        Some(value) => match value.as_f64() {
            Some(n) if n.is_finite() && (n >= 0.0 || !is_non_negative(field)) => Ok(n),
            Some(n) if required => Err(StatsError::malformed(format!(
                "{} out of range: {}",
                field, n
            ))),
            Some(_) => Ok(0.0),
            None if required => Err(StatsError::malformed(format!("non-numeric {}", field))),
            None => Ok(0.0),
        },
    }
}

/// Start timestamps are required for runs; other types keep `None` when
/// the value is missing or unparseable.
fn timestamp_field<T>(
    raw: &Value,
    field: &str,
    required: bool,
    parse: fn(&str) -> StatsResult<T>,
) -> StatsResult<Option<T>> {
    match raw.get(field).and_then(Value::as_str) {
        Some(value) if required => parse(value).map(Some),
        Some(value) => Ok(parse(value).ok()),
        None if required => Err(StatsError::malformed(format!("missing {}", field))),
        None => Ok(None),
    }
}

/// Elevation gain may legitimately be negative on some devices
fn is_non_negative(field: &str) -> bool {
    field != json_fields::TOTAL_ELEVATION_GAIN
}

fn parse_utc(value: &str) -> StatsResult<DateTime<Utc>> {
    value
        .parse::<DateTime<Utc>>()
        .or_else(|_| parse_naive(value).map(|naive| naive.and_utc()))
        .map_err(|_| StatsError::malformed(format!("unparseable start_date '{}'", value)))
}

/// Strava marks local times with a `Z` suffix that carries no offset meaning,
/// so only the wall-clock part is kept.
fn parse_local(value: &str) -> StatsResult<NaiveDateTime> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.naive_local())
        .or_else(|_| parse_naive(value))
        .map_err(|_| StatsError::malformed(format!("unparseable start_date_local '{}'", value)))
}

fn parse_naive(value: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S"))
}
