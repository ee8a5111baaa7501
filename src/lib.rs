// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Running Stats
//!
//! Running statistics computed from a Strava activity history: cumulative
//! totals and averages, the longest streak of consecutive running days, a
//! pace histogram, distance and speed trends with a least-squares fit, and
//! runs per weekday.
//!
//! ## Features
//!
//! - **Pure analytics core**: every statistic is a function of an activity slice
//! - **Tolerant normalization**: malformed records are logged and skipped
//! - **OAuth2 token handling**: refresh-token and authorization-code grants
//! - **Paginated fetch**: bounded token refresh when the API answers 401
//! - **Pluggable charts**: rendering is delegated to a [`charts::ChartRenderer`]
//!
//! ## Architecture
//!
//! - **Models**: normalized activity records
//! - **Analytics**: aggregate stats, streaks, pace, trends, weekdays
//! - **Providers**: token and activity fetch capabilities, with Strava implementations
//! - **Charts**: chart series, styles and the renderer seam
//! - **Config**: configuration management and persistence
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use running_stats::analytics::{build_report, AnalyticsOptions};
//! use running_stats::models::normalize_activities;
//!
//! fn main() -> anyhow::Result<()> {
//!     let raw: Vec<serde_json::Value> =
//!         serde_json::from_str(&std::fs::read_to_string("activities.json")?)?;
//!     let activities = normalize_activities(&raw)?;
//!
//!     let report = build_report(&activities, &AnalyticsOptions::default());
//!     println!("{}", serde_json::to_string_pretty(&report)?);
//!     Ok(())
//! }
//! ```

/// Statistics and chart-ready series over activity records
pub mod analytics;

/// Chart series, styles and the renderer interface
pub mod charts;

/// Configuration management and persistence
pub mod config;

/// Application constants and configuration values
pub mod constants;

/// Error types shared across the crate
pub mod errors;

/// Structured logging setup
pub mod logging;

/// Normalized activity records
pub mod models;

/// OAuth2 client for Strava token grants
pub mod oauth2_client;

/// Token and activity fetch capabilities
pub mod providers;

/// Unit conversions and display rounding
pub mod units;
