// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tracing::info;

use running_stats::analytics::build_report;
use running_stats::config::Config;
use running_stats::constants::endpoints;
use running_stats::logging;
use running_stats::models::{normalize_activities, Calendar};
use running_stats::oauth2_client::strava::authorization_url;
use running_stats::providers::strava::StravaActivityFetcher;
use running_stats::providers::{fetch_activities, http_client, token_provider_from_config};

#[derive(Parser, Debug)]
#[command(name = "running-stats")]
#[command(about = "Compute running statistics from Strava activity history")]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<String>,

    /// Analyze a saved JSON array of raw activities instead of fetching
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Write the fetched raw activities to this file
    #[arg(long)]
    save_raw: Option<PathBuf>,

    /// Authorization code from the OAuth redirect, used instead of the refresh token
    #[arg(long)]
    code: Option<String>,

    /// Print the Strava authorization URL and exit
    #[arg(long)]
    auth_url: bool,

    /// Redirect URI registered with the Strava application
    #[arg(long, default_value = "http://localhost/exchange_token")]
    redirect_uri: String,

    /// Calendar for streak days (local or utc), overriding the config
    #[arg(long)]
    streak_calendar: Option<Calendar>,

    /// Pretty-print the JSON report
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_from_env()?;

    let args = Args::parse();
    let config = Config::load(args.config)?;

    if args.auth_url {
        let client_id = config
            .strava
            .client_id
            .as_deref()
            .context("STRAVA_CLIENT_ID is required to build the authorization URL")?;
        let state = chrono::Utc::now().timestamp().to_string();
        let url = authorization_url(endpoints::STRAVA_AUTH_URL, client_id, &args.redirect_uri, &state)?;

        println!("Please visit this URL to authorize the application:");
        println!("{}", url);
        return Ok(());
    }

    let raw = match &args.input {
        Some(path) => read_raw_activities(path)?,
        None => {
            let client = http_client(&config.strava)?;
            let tokens = token_provider_from_config(&config.strava, client.clone(), args.code)?;
            let fetcher = StravaActivityFetcher::from_config(&config.strava, client, tokens.clone());
            fetch_activities(tokens.as_ref(), &fetcher).await?
        }
    };

    if let Some(path) = &args.save_raw {
        fs::write(path, serde_json::to_string_pretty(&raw)?)
            .with_context(|| format!("Failed to write raw activities to {}", path.display()))?;
        info!("Saved {} raw activities to {}", raw.len(), path.display());
    }

    let activities = normalize_activities(&raw)?;

    let mut options = config.analytics_options();
    if let Some(calendar) = args.streak_calendar {
        options.streak_calendar = calendar;
    }

    let report = build_report(&activities, &options);
    let output = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{}", output);

    Ok(())
}

fn read_raw_activities(path: &PathBuf) -> Result<Vec<Value>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read activities from {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("{} must contain a JSON array of activities", path.display()))
}
