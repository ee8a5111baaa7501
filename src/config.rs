// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Configuration management for the running statistics tool

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::analytics::AnalyticsOptions;
use crate::constants::{endpoints, env_config, limits};
use crate::models::Calendar;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub strava: StravaConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

/// Strava API credentials and fetch behaviour
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StravaConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub refresh_token: Option<String>,
    /// Pre-issued bearer token, used as-is when no refresh credentials exist
    pub access_token: Option<String>,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    /// Token refreshes tolerated per request before giving up
    #[serde(default = "default_max_auth_attempts")]
    pub max_auth_attempts: u32,
    /// Stop paginating after this many pages
    pub max_pages: Option<u32>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AnalyticsConfig {
    /// `local` (default) or `utc`
    #[serde(default)]
    pub streak_calendar: Calendar,
}

fn default_api_base() -> String {
    endpoints::STRAVA_API_BASE.to_string()
}

fn default_token_url() -> String {
    endpoints::STRAVA_TOKEN_URL.to_string()
}

fn default_per_page() -> u32 {
    limits::DEFAULT_PER_PAGE
}

fn default_max_auth_attempts() -> u32 {
    limits::DEFAULT_MAX_AUTH_ATTEMPTS
}

fn default_request_timeout_secs() -> u64 {
    limits::DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Default for StravaConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            refresh_token: None,
            access_token: None,
            api_base: default_api_base(),
            token_url: default_token_url(),
            per_page: default_per_page(),
            max_auth_attempts: default_max_auth_attempts(),
            max_pages: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Config {
    /// Load from an explicit file, the user config directory, or the environment
    pub fn load(path: Option<String>) -> Result<Self> {
        let config_path = path.unwrap_or_else(default_config_path);

        let config = if Path::new(&config_path).exists() {
            info!("Loading configuration from {}", config_path);
            let content = fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config file: {}", config_path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", config_path))?
        } else {
            if let Err(e) = dotenv::dotenv() {
                warn!("No .env file found or failed to load: {}", e);
            }
            Self::from_env_with(|key| std::env::var(key).ok())?
        };

        config.validate()?;
        Ok(config)
    }

    /// Build configuration from variables supplied by `lookup`
    pub fn from_env_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = StravaConfig::default();

        let strava = StravaConfig {
            client_id: lookup(env_config::CLIENT_ID_VAR),
            client_secret: lookup(env_config::CLIENT_SECRET_VAR),
            refresh_token: lookup(env_config::REFRESH_TOKEN_VAR),
            access_token: lookup(env_config::ACCESS_TOKEN_VAR),
            api_base: lookup(env_config::API_BASE_VAR).unwrap_or(defaults.api_base),
            token_url: lookup(env_config::TOKEN_URL_VAR).unwrap_or(defaults.token_url),
            per_page: parse_or(&lookup, env_config::PER_PAGE_VAR, defaults.per_page)?,
            max_auth_attempts: parse_or(
                &lookup,
                env_config::MAX_AUTH_ATTEMPTS_VAR,
                defaults.max_auth_attempts,
            )?,
            max_pages: lookup(env_config::MAX_PAGES_VAR)
                .map(|v| v.parse().context("Invalid STRAVA_MAX_PAGES value"))
                .transpose()?,
            request_timeout_secs: parse_or(
                &lookup,
                env_config::REQUEST_TIMEOUT_VAR,
                defaults.request_timeout_secs,
            )?,
        };

        let analytics = AnalyticsConfig {
            streak_calendar: lookup(env_config::STREAK_CALENDAR_VAR)
                .map(|v| v.parse::<Calendar>())
                .transpose()?
                .unwrap_or_default(),
        };

        Ok(Config { strava, analytics })
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.strava.per_page == 0 {
            return Err(anyhow::anyhow!("STRAVA_PER_PAGE must be at least 1"));
        }
        if self.strava.max_auth_attempts == 0 {
            return Err(anyhow::anyhow!("STRAVA_MAX_AUTH_ATTEMPTS must be at least 1"));
        }
        if self.strava.max_pages == Some(0) {
            return Err(anyhow::anyhow!("STRAVA_MAX_PAGES must be at least 1 when set"));
        }
        url::Url::parse(&self.strava.api_base).context("Invalid Strava API base URL")?;
        url::Url::parse(&self.strava.token_url).context("Invalid Strava token URL")?;

        if self.strava.access_token.is_none() && !self.strava.has_refresh_credentials() {
            warn!("No Strava credentials configured; only --input files can be analyzed");
        }

        Ok(())
    }

    pub fn analytics_options(&self) -> AnalyticsOptions {
        AnalyticsOptions {
            streak_calendar: self.analytics.streak_calendar,
        }
    }

    pub fn save(&self, path: Option<String>) -> Result<()> {
        let config_path = path.unwrap_or_else(default_config_path);

        let parent = Path::new(&config_path).parent().context("Invalid config path")?;
        fs::create_dir_all(parent)?;

        let content = toml::to_string_pretty(self)?;
        fs::write(&config_path, content)?;

        Ok(())
    }
}

impl StravaConfig {
    /// Client id, secret and refresh token are all present
    pub fn has_refresh_credentials(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some() && self.refresh_token.is_some()
    }
}

fn default_config_path() -> String {
    dirs::config_dir()
        .map(|p| p.join("running-stats/config.toml"))
        .unwrap_or_else(|| "config.toml".into())
        .to_string_lossy()
        .to_string()
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("Invalid {} value: {}", key, value)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    /// Helper function to create a temporary config file
    fn create_temp_config_file(content: &str) -> (TempDir, String) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, content).expect("Failed to write temp config");
        (temp_dir, config_path.to_string_lossy().to_string())
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.strava.per_page, 200);
        assert_eq!(config.strava.max_auth_attempts, 3);
        assert_eq!(config.strava.api_base, "https://www.strava.com/api/v3");
        assert_eq!(config.analytics.streak_calendar, Calendar::Local);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_env() {
        let config = Config::from_env_with(lookup_from(&[
            ("STRAVA_CLIENT_ID", "110708"),
            ("STRAVA_CLIENT_SECRET", "secret"),
            ("STRAVA_REFRESH_TOKEN", "refresh"),
            ("STRAVA_PER_PAGE", "50"),
            ("STRAVA_MAX_PAGES", "4"),
            ("STREAK_CALENDAR", "utc"),
        ]))
        .unwrap();

        assert!(config.strava.has_refresh_credentials());
        assert_eq!(config.strava.per_page, 50);
        assert_eq!(config.strava.max_pages, Some(4));
        assert_eq!(config.strava.max_auth_attempts, 3);
        assert_eq!(config.analytics.streak_calendar, Calendar::Utc);
    }

    #[test]
    fn test_from_env_rejects_bad_numbers() {
        let err = Config::from_env_with(lookup_from(&[("STRAVA_PER_PAGE", "lots")])).unwrap_err();
        assert!(err.to_string().contains("STRAVA_PER_PAGE"));

        assert!(Config::from_env_with(lookup_from(&[("STREAK_CALENDAR", "lunar")])).is_err());
    }

    #[test]
    fn test_validation() {
        let mut config = Config::default();
        config.strava.per_page = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.strava.max_auth_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.strava.api_base = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_load_from_file() {
        let config_content = r#"
[strava]
client_id = "file_client_id"
client_secret = "file_client_secret"
refresh_token = "file_refresh_token"
per_page = 100

[analytics]
streak_calendar = "utc"
"#;
        let (_temp_dir, config_path) = create_temp_config_file(config_content);

        let config = Config::load(Some(config_path)).expect("Failed to load config");
        assert_eq!(config.strava.client_id.as_deref(), Some("file_client_id"));
        assert_eq!(config.strava.per_page, 100);
        assert_eq!(config.strava.token_url, "https://www.strava.com/oauth/token");
        assert_eq!(config.analytics_options().streak_calendar, Calendar::Utc);
    }

    #[test]
    fn test_config_load_invalid_file() {
        let (_temp_dir, config_path) = create_temp_config_file("[strava\nper_page = ");
        let err = Config::load(Some(config_path)).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_config_save_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested/config.toml");
        let config_path = config_path.to_string_lossy().to_string();

        let mut config = Config::default();
        config.strava.client_id = Some("saved".to_string());
        config.analytics.streak_calendar = Calendar::Utc;
        config.save(Some(config_path.clone())).unwrap();

        let loaded = Config::load(Some(config_path)).unwrap();
        assert_eq!(loaded.strava.client_id.as_deref(), Some("saved"));
        assert_eq!(loaded.analytics.streak_calendar, Calendar::Utc);
    }
}
