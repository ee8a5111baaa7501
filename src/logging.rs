// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Structured logging setup
//!
//! Log output always goes to stderr so that the JSON report written to
//! stdout can be piped into other tools.

use anyhow::Result;
use std::io;
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::constants::env_config;

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    pub level: String,
    pub format: LogFormat,
    /// Include source file and line numbers
    pub include_location: bool,
    pub service_name: String,
    pub service_version: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line
    Json,
    Pretty,
    Compact,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
            include_location: false,
            service_name: "running-stats".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl LoggingConfig {
    /// Create logging configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create logging configuration from variables supplied by `lookup`
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let format = match lookup("LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            Some("pretty") => LogFormat::Pretty,
            _ => LogFormat::Compact,
        };

        Self {
            level: lookup(env_config::LOG_LEVEL_VAR).unwrap_or(defaults.level),
            format,
            include_location: lookup("LOG_INCLUDE_LOCATION").is_some(),
            service_name: lookup("SERVICE_NAME").unwrap_or(defaults.service_name),
            service_version: defaults.service_version,
        }
    }

    /// Initialize the global tracing subscriber
    pub fn init(&self) -> Result<()> {
        let env_filter = EnvFilter::try_new(&self.level).unwrap_or_else(|_| EnvFilter::new("info"));
        let registry = tracing_subscriber::registry().with(env_filter);

        match self.format {
            LogFormat::Json => {
                let layer = fmt::layer()
                    .with_file(self.include_location)
                    .with_line_number(self.include_location)
                    .with_target(true)
                    .with_writer(io::stderr)
                    .json();
                registry.with(layer).try_init()?;
            }
            LogFormat::Pretty => {
                let layer = fmt::layer()
                    .pretty()
                    .with_file(self.include_location)
                    .with_line_number(self.include_location)
                    .with_writer(io::stderr);
                registry.with(layer).try_init()?;
            }
            LogFormat::Compact => {
                let layer = fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(io::stderr);
                registry.with(layer).try_init()?;
            }
        }

        debug!(
            service.name = %self.service_name,
            service.version = %self.service_version,
            log.level = %self.level,
            log.format = ?self.format,
            "Logging initialized"
        );

        Ok(())
    }
}

/// Initialize logging from environment
pub fn init_from_env() -> Result<()> {
    LoggingConfig::from_env().init()
}

/// Structured events emitted by the fetch and render pipeline
pub struct AppLogger;

impl AppLogger {
    /// One page of raw activities received from the provider
    pub fn log_fetch_page(page: u32, count: usize) {
        info!(fetch.page = page, fetch.count = count, "Fetched activity page");
    }

    /// A raw record dropped during normalization
    pub fn log_skipped_record(index: usize, reason: &str) {
        warn!(record.index = index, record.reason = %reason, "Skipping malformed activity record");
    }

    /// Outcome of an OAuth token grant
    pub fn log_token_refresh(grant: &str, success: bool) {
        if success {
            info!(oauth.grant = %grant, oauth.success = success, "Obtained access token");
        } else {
            warn!(oauth.grant = %grant, oauth.success = success, "Token request rejected");
        }
    }

    /// Outcome of rendering one chart: image size, or the renderer's error
    pub fn log_chart_render(chart: &str, outcome: Result<usize, &str>) {
        match outcome {
            Ok(bytes) => {
                info!(chart.kind = %chart, chart.success = true, chart.bytes = bytes, "Chart rendered");
            }
            Err(error) => {
                warn!(chart.kind = %chart, chart.success = false, chart.error = %error, "Chart rendering failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn capture(f: impl FnOnce()) -> String {
        let logs = CapturedLogs::default();
        let subscriber = fmt::Subscriber::builder()
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        logs.contents()
    }

    #[test]
    fn test_chart_render_outcome_sets_level_and_message() {
        let rendered = capture(|| AppLogger::log_chart_render("pace_histogram", Ok(512)));
        assert!(rendered.contains("INFO"));
        assert!(rendered.contains("Chart rendered"));

        let failed = capture(|| AppLogger::log_chart_render("pace_histogram", Err("no data")));
        assert!(failed.contains("WARN"));
        assert!(failed.contains("Chart rendering failed"));
        assert!(failed.contains("no data"));
        assert!(!failed.contains("Chart rendered"));
        assert_eq!(failed.lines().count(), 1);
    }

    #[test]
    fn test_logging_config_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("RUST_LOG", "debug"),
            ("LOG_FORMAT", "json"),
            ("LOG_INCLUDE_LOCATION", "1"),
            ("SERVICE_NAME", "test-service"),
        ]
        .into_iter()
        .collect();

        let config = LoggingConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.level, "debug");
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.service_name, "test-service");
        assert!(config.include_location);
    }

    #[test]
    fn test_default_logging_config() {
        let config = LoggingConfig::default();

        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Compact);
        assert_eq!(config.service_name, "running-stats");
        assert!(!config.include_location);

        let from_nothing = LoggingConfig::from_lookup(|_| None);
        assert_eq!(from_nothing.level, config.level);
        assert_eq!(from_nothing.format, config.format);
    }
}
