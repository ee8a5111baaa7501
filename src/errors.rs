// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Error taxonomy shared by the analytics core and its collaborators

/// Errors produced while normalizing, fetching, or rendering activity data
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    /// A single raw record could not be turned into an `ActivityRecord`
    #[error("Malformed activity record: {reason}")]
    MalformedRecord { reason: String },

    /// Every record in a non-empty batch was malformed
    #[error("No valid activity data: all {total} records were malformed")]
    NoValidData { total: usize },

    /// The token provider could not produce a usable credential
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The activity API answered with something other than a page of records
    #[error("Activity fetch failed: {0}")]
    Fetch(String),

    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    /// A single chart failed to render
    #[error("Failed to render {chart} chart: {reason}")]
    Render { chart: String, reason: String },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl StatsError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        StatsError::MalformedRecord { reason: reason.into() }
    }

    /// Whether a retry with a fresh credential could succeed
    pub fn is_auth(&self) -> bool {
        matches!(self, StatsError::Auth(_))
    }
}

pub type StatsResult<T> = std::result::Result<T, StatsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = StatsError::malformed("missing distance");
        assert_eq!(err.to_string(), "Malformed activity record: missing distance");

        let err = StatsError::NoValidData { total: 3 };
        assert!(err.to_string().contains("all 3 records"));

        let err = StatsError::Render {
            chart: "pace".to_string(),
            reason: "backend offline".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to render pace chart: backend offline");
    }

    #[test]
    fn test_is_auth() {
        assert!(StatsError::Auth("expired".to_string()).is_auth());
        assert!(!StatsError::Fetch("500".to_string()).is_auth());
    }
}
