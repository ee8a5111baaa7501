// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Activity Providers
//!
//! Capabilities the statistics core depends on but does not implement:
//! obtaining a bearer credential ([`TokenProvider`]) and pulling every raw
//! activity record for it ([`ActivityFetcher`]). The Strava implementations
//! live in [`strava`].

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::config::StravaConfig;
use crate::constants::limits;
use crate::errors::{StatsError, StatsResult};

pub mod strava;

/// Bearer credential for the activity API
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// A usable credential, or [`StatsError::Auth`]
    async fn get_token(&self) -> StatsResult<Credential>;

    /// A new credential after the current one was rejected
    async fn refresh_token(&self) -> StatsResult<Credential> {
        self.get_token().await
    }
}

#[async_trait]
pub trait ActivityFetcher: Send + Sync {
    /// Every raw record across all pages; an empty page ends pagination
    async fn fetch_all(&self, credential: &Credential) -> StatsResult<Vec<Value>>;
}

/// How many times a rejected credential may be refreshed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per request, counting the first one
    pub max_auth_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_auth_attempts: limits::DEFAULT_MAX_AUTH_ATTEMPTS,
        }
    }
}

impl RetryPolicy {
    /// Whether another attempt is allowed after `failures` rejections
    pub fn allows_retry(&self, failures: u32) -> bool {
        failures < self.max_auth_attempts
    }
}

/// Pre-issued token that cannot be refreshed
pub struct StaticTokenProvider {
    credential: Credential,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            credential: Credential::new(token),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn get_token(&self) -> StatsResult<Credential> {
        Ok(self.credential.clone())
    }

    async fn refresh_token(&self) -> StatsResult<Credential> {
        Err(StatsError::Auth(
            "access token was rejected and no refresh credentials are configured".to_string(),
        ))
    }
}

/// Obtain a credential and fetch every activity with it
pub async fn fetch_activities(
    tokens: &dyn TokenProvider,
    fetcher: &dyn ActivityFetcher,
) -> StatsResult<Vec<Value>> {
    let credential = tokens.get_token().await?;
    fetcher.fetch_all(&credential).await
}

/// HTTP client honoring the configured request timeout
pub fn http_client(config: &StravaConfig) -> StatsResult<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()?)
}

/// Pick a token provider for the configured credentials
///
/// An authorization code takes precedence, then the refresh token, then a
/// pre-issued access token.
pub fn token_provider_from_config(
    config: &StravaConfig,
    client: reqwest::Client,
    authorization_code: Option<String>,
) -> StatsResult<Arc<dyn TokenProvider>> {
    let client_credentials = config.client_id.as_ref().zip(config.client_secret.as_ref());

    let grant = match (authorization_code, &config.refresh_token) {
        (Some(code), _) => Some(strava::Grant::AuthorizationCode(code)),
        (None, Some(refresh_token)) => Some(strava::Grant::RefreshToken(refresh_token.clone())),
        (None, None) => None,
    };

    match (client_credentials, grant, &config.access_token) {
        (Some((client_id, client_secret)), Some(grant), _) => Ok(Arc::new(
            strava::StravaTokenProvider::new(client, &config.token_url, client_id, client_secret, grant),
        )),
        (_, _, Some(access_token)) => Ok(Arc::new(StaticTokenProvider::new(access_token))),
        _ => Err(StatsError::Auth(
            "no Strava credentials configured: set STRAVA_CLIENT_ID, STRAVA_CLIENT_SECRET and \
             STRAVA_REFRESH_TOKEN, or STRAVA_ACCESS_TOKEN"
                .to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoFetcher;

    #[async_trait]
    impl ActivityFetcher for EchoFetcher {
        async fn fetch_all(&self, credential: &Credential) -> StatsResult<Vec<Value>> {
            Ok(vec![Value::String(credential.as_str().to_string())])
        }
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let credential = Credential::new("secret-token");
        assert_eq!(format!("{:?}", credential), "Credential(***)");
    }

    #[test]
    fn test_retry_policy() {
        let policy = RetryPolicy::default();
        assert!(policy.allows_retry(2));
        assert!(!policy.allows_retry(3));
    }

    #[tokio::test]
    async fn test_static_provider() {
        let provider = StaticTokenProvider::new("abc");
        assert_eq!(provider.get_token().await.unwrap().as_str(), "abc");
        assert!(provider.refresh_token().await.unwrap_err().is_auth());

        let records = fetch_activities(&provider, &EchoFetcher).await.unwrap();
        assert_eq!(records, vec![Value::String("abc".to_string())]);
    }

    #[test]
    fn test_token_provider_from_config() {
        let client = reqwest::Client::new();
        let mut config = StravaConfig::default();
        assert!(token_provider_from_config(&config, client.clone(), None).is_err());

        config.access_token = Some("pre-issued".to_string());
        assert!(token_provider_from_config(&config, client.clone(), None).is_ok());

        config.access_token = None;
        config.client_id = Some("id".to_string());
        config.client_secret = Some("secret".to_string());
        assert!(token_provider_from_config(&config, client.clone(), None).is_err());
        assert!(token_provider_from_config(&config, client, Some("code".to_string())).is_ok());
    }
}
