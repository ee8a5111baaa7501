// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Strava implementations of the token and activity fetch capabilities

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::{ActivityFetcher, Credential, RetryPolicy, TokenProvider};
use crate::config::StravaConfig;
use crate::constants::endpoints;
use crate::errors::{StatsError, StatsResult};
use crate::logging::AppLogger;
use crate::oauth2_client::strava::{exchange_strava_code, refresh_strava_token};
use crate::oauth2_client::OAuth2Token;

/// OAuth grant used to obtain the next access token
#[derive(Clone, PartialEq, Eq)]
pub enum Grant {
    RefreshToken(String),
    /// Single-use code from the authorization redirect
    AuthorizationCode(String),
}

impl Grant {
    fn kind(&self) -> &'static str {
        match self {
            Grant::RefreshToken(_) => "refresh_token",
            Grant::AuthorizationCode(_) => "authorization_code",
        }
    }
}

impl std::fmt::Debug for Grant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Grant({})", self.kind())
    }
}

struct TokenState {
    grant: Grant,
    token: Option<OAuth2Token>,
}

/// Issues access tokens from Strava's OAuth token endpoint
///
/// The current token is reused until it is about to expire. Refresh tokens
/// rotated by Strava replace the configured one for later grants.
pub struct StravaTokenProvider {
    client: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    state: Mutex<TokenState>,
}

impl StravaTokenProvider {
    pub fn new(
        client: Client,
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        grant: Grant,
    ) -> Self {
        Self {
            client,
            token_url: token_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            state: Mutex::new(TokenState { grant, token: None }),
        }
    }

    async fn request_new_token(&self, state: &mut TokenState) -> StatsResult<Credential> {
        let token = match &state.grant {
            Grant::RefreshToken(refresh_token) => {
                refresh_strava_token(
                    &self.client,
                    &self.token_url,
                    &self.client_id,
                    &self.client_secret,
                    refresh_token,
                )
                .await?
            }
            Grant::AuthorizationCode(code) => {
                let (token, athlete) = exchange_strava_code(
                    &self.client,
                    &self.token_url,
                    &self.client_id,
                    &self.client_secret,
                    code,
                )
                .await?;

                if let Some(athlete) = athlete {
                    info!(
                        "Authenticated as Strava athlete: {} ({})",
                        athlete.id,
                        athlete.username.as_deref().unwrap_or("unknown")
                    );
                }
                token
            }
        };

        if let Some(refresh_token) = &token.refresh_token {
            state.grant = Grant::RefreshToken(refresh_token.clone());
        }

        let credential = Credential::new(token.access_token.clone());
        state.token = Some(token);
        Ok(credential)
    }
}

#[async_trait]
impl TokenProvider for StravaTokenProvider {
    async fn get_token(&self) -> StatsResult<Credential> {
        let mut state = self.state.lock().await;

        if let Some(token) = state.token.as_ref().filter(|token| !token.will_expire_soon()) {
            return Ok(Credential::new(token.access_token.clone()));
        }

        self.request_new_token(&mut state).await
    }

    async fn refresh_token(&self) -> StatsResult<Credential> {
        let mut state = self.state.lock().await;
        state.token = None;
        self.request_new_token(&mut state).await
    }
}

/// Pages through `GET /athlete/activities`
pub struct StravaActivityFetcher {
    client: Client,
    api_base: String,
    per_page: u32,
    max_pages: Option<u32>,
    tokens: Arc<dyn TokenProvider>,
    retry: RetryPolicy,
}

impl StravaActivityFetcher {
    pub fn new(client: Client, api_base: impl Into<String>, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            client,
            api_base: api_base.into(),
            per_page: crate::constants::limits::DEFAULT_PER_PAGE,
            max_pages: None,
            tokens,
            retry: RetryPolicy::default(),
        }
    }

    pub fn from_config(config: &StravaConfig, client: Client, tokens: Arc<dyn TokenProvider>) -> Self {
        Self::new(client, &config.api_base, tokens)
            .with_per_page(config.per_page)
            .with_max_pages(config.max_pages)
            .with_retry_policy(RetryPolicy {
                max_auth_attempts: config.max_auth_attempts,
            })
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.max(1);
        self
    }

    pub fn with_max_pages(mut self, max_pages: Option<u32>) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn activities_url(&self) -> String {
        format!(
            "{}{}",
            self.api_base.trim_end_matches('/'),
            endpoints::ATHLETE_ACTIVITIES_PATH
        )
    }

    async fn fetch_page(&self, credential: &Credential, page: u32) -> StatsResult<Vec<Value>> {
        debug!(page, per_page = self.per_page, "Requesting activity page");

        let response = self
            .client
            .get(self.activities_url())
            .bearer_auth(credential.as_str())
            .query(&[("per_page", self.per_page), ("page", page)])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(StatsError::Auth(format!(
                "activity API rejected the access token on page {}",
                page
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StatsError::Fetch(format!(
                "page {} returned {}: {}",
                page, status, body
            )));
        }

        match response.json::<Value>().await? {
            Value::Array(records) => Ok(records),
            other => Err(StatsError::Fetch(format!(
                "page {} was not a JSON array: {}",
                page, other
            ))),
        }
    }
}

#[async_trait]
impl ActivityFetcher for StravaActivityFetcher {
    async fn fetch_all(&self, credential: &Credential) -> StatsResult<Vec<Value>> {
        let mut credential = credential.clone();
        let mut activities = Vec::new();
        let mut page = 1u32;
        let mut auth_failures = 0u32;

        loop {
            if let Some(max_pages) = self.max_pages {
                if page > max_pages {
                    warn!(max_pages, "Stopped paging at the configured page limit");
                    break;
                }
            }

            match self.fetch_page(&credential, page).await {
                Ok(records) => {
                    auth_failures = 0;
                    if records.is_empty() {
                        break;
                    }
                    AppLogger::log_fetch_page(page, records.len());
                    activities.extend(records);
                    page += 1;
                }
                Err(e) if e.is_auth() => {
                    auth_failures += 1;
                    if !self.retry.allows_retry(auth_failures) {
                        return Err(StatsError::Auth(format!(
                            "gave up after {} attempts: {}",
                            auth_failures, e
                        )));
                    }
                    warn!(page, attempt = auth_failures, "Access token rejected, refreshing");
                    credential = self.tokens.refresh_token().await?;
                }
                Err(e) => return Err(e),
            }
        }

        info!(activities = activities.len(), pages = page - 1, "Fetched all activities");
        Ok(activities)
    }
}
