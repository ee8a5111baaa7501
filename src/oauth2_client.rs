// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! OAuth2 tokens and the Strava token grants

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuth2Token {
    pub access_token: String,
    pub token_type: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
}

impl OAuth2Token {
    pub fn is_expired(&self) -> bool {
        if let Some(expires_at) = self.expires_at {
            expires_at <= Utc::now()
        } else {
            false
        }
    }

    /// Expired, or expiring within five minutes
    pub fn will_expire_soon(&self) -> bool {
        if let Some(expires_at) = self.expires_at {
            expires_at <= Utc::now() + Duration::minutes(5)
        } else {
            false
        }
    }
}

// Strava-specific OAuth2 flows
pub mod strava {
    use super::*;
    use crate::errors::{StatsError, StatsResult};
    use crate::logging::AppLogger;

    #[derive(Debug, Deserialize)]
    pub struct StravaTokenResponse {
        #[serde(default = "default_token_type")]
        pub token_type: String,
        pub expires_at: Option<i64>,
        pub expires_in: Option<i64>,
        pub refresh_token: Option<String>,
        pub access_token: String,
        pub athlete: Option<StravaAthleteSummary>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct StravaAthleteSummary {
        pub id: i64,
        pub username: Option<String>,
        pub firstname: Option<String>,
        pub lastname: Option<String>,
    }

    fn default_token_type() -> String {
        "Bearer".to_string()
    }

    impl From<StravaTokenResponse> for OAuth2Token {
        fn from(response: StravaTokenResponse) -> Self {
            let expires_at = response
                .expires_at
                .and_then(|secs| DateTime::from_timestamp(secs, 0))
                .or_else(|| response.expires_in.map(|secs| Utc::now() + Duration::seconds(secs)));

            OAuth2Token {
                access_token: response.access_token,
                token_type: response.token_type,
                expires_at,
                refresh_token: response.refresh_token,
                scope: None,
            }
        }
    }

    /// Browser URL that starts the authorization-code grant
    pub fn authorization_url(
        auth_url: &str,
        client_id: &str,
        redirect_uri: &str,
        state: &str,
    ) -> StatsResult<String> {
        let mut url = url::Url::parse(auth_url)
            .map_err(|e| StatsError::Config(format!("Invalid auth URL {}: {}", auth_url, e)))?;

        url.query_pairs_mut()
            .append_pair("client_id", client_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("approval_prompt", "auto")
            .append_pair("scope", "read,activity:read_all")
            .append_pair("state", state);

        Ok(url.to_string())
    }

    pub async fn exchange_strava_code(
        client: &reqwest::Client,
        token_url: &str,
        client_id: &str,
        client_secret: &str,
        code: &str,
    ) -> StatsResult<(OAuth2Token, Option<StravaAthleteSummary>)> {
        let params = [
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("code", code),
            ("grant_type", "authorization_code"),
        ];

        let mut response = request_token(client, token_url, &params).await?;
        let athlete = response.athlete.take();

        Ok((response.into(), athlete))
    }

    pub async fn refresh_strava_token(
        client: &reqwest::Client,
        token_url: &str,
        client_id: &str,
        client_secret: &str,
        refresh_token: &str,
    ) -> StatsResult<OAuth2Token> {
        let params = [
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        Ok(request_token(client, token_url, &params).await?.into())
    }

    async fn request_token(
        client: &reqwest::Client,
        token_url: &str,
        params: &[(&str, &str)],
    ) -> StatsResult<StravaTokenResponse> {
        let grant = params
            .iter()
            .find(|(key, _)| *key == "grant_type")
            .map(|(_, value)| *value)
            .unwrap_or("unknown");

        let response = client.post(token_url).form(params).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            AppLogger::log_token_refresh(grant, false);
            return Err(StatsError::Auth(format!(
                "token endpoint returned {}: {}",
                status, body
            )));
        }

        let token = response
            .json::<StravaTokenResponse>()
            .await
            .map_err(|e| StatsError::Auth(format!("unreadable token response: {}", e)))?;

        AppLogger::log_token_refresh(grant, true);
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::strava::*;
    use super::*;

    #[test]
    fn test_token_expiry() {
        let mut token = OAuth2Token {
            access_token: "abc".to_string(),
            token_type: "Bearer".to_string(),
            expires_at: None,
            refresh_token: None,
            scope: None,
        };
        assert!(!token.is_expired());
        assert!(!token.will_expire_soon());

        token.expires_at = Some(Utc::now() + Duration::minutes(2));
        assert!(!token.is_expired());
        assert!(token.will_expire_soon());

        token.expires_at = Some(Utc::now() - Duration::seconds(1));
        assert!(token.is_expired());
    }

    #[test]
    fn test_token_from_strava_response() {
        let response: StravaTokenResponse = serde_json::from_value(serde_json::json!({
            "token_type": "Bearer",
            "expires_at": 1_700_000_000,
            "expires_in": 21600,
            "refresh_token": "rotated",
            "access_token": "fresh"
        }))
        .unwrap();

        let token: OAuth2Token = response.into();
        assert_eq!(token.access_token, "fresh");
        assert_eq!(token.refresh_token.as_deref(), Some("rotated"));
        assert_eq!(token.expires_at.unwrap().timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_authorization_url() {
        let url = authorization_url(
            "https://www.strava.com/oauth/authorize",
            "110708",
            "http://localhost/exchange_token",
            "xyz",
        )
        .unwrap();

        assert!(url.starts_with("https://www.strava.com/oauth/authorize?"));
        assert!(url.contains("client_id=110708"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("scope=read%2Cactivity%3Aread_all"));
        assert!(url.contains("state=xyz"));

        assert!(authorization_url("not a url", "1", "http://localhost", "s").is_err());
    }
}
