//! OAuth2 credential handling.
//!
//! The client holds one long-lived refresh token (supplied via the process
//! environment) and mints a short-lived access token from it before every
//! job. The worker runs unattended for long stretches, so access tokens are
//! never reused across jobs.

use std::time::{Duration, Instant};

use serde::Deserialize;

use crate::error::{YouTubeError, YouTubeResult};

/// Default OAuth2 token endpoint.
const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Conservative token TTL when the endpoint does not report one.
/// OAuth tokens are typically valid for 60 minutes.
const TOKEN_DEFAULT_TTL: Duration = Duration::from_secs(50 * 60);

/// OAuth2 client configuration.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    /// OAuth client ID
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
    /// Long-lived refresh token
    pub refresh_token: String,
    /// Token endpoint URL
    pub token_url: String,
}

impl OAuthConfig {
    /// Read configuration from environment variables.
    ///
    /// Missing values are tolerated here; [`OAuthConfig::validate`] runs
    /// before the first network call of every job, so an unset refresh
    /// token fails the job fast instead of preventing worker startup.
    pub fn from_env() -> Self {
        Self {
            client_id: std::env::var("YOUTUBE_CLIENT_ID").unwrap_or_default(),
            client_secret: std::env::var("YOUTUBE_CLIENT_SECRET").unwrap_or_default(),
            refresh_token: std::env::var("YOUTUBE_REFRESH_TOKEN").unwrap_or_default(),
            token_url: std::env::var("OAUTH_TOKEN_URL")
                .unwrap_or_else(|_| DEFAULT_TOKEN_URL.to_string()),
        }
    }

    /// Check that every credential needed to mint an access token is present.
    pub fn validate(&self) -> YouTubeResult<()> {
        if self.client_id.is_empty() {
            return Err(YouTubeError::config_error("YOUTUBE_CLIENT_ID not set"));
        }
        if self.client_secret.is_empty() {
            return Err(YouTubeError::config_error("YOUTUBE_CLIENT_SECRET not set"));
        }
        if self.refresh_token.is_empty() {
            return Err(YouTubeError::config_error("YOUTUBE_REFRESH_TOKEN not set"));
        }
        Ok(())
    }
}

/// Short-lived access token minted for a single job.
#[derive(Debug, Clone)]
pub struct AccessToken {
    secret: String,
    expires_at: Instant,
}

impl AccessToken {
    /// Wrap a freshly minted bearer secret.
    pub fn new(secret: String, ttl: Option<Duration>) -> Self {
        Self {
            secret,
            expires_at: Instant::now() + ttl.unwrap_or(TOKEN_DEFAULT_TTL),
        }
    }

    /// The bearer secret.
    pub fn as_str(&self) -> &str {
        &self.secret
    }

    /// Whether the token has outlived its reported TTL.
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Token endpoint response body.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

impl TokenResponse {
    pub(crate) fn into_token(self) -> AccessToken {
        AccessToken::new(self.access_token, self.expires_in.map(Duration::from_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_missing_refresh_token() {
        let config = OAuthConfig {
            client_id: "id".into(),
            client_secret: "secret".into(),
            refresh_token: String::new(),
            token_url: DEFAULT_TOKEN_URL.into(),
        };

        let err = config.validate().unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("YOUTUBE_REFRESH_TOKEN"));
    }

    #[test]
    fn test_token_expiry() {
        let token = AccessToken::new("abc".into(), Some(Duration::from_secs(0)));
        assert!(token.is_expired());

        let token = AccessToken::new("abc".into(), None);
        assert!(!token.is_expired());
    }
}
