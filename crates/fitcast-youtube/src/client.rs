//! YouTube Data API client.

use std::path::Path;

use async_trait::async_trait;
use reqwest::header;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

use crate::auth::{AccessToken, OAuthConfig, TokenResponse};
use crate::error::{YouTubeError, YouTubeResult};

const DEFAULT_API_BASE: &str = "https://www.googleapis.com";
const DEFAULT_UPLOAD_BASE: &str = "https://www.googleapis.com/upload";

/// Category 17 is "Sports" in the YouTube taxonomy.
const VIDEO_CATEGORY_ID: &str = "17";

/// Metadata attached to a published video.
#[derive(Debug, Clone)]
pub struct UploadMetadata {
    /// Video title
    pub title: String,
    /// Composed description
    pub description: String,
}

/// The seam the worker publishes through.
///
/// `authenticate` must be called per job; the returned credential is only
/// meant to live for that job's operations.
#[async_trait]
pub trait VideoHost: Send + Sync {
    /// Mint a short-lived access credential from the refresh credential.
    async fn authenticate(&self) -> YouTubeResult<AccessToken>;

    /// Stream a local file to the host. Returns the external video ID.
    async fn publish(
        &self,
        token: &AccessToken,
        file_path: &Path,
        metadata: &UploadMetadata,
    ) -> YouTubeResult<String>;

    /// Remove a previously published video by its external ID.
    async fn unpublish(&self, token: &AccessToken, external_id: &str) -> YouTubeResult<()>;
}

/// YouTube Data API v3 client.
#[derive(Clone)]
pub struct YouTubeClient {
    http: reqwest::Client,
    oauth: OAuthConfig,
    api_base: String,
    upload_base: String,
}

impl YouTubeClient {
    /// Create a new client.
    pub fn new(oauth: OAuthConfig) -> YouTubeResult<Self> {
        let api_base =
            std::env::var("YOUTUBE_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        let upload_base = std::env::var("YOUTUBE_UPLOAD_BASE")
            .unwrap_or_else(|_| DEFAULT_UPLOAD_BASE.to_string());
        Self::with_endpoints(oauth, api_base, upload_base)
    }

    /// Create a client against explicit endpoints (used by tests).
    pub fn with_endpoints(
        oauth: OAuthConfig,
        api_base: impl Into<String>,
        upload_base: impl Into<String>,
    ) -> YouTubeResult<Self> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            oauth,
            api_base: api_base.into(),
            upload_base: upload_base.into(),
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> YouTubeResult<Self> {
        Self::new(OAuthConfig::from_env())
    }

    /// Map a non-success host response to an error.
    fn host_error(operation: &str, status: StatusCode, body: &str) -> YouTubeError {
        match status {
            StatusCode::UNAUTHORIZED => {
                YouTubeError::auth_failed(format!("{}: {}", operation, body))
            }
            StatusCode::FORBIDDEN if body.contains("quota") => {
                YouTubeError::QuotaExceeded(format!("{}: {}", operation, body))
            }
            StatusCode::NOT_FOUND => YouTubeError::NotFound(format!("{}: {}", operation, body)),
            _ if operation == "delete" => {
                YouTubeError::DeleteFailed(format!("{}: {}", status, body))
            }
            _ => YouTubeError::UploadFailed(format!("{}: {}", status, body)),
        }
    }
}

/// Uploaded video resource, as returned by the final upload request.
#[derive(Debug, Deserialize)]
struct VideoResource {
    id: String,
}

#[async_trait]
impl VideoHost for YouTubeClient {
    async fn authenticate(&self) -> YouTubeResult<AccessToken> {
        // Configuration is checked before any network traffic so a missing
        // refresh credential fails the job immediately.
        self.oauth.validate()?;

        let response = self
            .http
            .post(&self.oauth.token_url)
            .form(&[
                ("client_id", self.oauth.client_id.as_str()),
                ("client_secret", self.oauth.client_secret.as_str()),
                ("refresh_token", self.oauth.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(YouTubeError::auth_failed(format!(
                "token refresh returned {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = response.json().await?;
        debug!("Minted access token from refresh credential");
        Ok(token.into_token())
    }

    async fn publish(
        &self,
        token: &AccessToken,
        file_path: &Path,
        metadata: &UploadMetadata,
    ) -> YouTubeResult<String> {
        debug!("Opening resumable upload session for {:?}", file_path);

        // Step 1: open a resumable session with the video metadata.
        let session_response = self
            .http
            .post(format!(
                "{}/youtube/v3/videos?uploadType=resumable&part=snippet,status",
                self.upload_base
            ))
            .bearer_auth(token.as_str())
            .header("X-Upload-Content-Type", "video/*")
            .json(&json!({
                "snippet": {
                    "title": metadata.title,
                    "description": metadata.description,
                    "categoryId": VIDEO_CATEGORY_ID,
                },
                "status": {
                    "privacyStatus": "unlisted",
                },
            }))
            .send()
            .await?;

        let status = session_response.status();
        if !status.is_success() {
            let body = session_response.text().await.unwrap_or_default();
            return Err(Self::host_error("upload", status, &body));
        }

        let session_url = session_response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                YouTubeError::upload_failed("host did not return a resumable session URI")
            })?;

        // Step 2: stream the file as the request body.
        let file = tokio::fs::File::open(file_path).await?;
        let file_len = file.metadata().await?.len();
        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));

        let upload_response = self
            .http
            .put(&session_url)
            .bearer_auth(token.as_str())
            .header(header::CONTENT_LENGTH, file_len)
            .header(header::CONTENT_TYPE, "video/*")
            .body(body)
            .send()
            .await?;

        let status = upload_response.status();
        if !status.is_success() {
            let body = upload_response.text().await.unwrap_or_default();
            return Err(Self::host_error("upload", status, &body));
        }

        let resource: VideoResource = upload_response.json().await?;
        info!(
            external_id = %resource.id,
            bytes = file_len,
            "Published video to host"
        );
        Ok(resource.id)
    }

    async fn unpublish(&self, token: &AccessToken, external_id: &str) -> YouTubeResult<()> {
        let response = self
            .http
            .delete(format!("{}/youtube/v3/videos", self.api_base))
            .query(&[("id", external_id)])
            .bearer_auth(token.as_str())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::host_error("delete", status, &body));
        }

        info!(external_id = %external_id, "Removed video from host");
        Ok(())
    }
}
