//! Publishing client error types.

use thiserror::Error;

/// Result type for publishing operations.
pub type YouTubeResult<T> = Result<T, YouTubeError>;

/// Errors that can occur while talking to the video host.
#[derive(Debug, Error)]
pub enum YouTubeError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Video not found: {0}")]
    NotFound(String),

    #[error("Invalid video URL: {0}")]
    InvalidUrl(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl YouTubeError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn auth_failed(msg: impl Into<String>) -> Self {
        Self::AuthFailed(msg.into())
    }

    pub fn upload_failed(msg: impl Into<String>) -> Self {
        Self::UploadFailed(msg.into())
    }

    /// Check if error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            YouTubeError::Network(_)
                | YouTubeError::UploadFailed(_)
                | YouTubeError::DeleteFailed(_)
                | YouTubeError::Io(_)
        )
    }

    /// Check if error is a configuration problem that operator action must fix.
    pub fn is_config(&self) -> bool {
        matches!(self, YouTubeError::ConfigError(_))
    }
}
