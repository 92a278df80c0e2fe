//! Worker error types.

use thiserror::Error;

use fitcast_models::WorkshopId;
use fitcast_youtube::YouTubeError;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Job failed: {0}")]
    JobFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Workshop not found: {0}")]
    WorkshopNotFound(WorkshopId),

    #[error("Publish call exceeded {0}s timeout")]
    PublishTimeout(u64),

    #[error("Host error: {0}")]
    Host(#[from] YouTubeError),

    #[error("Database error: {0}")]
    Db(#[from] fitcast_db::DbError),

    #[error("Queue error: {0}")]
    Queue(#[from] fitcast_queue::QueueError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn job_failed(msg: impl Into<String>) -> Self {
        Self::JobFailed(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Check if error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            WorkerError::Host(e) => e.is_retryable(),
            WorkerError::Db(e) => e.is_retryable(),
            WorkerError::Queue(_) | WorkerError::Io(_) | WorkerError::PublishTimeout(_) => true,
            _ => false,
        }
    }

    /// Check if this is a permanent failure that must NOT be retried.
    ///
    /// Retrying cannot help: the input or the operator configuration has
    /// to change first.
    pub fn is_permanent_failure(&self) -> bool {
        match self {
            WorkerError::ConfigError(_) | WorkerError::WorkshopNotFound(_) => true,
            WorkerError::Host(e) => {
                matches!(
                    e,
                    YouTubeError::ConfigError(_)
                        | YouTubeError::QuotaExceeded(_)
                        | YouTubeError::InvalidUrl(_)
                )
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_is_permanent() {
        let err = WorkerError::Host(YouTubeError::config_error("YOUTUBE_REFRESH_TOKEN not set"));
        assert!(err.is_permanent_failure());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_workshop_not_found_is_permanent() {
        let err = WorkerError::WorkshopNotFound(WorkshopId(42));
        assert!(err.is_permanent_failure());
    }

    #[test]
    fn test_upload_failure_is_retryable() {
        let err = WorkerError::Host(YouTubeError::upload_failed("503: backend unavailable"));
        assert!(err.is_retryable());
        assert!(!err.is_permanent_failure());
    }

    #[test]
    fn test_timeout_is_retryable() {
        let err = WorkerError::PublishTimeout(120);
        assert!(err.is_retryable());
    }
}
