//! Worker metrics collection.

use metrics::counter;

use fitcast_models::JobKind;

/// Metric name constants for consistency.
pub mod names {
    /// Jobs completed, by kind.
    pub const JOBS_COMPLETED_TOTAL: &str = "fitcast_jobs_completed_total";

    /// Jobs that ended in a terminal failure, by kind.
    pub const JOBS_FAILED_TOTAL: &str = "fitcast_jobs_failed_total";

    /// Failed attempts that were left for redelivery, by kind.
    pub const JOBS_RETRIED_TOTAL: &str = "fitcast_jobs_retried_total";
}

/// Record a completed job.
pub fn record_completed(kind: JobKind) {
    counter!(names::JOBS_COMPLETED_TOTAL, "kind" => kind.as_str()).increment(1);
}

/// Record a terminally failed job.
pub fn record_failed(kind: JobKind) {
    counter!(names::JOBS_FAILED_TOTAL, "kind" => kind.as_str()).increment(1);
}

/// Record a failed attempt that will be retried.
pub fn record_retry(kind: JobKind) {
    counter!(names::JOBS_RETRIED_TOTAL, "kind" => kind.as_str()).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names() {
        assert!(names::JOBS_COMPLETED_TOTAL.contains("completed"));
        assert!(names::JOBS_FAILED_TOTAL.contains("failed"));
        assert!(names::JOBS_RETRIED_TOTAL.contains("retried"));
    }
}
