//! Per-job status records in Redis.
//!
//! The queue stream carries the payload; these records carry the
//! operationally inspectable side of a job (state, attempts, error,
//! timestamps). Records expire after a retention window so the store
//! cannot grow without bound.

use redis::AsyncCommands;
use tracing::debug;

use fitcast_models::{JobId, JobKind, JobRecord};

use crate::error::QueueResult;

/// Retention for job records (7 days).
pub const JOB_RECORD_TTL_SECS: u64 = 7 * 24 * 3600;

fn record_key(job_id: &JobId) -> String {
    format!("fitcast:job:{}", job_id)
}

/// Store for per-job status snapshots.
#[derive(Clone)]
pub struct StatusStore {
    client: redis::Client,
}

impl StatusStore {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }

    /// Persist a record, refreshing its retention window.
    pub async fn put(&self, record: &JobRecord) -> QueueResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let payload = serde_json::to_string(record)?;
        conn.set_ex::<_, _, ()>(record_key(&record.id), payload, JOB_RECORD_TTL_SECS)
            .await?;
        debug!(job_id = %record.id, state = %record.state, "Stored job record");
        Ok(())
    }

    /// Fetch a record, if it still exists.
    pub async fn fetch(&self, job_id: &JobId) -> QueueResult<Option<JobRecord>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let payload: Option<String> = conn.get(record_key(job_id)).await?;
        match payload {
            Some(p) => Ok(Some(serde_json::from_str(&p)?)),
            None => Ok(None),
        }
    }

    async fn fetch_or_new(&self, job_id: &JobId, kind: JobKind) -> QueueResult<JobRecord> {
        Ok(self
            .fetch(job_id)
            .await?
            .unwrap_or_else(|| JobRecord::new(job_id.clone(), kind)))
    }

    /// Transition a job to `active`, bumping its attempt count.
    pub async fn mark_active(&self, job_id: &JobId, kind: JobKind) -> QueueResult<JobRecord> {
        let record = self.fetch_or_new(job_id, kind).await?.start();
        self.put(&record).await?;
        Ok(record)
    }

    /// Transition a job to `completed`.
    pub async fn mark_completed(
        &self,
        job_id: &JobId,
        kind: JobKind,
        result_url: Option<String>,
    ) -> QueueResult<JobRecord> {
        let record = self.fetch_or_new(job_id, kind).await?.complete(result_url);
        self.put(&record).await?;
        Ok(record)
    }

    /// Transition a job to `failed`, recording the error.
    pub async fn mark_failed(
        &self,
        job_id: &JobId,
        kind: JobKind,
        error: &str,
    ) -> QueueResult<JobRecord> {
        let record = self.fetch_or_new(job_id, kind).await?.fail(error);
        self.put(&record).await?;
        Ok(record)
    }

    /// Put a failed job back to `waiting` ahead of a redelivery.
    pub async fn mark_waiting(&self, job_id: &JobId, kind: JobKind) -> QueueResult<JobRecord> {
        let record = self.fetch_or_new(job_id, kind).await?.requeue();
        self.put(&record).await?;
        Ok(record)
    }

    /// Record a failed attempt for a job that will be redelivered: the
    /// error stays visible while the state returns to `waiting`.
    pub async fn mark_retrying(
        &self,
        job_id: &JobId,
        kind: JobKind,
        error: &str,
    ) -> QueueResult<JobRecord> {
        let record = self.fetch_or_new(job_id, kind).await?.fail(error).requeue();
        self.put(&record).await?;
        Ok(record)
    }
}
