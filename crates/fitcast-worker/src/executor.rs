//! Job executor.
//!
//! One consumer, one job in flight. The queue's consumer group already
//! serializes the waiting -> active hand-off; processing jobs inline in
//! the loop keeps the external host at a single concurrent upload and the
//! OAuth credential state unshared.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use fitcast_queue::{JobQueue, QueueJob};

use crate::config::WorkerConfig;
use crate::error::WorkerResult;
use crate::logging::JobLogger;
use crate::metrics;
use crate::processor::{self, ProcessingContext};

/// Job executor that processes jobs from the queue.
pub struct JobExecutor {
    config: WorkerConfig,
    queue: Arc<JobQueue>,
    ctx: Arc<ProcessingContext>,
    shutdown: watch::Sender<bool>,
    consumer_name: String,
}

impl JobExecutor {
    /// Create a new job executor.
    pub fn new(config: WorkerConfig, queue: Arc<JobQueue>, ctx: Arc<ProcessingContext>) -> Self {
        let (shutdown, _) = watch::channel(false);
        let consumer_name = format!("worker-{}", Uuid::new_v4());

        Self {
            config,
            queue,
            ctx,
            shutdown,
            consumer_name,
        }
    }

    /// Signal shutdown. The in-flight job, if any, finishes first.
    pub fn shutdown(&self) {
        let _ = self.shutdown.send(true);
    }

    /// Run the consume loop until shutdown.
    pub async fn run(&self) -> WorkerResult<()> {
        info!("Starting job executor '{}'", self.consumer_name);

        self.queue.init().await?;

        let mut shutdown_rx = self.shutdown.subscribe();
        let mut claim_timer = tokio::time::interval(self.config.claim_interval);
        // The first tick fires immediately: claim jobs orphaned by an
        // unclean shutdown before consuming anything new.
        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("Shutdown signal received, stopping executor");
                        break;
                    }
                }
                _ = claim_timer.tick() => {
                    self.claim_orphaned_jobs().await;
                }
                result = self.queue.consume(
                    &self.consumer_name,
                    self.config.poll_block.as_millis() as u64,
                    1,
                ) => {
                    match result {
                        Ok(jobs) => {
                            for (message_id, job) in jobs {
                                self.execute_job(message_id, job).await;
                            }
                        }
                        Err(e) => {
                            error!("Error consuming jobs: {}", e);
                            // Back off on error
                            tokio::time::sleep(Duration::from_secs(5)).await;
                        }
                    }
                }
            }
        }

        info!("Job executor stopped");
        Ok(())
    }

    /// Re-claim jobs a crashed worker left pending past the idle threshold.
    async fn claim_orphaned_jobs(&self) {
        match self
            .queue
            .claim_pending(
                &self.consumer_name,
                self.config.claim_min_idle.as_millis() as u64,
                5,
            )
            .await
        {
            Ok(jobs) if !jobs.is_empty() => {
                info!("Claimed {} pending jobs", jobs.len());
                for (message_id, job) in jobs {
                    self.execute_job(message_id, job).await;
                }
            }
            Ok(_) => {}
            Err(e) => {
                warn!("Failed to claim pending jobs: {}", e);
            }
        }
    }

    /// Execute a single job with retry and DLQ handling.
    async fn execute_job(&self, message_id: String, job: QueueJob) {
        let job_id = job.job_id().clone();
        let kind = job.kind();
        let logger = JobLogger::new(&job_id, kind.as_str());
        let status = self.queue.status();

        if let Err(e) = status.mark_active(&job_id, kind).await {
            warn!(job_id = %job_id, "Failed to mark job active: {}", e);
        }
        logger.log_start("processing");

        let result = processor::run_job(&self.ctx, &job).await;

        match result {
            Ok(outcome) => {
                logger.log_completion("done");
                metrics::record_completed(kind);

                if let Err(e) = status
                    .mark_completed(&job_id, kind, outcome.result_url())
                    .await
                {
                    warn!(job_id = %job_id, "Failed to record completion: {}", e);
                }
                if let Err(e) = self.queue.ack(&message_id).await {
                    error!(job_id = %job_id, "Failed to ack job: {}", e);
                }
            }
            Err(e) => {
                logger.log_error(&e.to_string());

                let retries = if e.is_permanent_failure() {
                    // Straight to the DLQ, retrying cannot change the outcome
                    u32::MAX
                } else {
                    self.queue
                        .increment_retry(&message_id)
                        .await
                        .unwrap_or(u32::MAX)
                };

                if retries >= self.queue.max_retries() {
                    metrics::record_failed(kind);
                    if let Err(se) = status.mark_failed(&job_id, kind, &e.to_string()).await {
                        warn!(job_id = %job_id, "Failed to record failure: {}", se);
                    }
                    if let Err(de) = self.queue.dlq(&message_id, &job, &e.to_string()).await {
                        error!(job_id = %job_id, "Failed to move job to DLQ: {}", de);
                    }
                } else {
                    metrics::record_retry(kind);
                    debug!(
                        job_id = %job_id,
                        attempt = retries,
                        "Job left pending for redelivery"
                    );
                    if let Err(se) = status.mark_retrying(&job_id, kind, &e.to_string()).await {
                        warn!(job_id = %job_id, "Failed to record retry: {}", se);
                    }
                    // The message stays pending; the claim scan redelivers
                    // it after the idle threshold.
                }
            }
        }
    }
}
