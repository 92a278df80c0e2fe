//! Job workflows.
//!
//! The upload and delete paths both run inside the single worker slot.
//! Temp-file removal happens on every exit of the upload path and is a
//! no-op when the file is already gone.

use std::future::Future;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use fitcast_db::{Database, PublishedVideoWriter, WorkshopDirectory};
use fitcast_models::{NewPublishedVideo, PublishedVideo, Workshop};
use fitcast_queue::{DeleteJob, QueueJob, UploadJob};
use fitcast_youtube::{watch_url, UploadMetadata, VideoHost, YouTubeClient, YouTubeError};

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};

/// Everything a job needs, built once at bootstrap and injected.
pub struct ProcessingContext {
    pub config: WorkerConfig,
    pub host: Arc<dyn VideoHost>,
    pub workshops: Arc<dyn WorkshopDirectory>,
    pub videos: Arc<dyn PublishedVideoWriter>,
}

impl ProcessingContext {
    /// Assemble a context from explicit parts.
    pub fn new(
        config: WorkerConfig,
        host: Arc<dyn VideoHost>,
        workshops: Arc<dyn WorkshopDirectory>,
        videos: Arc<dyn PublishedVideoWriter>,
    ) -> Self {
        Self {
            config,
            host,
            workshops,
            videos,
        }
    }

    /// Build the production context from the environment.
    pub async fn from_env(config: WorkerConfig) -> WorkerResult<Self> {
        let host = YouTubeClient::from_env()?;
        let db = Database::from_env().await?;

        Ok(Self {
            config,
            host: Arc::new(host),
            workshops: Arc::new(db.workshops()),
            videos: Arc::new(db.videos()),
        })
    }
}

/// Result of a successfully processed job.
#[derive(Debug, Clone)]
pub enum JobOutcome {
    /// An upload job created this record.
    Published(PublishedVideo),
    /// A delete job removed this external asset.
    Removed { external_id: String },
}

impl JobOutcome {
    /// Playback URL for upload outcomes.
    pub fn result_url(&self) -> Option<String> {
        match self {
            JobOutcome::Published(video) => Some(video.url.clone()),
            JobOutcome::Removed { .. } => None,
        }
    }
}

/// Run one job to completion. Dispatch is exhaustive over the job kind.
pub async fn run_job(ctx: &ProcessingContext, job: &QueueJob) -> WorkerResult<JobOutcome> {
    match job {
        QueueJob::Upload(j) => process_upload(ctx, j).await,
        QueueJob::Delete(j) => process_delete(ctx, j).await,
    }
}

/// Upload workflow. The temp file is removed on both exits.
async fn process_upload(ctx: &ProcessingContext, job: &UploadJob) -> WorkerResult<JobOutcome> {
    match publish_upload(ctx, job).await {
        Ok(video) => Ok(JobOutcome::Published(video)),
        Err(e) => {
            if let Err(cleanup) = remove_temp_file(Path::new(&job.file_path)).await {
                warn!(
                    path = %job.file_path,
                    "Failed to remove temp file after job failure: {}", cleanup
                );
            }
            Err(e)
        }
    }
}

async fn publish_upload(ctx: &ProcessingContext, job: &UploadJob) -> WorkerResult<PublishedVideo> {
    // Credentials first: without a valid access token there is nothing to
    // retry against the host.
    let token = ctx.host.authenticate().await?;

    let workshop = ctx
        .workshops
        .find(job.workshop_id)
        .await?
        .ok_or(WorkerError::WorkshopNotFound(job.workshop_id))?;

    let metadata = UploadMetadata {
        title: job.title.clone(),
        description: compose_description(job, &workshop),
    };

    let external_id = with_timeout(
        ctx.config.publish_timeout,
        ctx.host
            .publish(&token, Path::new(&job.file_path), &metadata),
    )
    .await?;

    let url = watch_url(&external_id);

    // The host has the bytes; the local copy is no longer needed. A failure
    // here must not lose the upload, so the record is still written.
    if let Err(e) = remove_temp_file(Path::new(&job.file_path)).await {
        warn!(path = %job.file_path, "Failed to remove temp file: {}", e);
    }

    // The database is the last writer: rows only ever reference videos that
    // exist on the host.
    let video = ctx
        .videos
        .record_published(NewPublishedVideo {
            title: job.title.clone(),
            description: job.description.clone(),
            url,
            trainer_id: job.trainer_id,
            workshop_id: job.workshop_id,
            section_id: job.section_id,
        })
        .await?;

    Ok(video)
}

/// Delete workflow. No local file is involved.
async fn process_delete(ctx: &ProcessingContext, job: &DeleteJob) -> WorkerResult<JobOutcome> {
    let token = ctx.host.authenticate().await?;

    let external_id = fitcast_youtube::extract_video_id(&job.video_url)?;

    with_timeout(
        ctx.config.publish_timeout,
        ctx.host.unpublish(&token, &external_id),
    )
    .await?;

    Ok(JobOutcome::Removed { external_id })
}

/// Compose the host-side description from the job and its workshop.
fn compose_description(job: &UploadJob, workshop: &Workshop) -> String {
    match job.description.as_deref() {
        Some(d) if !d.is_empty() => format!("{}\n\nWorkshop: {}", d, workshop.title),
        _ => format!("Workshop: {}", workshop.title),
    }
}

/// Remove the local temp file. Safe to call when the file is already gone.
pub async fn remove_temp_file(path: &Path) -> std::io::Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            debug!(path = %path.display(), "Removed temp file");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Apply the configured publish timeout, when set.
async fn with_timeout<T, F>(limit: Option<Duration>, fut: F) -> WorkerResult<T>
where
    F: Future<Output = Result<T, YouTubeError>>,
{
    match limit {
        Some(d) => match tokio::time::timeout(d, fut).await {
            Ok(result) => result.map_err(WorkerError::from),
            Err(_) => Err(WorkerError::PublishTimeout(d.as_secs())),
        },
        None => fut.await.map_err(WorkerError::from),
    }
}
