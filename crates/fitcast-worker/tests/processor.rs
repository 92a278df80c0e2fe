//! Workflow tests against in-process fakes.
//!
//! The fakes implement the same seams the production context wires up
//! (host, workshop directory, reconciliation writer), so every scenario
//! runs without Redis, Postgres or the network.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use fitcast_db::{DbResult, PublishedVideoWriter, WorkshopDirectory};
use fitcast_models::{
    NewPublishedVideo, PublishedVideo, TrainerId, VideoId, Workshop, WorkshopId,
};
use fitcast_queue::{DeleteJob, QueueJob, UploadJob};
use fitcast_worker::{JobOutcome, ProcessingContext, WorkerConfig, WorkerError};
use fitcast_youtube::{AccessToken, UploadMetadata, VideoHost, YouTubeError, YouTubeResult};

// ============================================================================
// Fakes
// ============================================================================

#[derive(Default)]
struct FakeHost {
    /// Return a configuration error from authenticate()
    missing_credentials: bool,
    /// Error every publish attempt
    fail_publish: Option<String>,
    /// Artificial publish latency
    publish_delay: Option<Duration>,

    auth_calls: AtomicUsize,
    publish_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    published: Mutex<Vec<(UploadMetadata, PathBuf)>>,
    publish_windows: Mutex<Vec<(Instant, Instant)>>,
    deleted: Mutex<Vec<String>>,
}

#[async_trait]
impl VideoHost for FakeHost {
    async fn authenticate(&self) -> YouTubeResult<AccessToken> {
        if self.missing_credentials {
            return Err(YouTubeError::config_error("YOUTUBE_REFRESH_TOKEN not set"));
        }
        self.auth_calls.fetch_add(1, Ordering::SeqCst);
        Ok(AccessToken::new("test-token".into(), None))
    }

    async fn publish(
        &self,
        _token: &AccessToken,
        file_path: &Path,
        metadata: &UploadMetadata,
    ) -> YouTubeResult<String> {
        self.publish_calls.fetch_add(1, Ordering::SeqCst);

        let now_in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight
            .fetch_max(now_in_flight, Ordering::SeqCst);
        let started = Instant::now();

        if let Some(delay) = self.publish_delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.publish_windows
            .lock()
            .unwrap()
            .push((started, Instant::now()));

        if let Some(msg) = &self.fail_publish {
            return Err(YouTubeError::upload_failed(msg.clone()));
        }

        if !file_path.exists() {
            return Err(YouTubeError::upload_failed("source file missing"));
        }

        self.published
            .lock()
            .unwrap()
            .push((metadata.clone(), file_path.to_path_buf()));
        Ok("dQw4w9WgXcQ".to_string())
    }

    async fn unpublish(&self, _token: &AccessToken, external_id: &str) -> YouTubeResult<()> {
        self.deleted.lock().unwrap().push(external_id.to_string());
        Ok(())
    }
}

struct FakeWorkshops {
    workshops: HashMap<i64, Workshop>,
}

impl FakeWorkshops {
    fn with(workshops: Vec<Workshop>) -> Self {
        Self {
            workshops: workshops.into_iter().map(|w| (w.id.0, w)).collect(),
        }
    }
}

#[async_trait]
impl WorkshopDirectory for FakeWorkshops {
    async fn find(&self, id: WorkshopId) -> DbResult<Option<Workshop>> {
        Ok(self.workshops.get(&id.0).cloned())
    }
}

#[derive(Default)]
struct FakeVideos {
    records: Mutex<Vec<PublishedVideo>>,
}

#[async_trait]
impl PublishedVideoWriter for FakeVideos {
    async fn record_published(&self, video: NewPublishedVideo) -> DbResult<PublishedVideo> {
        let record = PublishedVideo {
            id: VideoId::new(),
            title: video.title,
            description: video.description,
            url: video.url,
            trainer_id: video.trainer_id,
            workshop_id: video.workshop_id,
            section_id: video.section_id,
            uploaded_at: chrono::Utc::now(),
        };
        self.records.lock().unwrap().push(record.clone());
        Ok(record)
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn mobility_workshop() -> Workshop {
    Workshop {
        id: WorkshopId(7),
        title: "Mobility 101".into(),
        trainer_id: TrainerId(3),
    }
}

fn context_with(host: Arc<FakeHost>, videos: Arc<FakeVideos>) -> ProcessingContext {
    context_with_config(WorkerConfig::default(), host, videos)
}

fn context_with_config(
    config: WorkerConfig,
    host: Arc<FakeHost>,
    videos: Arc<FakeVideos>,
) -> ProcessingContext {
    ProcessingContext::new(
        config,
        host,
        Arc::new(FakeWorkshops::with(vec![mobility_workshop()])),
        videos,
    )
}

async fn temp_upload_file(dir: &tempfile::TempDir, name: &str) -> PathBuf {
    let path = dir.path().join(name);
    tokio::fs::write(&path, b"fake video bytes").await.unwrap();
    path
}

fn upload_job(path: &Path) -> UploadJob {
    UploadJob::new(
        "Session one",
        WorkshopId(7),
        TrainerId(3),
        path.to_str().unwrap(),
    )
    .with_description("Warmup and basics")
}

// ============================================================================
// Scenarios
// ============================================================================

/// Scenario A: valid workshop, real file -> published record, temp file gone.
#[tokio::test]
async fn test_upload_happy_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = temp_upload_file(&dir, "clip.mp4").await;

    let host = Arc::new(FakeHost::default());
    let videos = Arc::new(FakeVideos::default());
    let ctx = context_with(Arc::clone(&host), Arc::clone(&videos));

    let job = QueueJob::Upload(upload_job(&path));
    let outcome = fitcast_worker::processor::run_job(&ctx, &job)
        .await
        .expect("job succeeds");

    let video = match outcome {
        JobOutcome::Published(v) => v,
        other => panic!("unexpected outcome: {:?}", other),
    };
    assert_eq!(video.title, "Session one");
    assert_eq!(video.url, "https://www.youtube.com/watch?v=dQw4w9WgXcQ");

    // Temp file is gone
    assert!(!path.exists());

    // Exactly one record exists, referencing the returned URL
    let records = videos.records.lock().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].url, video.url);
    assert_eq!(records[0].workshop_id, WorkshopId(7));

    // The composed description carries the workshop title
    let published = host.published.lock().unwrap();
    assert_eq!(published.len(), 1);
    assert_eq!(
        published[0].0.description,
        "Warmup and basics\n\nWorkshop: Mobility 101"
    );
}

/// Scenario B: dangling workshop reference -> failed, cleaned up, no record.
#[tokio::test]
async fn test_upload_workshop_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let path = temp_upload_file(&dir, "clip.mp4").await;

    let host = Arc::new(FakeHost::default());
    let videos = Arc::new(FakeVideos::default());
    let ctx = context_with(Arc::clone(&host), Arc::clone(&videos));

    let mut job = upload_job(&path);
    job.workshop_id = WorkshopId(999);

    let err = fitcast_worker::processor::run_job(&ctx, &QueueJob::Upload(job))
        .await
        .unwrap_err();

    assert!(matches!(err, WorkerError::WorkshopNotFound(WorkshopId(999))));
    assert!(err.is_permanent_failure());
    assert!(err.to_string().contains("Workshop not found"));

    // Temp file removed, nothing published, nothing recorded
    assert!(!path.exists());
    assert_eq!(host.publish_calls.load(Ordering::SeqCst), 0);
    assert!(videos.records.lock().unwrap().is_empty());
}

/// Scenario C: refresh credential unset -> fails before any host traffic.
#[tokio::test]
async fn test_upload_missing_credentials() {
    let dir = tempfile::tempdir().unwrap();
    let path = temp_upload_file(&dir, "clip.mp4").await;

    let host = Arc::new(FakeHost {
        missing_credentials: true,
        ..FakeHost::default()
    });
    let videos = Arc::new(FakeVideos::default());
    let ctx = context_with(Arc::clone(&host), Arc::clone(&videos));

    let job = QueueJob::Upload(upload_job(&path));
    let err = fitcast_worker::processor::run_job(&ctx, &job)
        .await
        .unwrap_err();

    assert!(err.is_permanent_failure());
    assert!(err.to_string().contains("YOUTUBE_REFRESH_TOKEN"));

    // No upload was attempted, the temp file is still cleaned up
    assert_eq!(host.publish_calls.load(Ordering::SeqCst), 0);
    assert!(!path.exists());
    assert!(videos.records.lock().unwrap().is_empty());
}

/// Scenario D: back-to-back jobs run strictly one after the other.
#[tokio::test]
async fn test_uploads_are_sequential() {
    let dir = tempfile::tempdir().unwrap();
    let first = temp_upload_file(&dir, "first.mp4").await;
    let second = temp_upload_file(&dir, "second.mp4").await;

    let host = Arc::new(FakeHost {
        publish_delay: Some(Duration::from_millis(25)),
        ..FakeHost::default()
    });
    let videos = Arc::new(FakeVideos::default());
    let ctx = context_with(Arc::clone(&host), Arc::clone(&videos));

    for path in [&first, &second] {
        fitcast_worker::processor::run_job(&ctx, &QueueJob::Upload(upload_job(path)))
            .await
            .expect("job succeeds");
    }

    assert_eq!(host.max_in_flight.load(Ordering::SeqCst), 1);

    let windows = host.publish_windows.lock().unwrap();
    assert_eq!(windows.len(), 2);
    // The second publish starts no earlier than the first one ends
    assert!(windows[1].0 >= windows[0].1);
}

/// Scenario E: delete job invokes the host's delete exactly once.
#[tokio::test]
async fn test_delete_invokes_unpublish() {
    let host = Arc::new(FakeHost::default());
    let videos = Arc::new(FakeVideos::default());
    let ctx = context_with(Arc::clone(&host), Arc::clone(&videos));

    let job = DeleteJob::new("https://www.youtube.com/watch?v=dQw4w9WgXcQ", TrainerId(3));
    let outcome = fitcast_worker::processor::run_job(&ctx, &QueueJob::Delete(job))
        .await
        .expect("job succeeds");

    assert!(matches!(
        outcome,
        JobOutcome::Removed { ref external_id } if external_id.as_str() == "dQw4w9WgXcQ"
    ));

    let deleted = host.deleted.lock().unwrap();
    assert_eq!(deleted.as_slice(), ["dQw4w9WgXcQ"]);
}

/// A host rejection still removes the temp file and writes no record.
#[tokio::test]
async fn test_upload_host_failure_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let path = temp_upload_file(&dir, "clip.mp4").await;

    let host = Arc::new(FakeHost {
        fail_publish: Some("500: backend unavailable".into()),
        ..FakeHost::default()
    });
    let videos = Arc::new(FakeVideos::default());
    let ctx = context_with(Arc::clone(&host), Arc::clone(&videos));

    let job = QueueJob::Upload(upload_job(&path));
    let err = fitcast_worker::processor::run_job(&ctx, &job)
        .await
        .unwrap_err();

    assert!(err.is_retryable());
    assert!(!path.exists());
    assert!(videos.records.lock().unwrap().is_empty());
}

/// A delete payload that is not a video reference fails permanently.
#[tokio::test]
async fn test_delete_invalid_reference() {
    let host = Arc::new(FakeHost::default());
    let videos = Arc::new(FakeVideos::default());
    let ctx = context_with(Arc::clone(&host), Arc::clone(&videos));

    let job = DeleteJob::new("https://example.com/not-a-video", TrainerId(3));
    let err = fitcast_worker::processor::run_job(&ctx, &QueueJob::Delete(job))
        .await
        .unwrap_err();

    assert!(err.is_permanent_failure());
    assert!(host.deleted.lock().unwrap().is_empty());
}

/// The optional publish timeout caps a hung external call.
#[tokio::test]
async fn test_publish_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let path = temp_upload_file(&dir, "clip.mp4").await;

    let host = Arc::new(FakeHost {
        publish_delay: Some(Duration::from_millis(200)),
        ..FakeHost::default()
    });
    let videos = Arc::new(FakeVideos::default());
    let config = WorkerConfig {
        publish_timeout: Some(Duration::from_millis(20)),
        ..WorkerConfig::default()
    };
    let ctx = context_with_config(config, Arc::clone(&host), Arc::clone(&videos));

    let job = QueueJob::Upload(upload_job(&path));
    let err = fitcast_worker::processor::run_job(&ctx, &job)
        .await
        .unwrap_err();

    assert!(matches!(err, WorkerError::PublishTimeout(_)));
    assert!(err.is_retryable());
    assert!(!path.exists());
    assert!(videos.records.lock().unwrap().is_empty());
}
