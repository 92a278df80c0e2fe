//! Job payloads for the publishing queue.

use serde::{Deserialize, Serialize};
use validator::Validate;

use fitcast_models::{JobId, JobKind, SectionId, StorageBackend, TrainerId, WorkshopId};

/// Job to publish a local video file to the external host.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UploadJob {
    /// Unique job ID
    pub job_id: JobId,
    /// Video title
    #[validate(length(min = 1, max = 120))]
    pub title: String,
    /// Optional description
    #[validate(length(max = 4000))]
    pub description: Option<String>,
    /// Target workshop
    pub workshop_id: WorkshopId,
    /// Owning trainer
    pub trainer_id: TrainerId,
    /// Optional workshop section
    pub section_id: Option<SectionId>,
    /// Path of the temporary file on local disk
    #[validate(length(min = 1))]
    pub file_path: String,
    /// Target storage backend
    #[serde(default)]
    pub backend: StorageBackend,
}

impl UploadJob {
    pub fn new(
        title: impl Into<String>,
        workshop_id: WorkshopId,
        trainer_id: TrainerId,
        file_path: impl Into<String>,
    ) -> Self {
        Self {
            job_id: JobId::new(),
            title: title.into(),
            description: None,
            workshop_id,
            trainer_id,
            section_id: None,
            file_path: file_path.into(),
            backend: StorageBackend::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_section(mut self, section_id: SectionId) -> Self {
        self.section_id = Some(section_id);
        self
    }
}

/// Job to remove a previously published video from the external host.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DeleteJob {
    /// Unique job ID
    pub job_id: JobId,
    /// Playback URL (or bare external ID) of the video to remove
    #[validate(length(min = 1))]
    pub video_url: String,
    /// Storage backend the video lives on
    #[serde(default)]
    pub backend: StorageBackend,
    /// User who requested the removal
    pub requested_by: TrainerId,
}

impl DeleteJob {
    pub fn new(video_url: impl Into<String>, requested_by: TrainerId) -> Self {
        Self {
            job_id: JobId::new(),
            video_url: video_url.into(),
            backend: StorageBackend::default(),
            requested_by,
        }
    }
}

/// Generic job wrapper for queue storage.
///
/// The payload variant and the job kind are one and the same, so a kind
/// mismatch is unrepresentable and dispatch is checked exhaustively at
/// compile time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueueJob {
    Upload(UploadJob),
    Delete(DeleteJob),
}

impl QueueJob {
    pub fn job_id(&self) -> &JobId {
        match self {
            QueueJob::Upload(j) => &j.job_id,
            QueueJob::Delete(j) => &j.job_id,
        }
    }

    pub fn kind(&self) -> JobKind {
        match self {
            QueueJob::Upload(_) => JobKind::Upload,
            QueueJob::Delete(_) => JobKind::Delete,
        }
    }

    /// Validate the payload at the enqueue boundary.
    pub fn validate(&self) -> Result<(), validator::ValidationErrors> {
        match self {
            QueueJob::Upload(j) => j.validate(),
            QueueJob::Delete(j) => j.validate(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_job_roundtrip() {
        let job = UploadJob::new("Mobility basics", WorkshopId(7), TrainerId(3), "/tmp/u/clip.mp4")
            .with_description("Session one");
        let wrapped = QueueJob::Upload(job.clone());

        let json = serde_json::to_string(&wrapped).unwrap();
        assert!(json.contains("\"kind\":\"upload\""));

        let parsed: QueueJob = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.kind(), JobKind::Upload);
        assert_eq!(parsed.job_id(), &job.job_id);
    }

    #[test]
    fn test_delete_job_kind() {
        let job = DeleteJob::new("https://www.youtube.com/watch?v=dQw4w9WgXcQ", TrainerId(3));
        let wrapped = QueueJob::Delete(job);
        assert_eq!(wrapped.kind(), JobKind::Delete);
    }

    #[test]
    fn test_empty_title_rejected() {
        let job = UploadJob::new("", WorkshopId(7), TrainerId(3), "/tmp/u/clip.mp4");
        assert!(QueueJob::Upload(job).validate().is_err());
    }
}
