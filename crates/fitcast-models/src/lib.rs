//! Shared data models for the Fitcast backend.
//!
//! This crate provides Serde-serializable types for:
//! - Publishing jobs and their lifecycle state
//! - Published video records
//! - Workshop references used by the publishing pipeline

pub mod job;
pub mod video;
pub mod workshop;

// Re-export common types
pub use job::{JobId, JobKind, JobRecord, JobState};
pub use video::{NewPublishedVideo, PublishedVideo, StorageBackend, VideoId};
pub use workshop::{SectionId, TrainerId, Workshop, WorkshopId};
