//! Redis Streams job queue for video publishing.
//!
//! This crate provides:
//! - Durable job enqueueing via Redis Streams (the producer API)
//! - Worker consumption with retry counters and a dead-letter stream
//! - Per-job status records for operational inspection

pub mod error;
pub mod job;
pub mod queue;
pub mod status;

pub use error::{QueueError, QueueResult};
pub use job::{DeleteJob, QueueJob, UploadJob};
pub use queue::{JobQueue, QueueConfig};
pub use status::{StatusStore, JOB_RECORD_TTL_SECS};
