//! Video publishing worker.
//!
//! This crate provides:
//! - The single-slot job executor (one job in flight, ever)
//! - Upload and delete workflows against the external host
//! - Temp-file lifecycle handling
//! - Graceful shutdown

pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod metrics;
pub mod processor;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use executor::JobExecutor;
pub use logging::JobLogger;
pub use processor::{JobOutcome, ProcessingContext};
