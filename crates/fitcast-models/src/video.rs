//! Published video records.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::workshop::{SectionId, TrainerId, WorkshopId};

/// Unique identifier for a published video record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct VideoId(pub String);

impl VideoId {
    /// Generate a new random video ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for VideoId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// External host a video is published to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// YouTube Data API v3
    #[default]
    Youtube,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Youtube => "youtube",
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A video that has been published to the external host and reconciled
/// into the relational store.
///
/// Rows only come into existence through the reconciliation writer, after
/// the external publish call has succeeded.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PublishedVideo {
    /// Unique record ID
    pub id: VideoId,
    /// Video title
    pub title: String,
    /// Optional description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Canonical playback URL on the external host
    pub url: String,
    /// Owning trainer
    pub trainer_id: TrainerId,
    /// Workshop the video belongs to
    pub workshop_id: WorkshopId,
    /// Optional section within the workshop
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_id: Option<SectionId>,
    /// When the record was committed
    pub uploaded_at: DateTime<Utc>,
}

/// Input to the reconciliation writer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPublishedVideo {
    /// Video title
    pub title: String,
    /// Optional description
    pub description: Option<String>,
    /// Canonical playback URL on the external host
    pub url: String,
    /// Owning trainer
    pub trainer_id: TrainerId,
    /// Workshop the video belongs to
    pub workshop_id: WorkshopId,
    /// Optional section within the workshop
    pub section_id: Option<SectionId>,
}
