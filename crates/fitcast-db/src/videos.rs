//! Published video rows.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::info;

use fitcast_models::{
    NewPublishedVideo, PublishedVideo, SectionId, TrainerId, VideoId, WorkshopId,
};

use crate::error::DbResult;

/// The reconciliation writer.
///
/// This is the only path that creates a durably-queryable published video;
/// callers must only invoke it after the external publish has succeeded.
#[async_trait]
pub trait PublishedVideoWriter: Send + Sync {
    async fn record_published(&self, video: NewPublishedVideo) -> DbResult<PublishedVideo>;
}

#[derive(Debug, sqlx::FromRow)]
struct PublishedVideoRow {
    id: String,
    title: String,
    description: Option<String>,
    url: String,
    trainer_id: i64,
    workshop_id: i64,
    section_id: Option<i64>,
    uploaded_at: DateTime<Utc>,
}

impl From<PublishedVideoRow> for PublishedVideo {
    fn from(row: PublishedVideoRow) -> Self {
        PublishedVideo {
            id: VideoId(row.id),
            title: row.title,
            description: row.description,
            url: row.url,
            trainer_id: TrainerId(row.trainer_id),
            workshop_id: WorkshopId(row.workshop_id),
            section_id: row.section_id.map(SectionId),
            uploaded_at: row.uploaded_at,
        }
    }
}

/// Postgres-backed published video store.
#[derive(Clone)]
pub struct PublishedVideoRepo {
    pool: PgPool,
}

impl PublishedVideoRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch a single published video.
    pub async fn find(&self, id: &VideoId) -> DbResult<Option<PublishedVideo>> {
        let row = sqlx::query_as::<_, PublishedVideoRow>(
            r"
            SELECT id, title, description, url, trainer_id, workshop_id, section_id, uploaded_at
            FROM published_videos
            WHERE id = $1
            ",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(PublishedVideo::from))
    }

    /// List the published videos of a workshop, newest first.
    pub async fn list_for_workshop(&self, workshop_id: WorkshopId) -> DbResult<Vec<PublishedVideo>> {
        let rows = sqlx::query_as::<_, PublishedVideoRow>(
            r"
            SELECT id, title, description, url, trainer_id, workshop_id, section_id, uploaded_at
            FROM published_videos
            WHERE workshop_id = $1
            ORDER BY uploaded_at DESC
            ",
        )
        .bind(workshop_id.0)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PublishedVideo::from).collect())
    }
}

#[async_trait]
impl PublishedVideoWriter for PublishedVideoRepo {
    async fn record_published(&self, video: NewPublishedVideo) -> DbResult<PublishedVideo> {
        let id = VideoId::new();
        let uploaded_at = Utc::now();

        let row = sqlx::query_as::<_, PublishedVideoRow>(
            r"
            INSERT INTO published_videos
                (id, title, description, url, trainer_id, workshop_id, section_id, uploaded_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, title, description, url, trainer_id, workshop_id, section_id, uploaded_at
            ",
        )
        .bind(id.as_str())
        .bind(&video.title)
        .bind(&video.description)
        .bind(&video.url)
        .bind(video.trainer_id.0)
        .bind(video.workshop_id.0)
        .bind(video.section_id.map(|s| s.0))
        .bind(uploaded_at)
        .fetch_one(&self.pool)
        .await?;

        info!(video_id = %row.id, url = %row.url, "Recorded published video");
        Ok(row.into())
    }
}
