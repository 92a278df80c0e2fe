//! Workshop lookups.

use async_trait::async_trait;
use sqlx::PgPool;

use fitcast_models::{TrainerId, Workshop, WorkshopId};

use crate::error::DbResult;

/// Referential lookup the worker resolves upload jobs against.
#[async_trait]
pub trait WorkshopDirectory: Send + Sync {
    /// Find a workshop by id. `None` means the reference is dangling.
    async fn find(&self, id: WorkshopId) -> DbResult<Option<Workshop>>;
}

#[derive(Debug, sqlx::FromRow)]
struct WorkshopRow {
    id: i64,
    title: String,
    trainer_id: i64,
}

impl From<WorkshopRow> for Workshop {
    fn from(row: WorkshopRow) -> Self {
        Workshop {
            id: WorkshopId(row.id),
            title: row.title,
            trainer_id: TrainerId(row.trainer_id),
        }
    }
}

/// Postgres-backed workshop lookups.
#[derive(Clone)]
pub struct WorkshopRepo {
    pool: PgPool,
}

impl WorkshopRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WorkshopDirectory for WorkshopRepo {
    async fn find(&self, id: WorkshopId) -> DbResult<Option<Workshop>> {
        let row = sqlx::query_as::<_, WorkshopRow>(
            "SELECT id, title, trainer_id FROM workshops WHERE id = $1",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Workshop::from))
    }
}
