//! Postgres persistence for the publishing pipeline.
//!
//! This crate provides:
//! - Workshop lookups (referential data owned by the surrounding app)
//! - The reconciliation writer that commits `PublishedVideo` rows once the
//!   external publish call has succeeded
//!
//! Expected schema is in `schema.sql` at the crate root.

pub mod error;
pub mod videos;
pub mod workshops;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub use error::{DbError, DbResult};
pub use videos::{PublishedVideoRepo, PublishedVideoWriter};
pub use workshops::{WorkshopDirectory, WorkshopRepo};

/// Connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to Postgres.
    pub async fn connect(url: &str) -> DbResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await?;
        Ok(Self { pool })
    }

    /// Connect using `DATABASE_URL`.
    pub async fn from_env() -> DbResult<Self> {
        let url = std::env::var("DATABASE_URL")
            .map_err(|_| DbError::config_error("DATABASE_URL not set"))?;
        Self::connect(&url).await
    }

    /// Workshop lookups.
    pub fn workshops(&self) -> WorkshopRepo {
        WorkshopRepo::new(self.pool.clone())
    }

    /// Published video reads and the reconciliation writer.
    pub fn videos(&self) -> PublishedVideoRepo {
        PublishedVideoRepo::new(self.pool.clone())
    }

    /// Access the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
