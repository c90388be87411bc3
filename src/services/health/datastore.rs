//! Datastore seam for the database probe.
//!
//! The probe talks to this trait instead of `sqlx` directly so tests can
//! inject mismatches and count invocations without a live database.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::repos::{error::RepoError, scratch_repo};

/// The scratch-table operations the database probe needs.
///
/// `insert` returns the generated id, or `None` when the backend failed
/// to hand one out (that is its own failure mode for the probe).
#[async_trait]
pub trait ScratchDatastore: Send + Sync + 'static {
    // Drop the scratch table if present, then create it fresh.
    async fn reset(&self) -> Result<(), RepoError>;

    async fn insert(&self, random_value: &str) -> Result<Option<i64>, RepoError>;

    async fn fetch(&self, id: i64) -> Result<Option<String>, RepoError>;

    async fn drop_table(&self) -> Result<(), RepoError>;
}

/// Postgres-backed scratch datastore, delegating to `scratch_repo`.
#[derive(Clone, Debug)]
pub struct PgScratchDatastore {
    pool: PgPool,
}

impl PgScratchDatastore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScratchDatastore for PgScratchDatastore {
    async fn reset(&self) -> Result<(), RepoError> {
        scratch_repo::recreate(&self.pool).await
    }

    async fn insert(&self, random_value: &str) -> Result<Option<i64>, RepoError> {
        scratch_repo::insert(&self.pool, random_value).await
    }

    async fn fetch(&self, id: i64) -> Result<Option<String>, RepoError> {
        scratch_repo::fetch(&self.pool, id).await
    }

    async fn drop_table(&self) -> Result<(), RepoError> {
        scratch_repo::drop_table(&self.pool).await
    }
}
