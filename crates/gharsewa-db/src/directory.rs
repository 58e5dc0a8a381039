//! Postgres-backed [`DirectoryStore`].

use gharsewa_core::{Candidate, DirectoryStore, GeoPoint, Role};
use sqlx::PgPool;

use crate::{list_users, update_user_location, DbError};

/// Directory store over the `users` table.
#[derive(Debug, Clone)]
pub struct PgDirectory {
    pool: PgPool,
}

impl PgDirectory {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl DirectoryStore for PgDirectory {
    type Error = DbError;

    async fn fetch_all(&self, role: Option<Role>) -> Result<Vec<Candidate>, DbError> {
        let rows = list_users(&self.pool, role).await?;
        tracing::debug!(rows = rows.len(), role = ?role, "fetched directory snapshot");
        rows.into_iter().map(Candidate::try_from).collect()
    }

    async fn write_location(&self, entity_id: &str, point: GeoPoint) -> Result<(), DbError> {
        update_user_location(&self.pool, entity_id, point).await
    }
}
