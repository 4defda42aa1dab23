//! PostgreSQL-backed access control.

use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashSet;
use std::sync::Arc;

use crate::domain::repositories::{AccessControl, Principal};
use crate::error::AppError;

/// Reads accessible site ids from `access_grants`.
///
/// Superusers see every non-deleted site.
pub struct PgAccessControl {
    pool: Arc<PgPool>,
}

impl PgAccessControl {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccessControl for PgAccessControl {
    async fn accessible_site_ids(&self, principal: &Principal) -> Result<HashSet<i64>, AppError> {
        let ids = if principal.superuser {
            sqlx::query_scalar::<_, i64>("SELECT id FROM sites WHERE deleted = FALSE")
                .fetch_all(self.pool.as_ref())
                .await?
        } else {
            sqlx::query_scalar::<_, i64>(
                "SELECT DISTINCT site_id FROM access_grants WHERE login = $1",
            )
            .bind(&principal.login)
            .fetch_all(self.pool.as_ref())
            .await?
        };

        Ok(ids.into_iter().collect())
    }
}
