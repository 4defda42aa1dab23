//! PostgreSQL-backed visit log checks.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::repositories::VisitLog;
use crate::error::AppError;

/// Read-only view over `visit_log`.
pub struct PgVisitLog {
    pool: Arc<PgPool>,
}

impl PgVisitLog {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VisitLog for PgVisitLog {
    async fn has_visits_between(
        &self,
        site_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        // (start, end]: a visit exactly at `start` belongs to the previous window.
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM visit_log
                WHERE site_id = $1
                  AND visit_last_action_time > $2
                  AND visit_last_action_time <= $3
            )
            "#,
        )
        .bind(site_id)
        .bind(start)
        .bind(end)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(exists)
    }
}
