//! PostgreSQL implementation of alias URL repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::SiteUrl;
use crate::domain::repositories::AliasRepository;
use crate::error::AppError;

/// PostgreSQL repository for alias URLs (`site_urls` table).
///
/// Reads that feed resolution join against `sites` to hide deleted sites.
pub struct PgAliasRepository {
    pool: Arc<PgPool>,
}

impl PgAliasRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AliasRepository for PgAliasRepository {
    async fn add(&self, site_id: i64, url: &str) -> Result<(), AppError> {
        sqlx::query("INSERT INTO site_urls (site_id, url) VALUES ($1, $2)")
            .bind(site_id)
            .bind(url)
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }

    async fn list(&self, site_id: i64) -> Result<Vec<String>, AppError> {
        let urls =
            sqlx::query_scalar::<_, String>("SELECT url FROM site_urls WHERE site_id = $1 ORDER BY id")
                .bind(site_id)
                .fetch_all(self.pool.as_ref())
                .await?;

        Ok(urls)
    }

    async fn clear(&self, site_id: i64) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM site_urls WHERE site_id = $1")
            .bind(site_id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected())
    }

    async fn replace(&self, site_id: i64, urls: &[String]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM site_urls WHERE site_id = $1")
            .bind(site_id)
            .execute(&mut *tx)
            .await?;

        for url in urls {
            sqlx::query("INSERT INTO site_urls (site_id, url) VALUES ($1, $2)")
                .bind(site_id)
                .bind(url)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn ids_by_url(&self, urls: &[String]) -> Result<Vec<i64>, AppError> {
        if urls.is_empty() {
            return Ok(Vec::new());
        }

        let ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT DISTINCT u.site_id
            FROM site_urls u
            JOIN sites s ON s.id = u.site_id
            WHERE s.deleted = FALSE AND u.url = ANY($1)
            ORDER BY u.site_id
            "#,
        )
        .bind(urls)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(ids)
    }

    async fn all(&self) -> Result<Vec<SiteUrl>, AppError> {
        let rows = sqlx::query_as::<_, (i64, String)>(
            r#"
            SELECT u.site_id, u.url
            FROM site_urls u
            JOIN sites s ON s.id = u.site_id
            WHERE s.deleted = FALSE
            ORDER BY u.site_id, u.id
            "#,
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .into_iter()
            .map(|(site_id, url)| SiteUrl::new(site_id, url))
            .collect())
    }
}
