//! PostgreSQL implementation of site repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;

use crate::domain::entities::{NewSite, Site, SitePatch, SiteState, SiteUrl};
use crate::domain::repositories::{SiteRepository, SiteSearch};
use crate::error::AppError;
use serde_json::json;

#[derive(Debug, FromRow)]
struct SiteRow {
    id: i64,
    name: String,
    main_url: String,
    group_name: Option<String>,
    timezone: String,
    site_type: String,
    created_at: DateTime<Utc>,
    deleted: bool,
}

impl From<SiteRow> for Site {
    fn from(r: SiteRow) -> Self {
        Site::new(
            r.id,
            r.name,
            r.main_url,
            r.group_name,
            r.timezone,
            r.site_type,
            r.created_at,
            r.deleted,
        )
    }
}

/// PostgreSQL repository for site records.
///
/// Soft delete is the `deleted` flag. Set membership is always bound as an
/// array parameter (`= ANY($1)`); empty lists return before reaching the
/// database.
pub struct PgSiteRepository {
    pool: Arc<PgPool>,
}

impl PgSiteRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SiteRepository for PgSiteRepository {
    async fn create(&self, new_site: NewSite, aliases: &[String]) -> Result<i64, AppError> {
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO sites (name, main_url, group_name, timezone, site_type, created_at)
            VALUES ($1, $2, $3, $4, $5, COALESCE($6::TIMESTAMPTZ, NOW()))
            RETURNING id
            "#,
        )
        .bind(new_site.name)
        .bind(new_site.main_url)
        .bind(new_site.group)
        .bind(new_site.timezone)
        .bind(new_site.site_type)
        .bind(new_site.created_at)
        .fetch_one(&mut *tx)
        .await?;

        for url in aliases {
            sqlx::query("INSERT INTO site_urls (site_id, url) VALUES ($1, $2)")
                .bind(id)
                .bind(url)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(id)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Site>, AppError> {
        let row = sqlx::query_as::<_, SiteRow>(
            r#"
            SELECT id, name, main_url, group_name, timezone, site_type, created_at, deleted
            FROM sites
            WHERE id = $1 AND deleted = FALSE
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Site::from))
    }

    async fn find_state(&self, id: i64) -> Result<Option<SiteState>, AppError> {
        // Does NOT filter deleted rows: purge needs to see them.
        let deleted = sqlx::query_scalar::<_, bool>("SELECT deleted FROM sites WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(deleted.map(SiteState::from_deleted_flag))
    }

    async fn list(&self) -> Result<Vec<Site>, AppError> {
        let rows = sqlx::query_as::<_, SiteRow>(
            r#"
            SELECT id, name, main_url, group_name, timezone, site_type, created_at, deleted
            FROM sites
            WHERE deleted = FALSE
            ORDER BY id
            "#,
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Site::from).collect())
    }

    async fn list_by_ids(&self, ids: &[i64], limit: Option<i64>) -> Result<Vec<Site>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        // LIMIT NULL means no limit.
        let rows = sqlx::query_as::<_, SiteRow>(
            r#"
            SELECT id, name, main_url, group_name, timezone, site_type, created_at, deleted
            FROM sites
            WHERE id = ANY($1) AND deleted = FALSE
            ORDER BY id
            LIMIT $2
            "#,
        )
        .bind(ids)
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Site::from).collect())
    }

    async fn list_ids(&self) -> Result<Vec<i64>, AppError> {
        let ids =
            sqlx::query_scalar::<_, i64>("SELECT id FROM sites WHERE deleted = FALSE ORDER BY id")
                .fetch_all(self.pool.as_ref())
                .await?;

        Ok(ids)
    }

    async fn update(&self, id: i64, patch: SitePatch) -> Result<Site, AppError> {
        let update_group = patch.group.is_some();
        let new_group = patch.group.and_then(|g| g);

        let row = sqlx::query_as::<_, SiteRow>(
            r#"
            UPDATE sites SET
                name       = COALESCE($2::TEXT, name),
                main_url   = COALESCE($3::TEXT, main_url),
                group_name = CASE WHEN $4 THEN $5::TEXT ELSE group_name END,
                timezone   = COALESCE($6::TEXT, timezone),
                site_type  = COALESCE($7::TEXT, site_type)
            WHERE id = $1 AND deleted = FALSE
            RETURNING id, name, main_url, group_name, timezone, site_type, created_at, deleted
            "#,
        )
        .bind(id)
        .bind(patch.name)
        .bind(patch.main_url)
        .bind(update_group)
        .bind(new_group)
        .bind(patch.timezone)
        .bind(patch.site_type)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(Site::from)
            .ok_or_else(|| AppError::not_found("Site not found", json!({ "id": id })))
    }

    async fn soft_delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE sites SET deleted = TRUE WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn purge(&self, id: i64) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        // The deleted guard makes a concurrent undelete or double purge a no-op
        // instead of removing an active site.
        let result = sqlx::query("DELETE FROM sites WHERE id = $1 AND deleted = TRUE")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(AppError::invariant(
                "Only soft-deleted sites can be purged",
                json!({ "id": id }),
            ));
        }

        sqlx::query("DELETE FROM site_urls WHERE site_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM access_grants WHERE site_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn list_by_group(&self, group: &str) -> Result<Vec<Site>, AppError> {
        let rows = sqlx::query_as::<_, SiteRow>(
            r#"
            SELECT id, name, main_url, group_name, timezone, site_type, created_at, deleted
            FROM sites
            WHERE deleted = FALSE AND COALESCE(group_name, '') = $1
            ORDER BY id
            "#,
        )
        .bind(group)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Site::from).collect())
    }

    async fn list_groups(&self) -> Result<Vec<String>, AppError> {
        let groups = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT COALESCE(group_name, '') AS group_name
            FROM sites
            WHERE deleted = FALSE
            ORDER BY 1
            "#,
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(groups)
    }

    async fn ids_by_timezones(&self, timezones: &[String]) -> Result<Vec<i64>, AppError> {
        if timezones.is_empty() {
            return Ok(Vec::new());
        }

        let ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT id
            FROM sites
            WHERE deleted = FALSE AND timezone = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(timezones)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(ids)
    }

    async fn distinct_timezones(&self) -> Result<Vec<String>, AppError> {
        let timezones = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT timezone FROM sites WHERE deleted = FALSE ORDER BY timezone",
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(timezones)
    }

    async fn distinct_types(&self) -> Result<Vec<String>, AppError> {
        let types = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT site_type FROM sites WHERE deleted = FALSE ORDER BY site_type",
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(types)
    }

    async fn ids_by_main_url(&self, urls: &[String]) -> Result<Vec<i64>, AppError> {
        if urls.is_empty() {
            return Ok(Vec::new());
        }

        let ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT id
            FROM sites
            WHERE deleted = FALSE AND main_url = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(urls)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(ids)
    }

    async fn main_urls(&self) -> Result<Vec<SiteUrl>, AppError> {
        let rows = sqlx::query_as::<_, (i64, String)>(
            "SELECT id, main_url FROM sites WHERE deleted = FALSE ORDER BY id",
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .into_iter()
            .map(|(site_id, url)| SiteUrl::new(site_id, url))
            .collect())
    }

    async fn search(&self, search: &SiteSearch) -> Result<Vec<Site>, AppError> {
        let rows = sqlx::query_as::<_, SiteRow>(
            r#"
            SELECT id, name, main_url, group_name, timezone, site_type, created_at, deleted
            FROM sites
            WHERE deleted = FALSE
              AND id = ANY($1)
              AND (
                    id = $2::BIGINT
                 OR name ILIKE $3
                 OR main_url ILIKE $3
                 OR main_url ILIKE $4
                 OR COALESCE(group_name, '') ILIKE $3
              )
            ORDER BY id
            LIMIT $5
            "#,
        )
        .bind(search.candidate_ids())
        .bind(search.numeric_id())
        .bind(search.contains_pattern())
        .bind(search.http_pattern())
        .bind(search.limit())
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Site::from).collect())
    }

    async fn backfill_created_at(
        &self,
        ids: &[i64],
        floor: DateTime<Utc>,
    ) -> Result<u64, AppError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            r#"
            UPDATE sites SET created_at = $2
            WHERE id = ANY($1) AND deleted = FALSE AND created_at > $2
            "#,
        )
        .bind(ids)
        .bind(floor)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected())
    }
}
