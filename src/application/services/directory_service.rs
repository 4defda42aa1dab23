//! Administrative listing views over the site store.

use std::sync::Arc;

use crate::domain::entities::Site;
use crate::domain::repositories::{SiteRepository, VisitLog};
use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde_json::json;

/// Grouping views (group, timezone, type, visit activity) and the created-at
/// backfill used after historical imports.
pub struct DirectoryService<S: SiteRepository, V: VisitLog> {
    site_repository: Arc<S>,
    visit_log: Arc<V>,
}

impl<S: SiteRepository, V: VisitLog> DirectoryService<S, V> {
    pub fn new(site_repository: Arc<S>, visit_log: Arc<V>) -> Self {
        Self {
            site_repository,
            visit_log,
        }
    }

    /// Non-deleted sites in `group`; `""` selects ungrouped sites.
    pub async fn sites_in_group(&self, group: &str) -> Result<Vec<Site>, AppError> {
        self.site_repository.list_by_group(group).await
    }

    /// Distinct groups, including `""` for ungrouped sites.
    pub async fn groups(&self) -> Result<Vec<String>, AppError> {
        self.site_repository.list_groups().await
    }

    pub async fn site_ids_in_timezones(&self, timezones: &[String]) -> Result<Vec<i64>, AppError> {
        if timezones.is_empty() {
            return Ok(Vec::new());
        }
        self.site_repository.ids_by_timezones(timezones).await
    }

    pub async fn timezones(&self) -> Result<Vec<String>, AppError> {
        self.site_repository.distinct_timezones().await
    }

    pub async fn site_types(&self) -> Result<Vec<String>, AppError> {
        self.site_repository.distinct_types().await
    }

    /// Ids of non-deleted sites with at least one visit in `(start, end]`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidArgument`] if `end` precedes `start`.
    pub async fn site_ids_with_visits(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<i64>, AppError> {
        if end < start {
            return Err(AppError::invalid_argument(
                "Visit window end precedes its start",
                json!({ "start": start, "end": end }),
            ));
        }

        let mut active = Vec::new();
        for id in self.site_repository.list_ids().await? {
            if self.visit_log.has_visits_between(id, start, end).await? {
                active.push(id);
            }
        }

        Ok(active)
    }

    /// Lowers `created_at` to `floor` for the given non-deleted sites created
    /// after it. Returns the number of sites changed; repeating the call with
    /// the same floor changes nothing.
    pub async fn backfill_created_at(
        &self,
        ids: &[i64],
        floor: DateTime<Utc>,
    ) -> Result<u64, AppError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let changed = self.site_repository.backfill_created_at(ids, floor).await?;
        tracing::info!(requested = ids.len(), changed, %floor, "Backfilled site creation dates");
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{MockSiteRepository, MockVisitLog};
    use chrono::TimeZone;

    fn service(
        sites: MockSiteRepository,
        visits: MockVisitLog,
    ) -> DirectoryService<MockSiteRepository, MockVisitLog> {
        DirectoryService::new(Arc::new(sites), Arc::new(visits))
    }

    #[tokio::test]
    async fn test_groups_keep_empty_bucket() {
        let mut sites = MockSiteRepository::new();
        sites
            .expect_list_groups()
            .times(1)
            .returning(|| Ok(vec![String::new(), "news".to_string()]));

        let groups = service(sites, MockVisitLog::new()).groups().await.unwrap();

        assert_eq!(groups, vec!["", "news"]);
    }

    #[tokio::test]
    async fn test_timezones_empty_input_skips_query() {
        let mut sites = MockSiteRepository::new();
        sites.expect_ids_by_timezones().never();

        let ids = service(sites, MockVisitLog::new())
            .site_ids_in_timezones(&[])
            .await
            .unwrap();

        assert!(ids.is_empty());
    }

    #[tokio::test]
    async fn test_site_ids_with_visits_checks_each_site() {
        let mut sites = MockSiteRepository::new();
        sites
            .expect_list_ids()
            .times(1)
            .returning(|| Ok(vec![1, 2, 3]));

        let mut visits = MockVisitLog::new();
        visits
            .expect_has_visits_between()
            .times(3)
            .returning(|id, _, _| Ok(id != 2));

        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap();
        let ids = service(sites, visits)
            .site_ids_with_visits(start, end)
            .await
            .unwrap();

        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_site_ids_with_visits_rejects_inverted_window() {
        let start = Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();

        let result = service(MockSiteRepository::new(), MockVisitLog::new())
            .site_ids_with_visits(start, end)
            .await;

        assert!(matches!(
            result.unwrap_err(),
            AppError::InvalidArgument { .. }
        ));
    }

    #[tokio::test]
    async fn test_backfill_empty_ids_is_noop() {
        let mut sites = MockSiteRepository::new();
        sites.expect_backfill_created_at().never();

        let changed = service(sites, MockVisitLog::new())
            .backfill_created_at(&[], Utc::now())
            .await
            .unwrap();

        assert_eq!(changed, 0);
    }

    #[tokio::test]
    async fn test_backfill_forwards_floor() {
        let floor = Utc.with_ymd_and_hms(2020, 6, 1, 0, 0, 0).unwrap();

        let mut sites = MockSiteRepository::new();
        sites
            .expect_backfill_created_at()
            .withf(move |ids, f| ids == [4, 5] && *f == floor)
            .times(1)
            .returning(|_, _| Ok(1));

        let changed = service(sites, MockVisitLog::new())
            .backfill_created_at(&[4, 5], floor)
            .await
            .unwrap();

        assert_eq!(changed, 1);
    }
}
