//! Pattern search over sites.

use std::sync::Arc;

use crate::domain::entities::Site;
use crate::domain::repositories::{AccessControl, Principal, SiteRepository, SiteSearch};
use crate::error::AppError;

/// Free-text search across name, main URL, group and numeric id.
///
/// Searches always run against an explicit candidate id set.
pub struct SearchService<S: SiteRepository, C: AccessControl> {
    site_repository: Arc<S>,
    access_control: Arc<C>,
}

impl<S: SiteRepository, C: AccessControl> SearchService<S, C> {
    pub fn new(site_repository: Arc<S>, access_control: Arc<C>) -> Self {
        Self {
            site_repository,
            access_control,
        }
    }

    /// Non-deleted sites among `candidate_ids` matching `pattern`, ascending id.
    ///
    /// A site matches when its name, main URL or group contains the pattern
    /// (case-insensitive), or when the pattern is numeric and equals its id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidArgument`] if `candidate_ids` is empty, the
    /// pattern is blank, or `limit` is not positive.
    pub async fn search(
        &self,
        candidate_ids: Vec<i64>,
        pattern: &str,
        limit: Option<i64>,
    ) -> Result<Vec<Site>, AppError> {
        let search = SiteSearch::new(candidate_ids, pattern, limit)?;
        self.site_repository.search(&search).await
    }

    /// Searches the sites `principal` may access.
    ///
    /// A principal without any accessible site gets an empty result; the
    /// empty set is never handed to [`Self::search`].
    pub async fn search_for_principal(
        &self,
        principal: &Principal,
        pattern: &str,
        limit: Option<i64>,
    ) -> Result<Vec<Site>, AppError> {
        let accessible = self.access_control.accessible_site_ids(principal).await?;
        if accessible.is_empty() {
            tracing::debug!(login = %principal.login, "Principal has no accessible sites");
            return Ok(Vec::new());
        }

        let mut candidate_ids: Vec<i64> = accessible.into_iter().collect();
        candidate_ids.sort_unstable();

        self.search(candidate_ids, pattern, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{MockAccessControl, MockSiteRepository};
    use chrono::Utc;
    use std::collections::HashSet;

    fn site(id: i64, name: &str) -> Site {
        Site::new(
            id,
            name.to_string(),
            format!("https://{id}.example.com"),
            None,
            "UTC".to_string(),
            "website".to_string(),
            Utc::now(),
            false,
        )
    }

    #[tokio::test]
    async fn test_search_empty_candidates_rejected() {
        let mut sites = MockSiteRepository::new();
        sites.expect_search().never();

        let service = SearchService::new(Arc::new(sites), Arc::new(MockAccessControl::new()));

        let result = service.search(vec![], "news", None).await;

        assert!(matches!(
            result.unwrap_err(),
            AppError::InvalidArgument { .. }
        ));
    }

    #[tokio::test]
    async fn test_search_numeric_pattern_passed_as_id() {
        let mut sites = MockSiteRepository::new();
        sites
            .expect_search()
            .withf(|s| {
                s.numeric_id() == Some(42)
                    && s.candidate_ids() == [42, 7]
                    && s.contains_pattern() == "%42%"
            })
            .times(1)
            .returning(|_| Ok(vec![site(42, "Unrelated name")]));

        let service = SearchService::new(Arc::new(sites), Arc::new(MockAccessControl::new()));

        let found = service.search(vec![42, 7], "42", None).await.unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 42);
    }

    #[tokio::test]
    async fn test_search_forwards_limit() {
        let mut sites = MockSiteRepository::new();
        sites
            .expect_search()
            .withf(|s| s.limit() == Some(2) && s.numeric_id().is_none())
            .times(1)
            .returning(|_| Ok(vec![site(1, "news a"), site(2, "news b")]));

        let service = SearchService::new(Arc::new(sites), Arc::new(MockAccessControl::new()));

        let found = service.search(vec![1, 2, 3], "news", Some(2)).await.unwrap();

        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn test_search_for_principal_sorted_candidates() {
        let mut access = MockAccessControl::new();
        access
            .expect_accessible_site_ids()
            .returning(|_| Ok(HashSet::from([9, 2, 5])));

        let mut sites = MockSiteRepository::new();
        sites
            .expect_search()
            .withf(|s| s.candidate_ids() == [2, 5, 9])
            .times(1)
            .returning(|_| Ok(vec![]));

        let service = SearchService::new(Arc::new(sites), Arc::new(access));

        let found = service
            .search_for_principal(&Principal::user("alice"), "shop", None)
            .await
            .unwrap();

        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_search_for_principal_without_access() {
        let mut access = MockAccessControl::new();
        access
            .expect_accessible_site_ids()
            .returning(|_| Ok(HashSet::new()));

        let mut sites = MockSiteRepository::new();
        sites.expect_search().never();

        let service = SearchService::new(Arc::new(sites), Arc::new(access));

        let found = service
            .search_for_principal(&Principal::user("nobody"), "shop", None)
            .await
            .unwrap();

        assert!(found.is_empty());
    }
}
