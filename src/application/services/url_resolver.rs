//! URL-to-site resolution.

use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;

use crate::domain::entities::SiteUrl;
use crate::domain::repositories::{AccessControl, AliasRepository, Principal, SiteRepository};
use crate::error::AppError;

/// Runs two id lookups and merges them with set semantics, ascending.
///
/// An id returned by both lookups appears once.
pub async fn union_ids<L, R>(left: L, right: R) -> Result<Vec<i64>, AppError>
where
    L: Future<Output = Result<Vec<i64>, AppError>>,
    R: Future<Output = Result<Vec<i64>, AppError>>,
{
    let (left, right) = tokio::try_join!(left, right)?;

    let merged: BTreeSet<i64> = left.into_iter().chain(right).collect();
    Ok(merged.into_iter().collect())
}

/// Maps URLs to the ids of the sites that own them.
///
/// A site owns its `main_url` and each of its alias URLs. Matching is exact
/// string equality; normalization is left to the caller. Several sites may
/// own the same URL, so results are id sets.
pub struct UrlResolver<S: SiteRepository, A: AliasRepository, C: AccessControl> {
    site_repository: Arc<S>,
    alias_repository: Arc<A>,
    access_control: Arc<C>,
}

impl<S: SiteRepository, A: AliasRepository, C: AccessControl> UrlResolver<S, A, C> {
    pub fn new(site_repository: Arc<S>, alias_repository: Arc<A>, access_control: Arc<C>) -> Self {
        Self {
            site_repository,
            alias_repository,
            access_control,
        }
    }

    /// Ids of non-deleted sites whose primary or alias URLs intersect `urls`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] on database errors.
    pub async fn resolve_unscoped(&self, urls: &[String]) -> Result<Vec<i64>, AppError> {
        if urls.is_empty() {
            tracing::debug!("Empty URL list, nothing to resolve");
            return Ok(Vec::new());
        }

        union_ids(
            self.site_repository.ids_by_main_url(urls),
            self.alias_repository.ids_by_url(urls),
        )
        .await
    }

    /// [`Self::resolve_unscoped`] narrowed to sites `principal` may access.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] on database errors.
    pub async fn resolve_scoped(
        &self,
        principal: &Principal,
        urls: &[String],
    ) -> Result<Vec<i64>, AppError> {
        let ids = self.resolve_unscoped(urls).await?;
        if ids.is_empty() {
            return Ok(ids);
        }

        let accessible = self.access_control.accessible_site_ids(principal).await?;

        Ok(ids.into_iter().filter(|id| accessible.contains(id)).collect())
    }

    /// Every `(id, main_url)` and `(id, alias)` pair of non-deleted sites.
    ///
    /// Primary URLs come first. Duplicates across sites are kept.
    pub async fn list_all_known_urls(&self) -> Result<Vec<SiteUrl>, AppError> {
        let (mut urls, aliases) =
            tokio::try_join!(self.site_repository.main_urls(), self.alias_repository.all())?;

        urls.extend(aliases);
        Ok(urls)
    }
}
